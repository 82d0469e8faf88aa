//! Hash-chain integrity.
//!
//! Each entry's hash is a SHA-256 digest over a versioned canonical
//! serialization of its identifying fields plus the previous entry's hash,
//! so any alteration of a prior entry breaks the chain from that point
//! forward. Verification is read-only and never attempts repair.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tally_shared::types::{SchoolId, StudentId};

use super::entry::{EntryType, LedgerEntry};

/// Chain anchor for the first entry of a ledger.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Version prefix for the canonical serialization. Bump when the hashed
/// field set changes.
const CANONICAL_PREFIX: &str = "tally.ledger.v1";

/// Fields covered by the entry hash.
#[derive(Debug)]
pub struct HashInput<'a> {
    /// Sequence number assigned by the store.
    pub sequence_number: i64,
    /// Entry type (hashed by wire name).
    pub entry_type: EntryType,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
    /// Student the ledger belongs to.
    pub student_id: StudentId,
    /// School the ledger belongs to.
    pub school_id: SchoolId,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Effective date.
    pub effective_date: NaiveDate,
    /// Entry description.
    pub description: &'a str,
    /// Hash of the preceding entry ([`GENESIS_HASH`] for the first).
    pub previous_hash: &'a str,
}

/// Computes the canonical SHA-256 hash of an entry, hex-encoded.
#[must_use]
pub fn entry_hash(input: &HashInput<'_>) -> String {
    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}",
        CANONICAL_PREFIX,
        input.sequence_number,
        input.entry_type.as_str(),
        input.debit_amount,
        input.credit_amount,
        input.student_id,
        input.school_id,
        input.entry_date,
        input.effective_date,
        input.description,
        input.previous_hash,
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

fn recompute(entry: &LedgerEntry) -> String {
    entry_hash(&HashInput {
        sequence_number: entry.sequence_number,
        entry_type: entry.entry_type,
        debit_amount: entry.debit_amount,
        credit_amount: entry.credit_amount,
        student_id: entry.student_id,
        school_id: entry.school_id,
        entry_date: entry.entry_date,
        effective_date: entry.effective_date,
        description: &entry.description,
        previous_hash: &entry.previous_hash,
    })
}

/// Result of walking a ledger's hash chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainVerification {
    /// True if every entry links and hashes correctly.
    pub is_valid: bool,
    /// Sequence number of the first broken entry, if any. A single break
    /// invalidates trust in everything after it; no further entries are
    /// checked.
    pub broken_at_sequence: Option<i64>,
    /// Human-readable description of the first break.
    pub details: Option<String>,
}

impl ChainVerification {
    fn valid() -> Self {
        Self {
            is_valid: true,
            broken_at_sequence: None,
            details: None,
        }
    }

    fn broken(sequence: i64, details: String) -> Self {
        Self {
            is_valid: false,
            broken_at_sequence: Some(sequence),
            details: Some(details),
        }
    }
}

/// Walks the entries in sequence order and detects tampering.
///
/// For each entry this checks that the stored `entry_hash` matches the
/// recomputed canonical hash, and that `previous_hash` equals the preceding
/// entry's `entry_hash` (the genesis value for the first entry). Stops at
/// the first break.
#[must_use]
pub fn verify_chain(entries: &[LedgerEntry]) -> ChainVerification {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.sequence_number);

    let mut expected_previous = GENESIS_HASH.to_string();
    for entry in ordered {
        if entry.previous_hash != expected_previous {
            return ChainVerification::broken(
                entry.sequence_number,
                format!(
                    "previous hash mismatch: expected {expected_previous}, found {}",
                    entry.previous_hash
                ),
            );
        }
        let recomputed = recompute(entry);
        if recomputed != entry.entry_hash {
            return ChainVerification::broken(
                entry.sequence_number,
                "entry hash does not match entry contents".to_string(),
            );
        }
        expected_previous = entry.entry_hash.clone();
    }

    ChainVerification::valid()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::testing::{charge_draft, payment_draft, TestLedger};

    fn sample_ledger(n: usize) -> (TestLedger, Vec<LedgerEntry>) {
        let mut ledger = TestLedger::new();
        let mut entries = Vec::with_capacity(n);
        for i in 0..n {
            let draft = if i % 2 == 0 {
                charge_draft(&ledger, dec!(100))
            } else {
                payment_draft(&ledger, dec!(40))
            };
            entries.push(ledger.append(draft));
        }
        (ledger, entries)
    }

    #[test]
    fn test_untampered_chain_is_valid() {
        let (_, entries) = sample_ledger(6);
        let result = verify_chain(&entries);
        assert!(result.is_valid);
        assert_eq!(result.broken_at_sequence, None);
    }

    #[test]
    fn test_empty_chain_is_valid() {
        assert!(verify_chain(&[]).is_valid);
    }

    #[test]
    fn test_mutated_amount_detected_at_that_entry() {
        let (_, mut entries) = sample_ledger(5);
        entries[2].debit_amount += dec!(1);

        let result = verify_chain(&entries);
        assert!(!result.is_valid);
        assert_eq!(result.broken_at_sequence, Some(3));
    }

    #[test]
    fn test_mutated_entry_hash_detected_at_that_entry() {
        let (_, mut entries) = sample_ledger(5);
        entries[1].entry_hash = GENESIS_HASH.to_string();

        let result = verify_chain(&entries);
        assert!(!result.is_valid);
        assert_eq!(result.broken_at_sequence, Some(2));
    }

    #[test]
    fn test_mutated_previous_hash_detected_at_that_entry() {
        let (_, mut entries) = sample_ledger(5);
        entries[3].previous_hash = GENESIS_HASH.to_string();

        let result = verify_chain(&entries);
        assert!(!result.is_valid);
        assert_eq!(result.broken_at_sequence, Some(4));
    }

    #[test]
    fn test_verification_is_order_insensitive() {
        let (_, mut entries) = sample_ledger(4);
        entries.reverse();
        assert!(verify_chain(&entries).is_valid);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let (_, entries) = sample_ledger(1);
        assert_eq!(recompute(&entries[0]), entries[0].entry_hash);
    }
}
