//! Durable append-store boundary for Tally ledgers.
//!
//! The store owns the one mutating operation on a ledger: sealing a draft
//! entry with a server-assigned sequence number, hash-chain linkage, and
//! running balance, atomically and serialized per (school, student). Reads
//! return immutable snapshots for the pure calculators in `tally-core`.
//!
//! [`MemoryLedgerStore`] is the in-process reference implementation; a
//! database-backed implementation must provide the same guarantees (atomic
//! append, strict per-ledger ordering, optimistic concurrency on the chain
//! tip).

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info};

use tally_core::ledger::balance::balance_from_entries;
use tally_core::ledger::entry::{EntryType, LedgerEntry, NewLedgerEntry, Term};
use tally_core::ledger::error::LedgerError;
use tally_core::ledger::integrity::GENESIS_HASH;
use tally_core::ledger::validation::validate_entry;
use tally_shared::types::{LedgerEntryId, SchoolId, StudentId};

/// Filters for querying a ledger.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Restrict to an academic year.
    pub academic_year: Option<String>,
    /// Restrict to a term (annual entries always included).
    pub term: Option<Term>,
    /// Restrict to entries effective on or after this date.
    pub from: Option<NaiveDate>,
    /// Restrict to entries effective on or before this date.
    pub to: Option<NaiveDate>,
    /// Restrict to a single entry type.
    pub entry_type: Option<EntryType>,
}

impl EntryFilter {
    fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(year) = &self.academic_year {
            if &entry.academic_year != year {
                return false;
            }
        }
        if let Some(term) = self.term {
            // Annual entries (term == None) match every term window.
            if entry.term.is_some_and(|t| t != term) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.effective_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.effective_date > to {
                return false;
            }
        }
        if let Some(entry_type) = self.entry_type {
            if entry.entry_type != entry_type {
                return false;
            }
        }
        true
    }
}

/// Durable append store for student fee ledgers.
///
/// `append` must be atomic and serialized per ledger; `entries`/`query`
/// return sequence-ordered snapshots.
pub trait LedgerStore: Send + Sync {
    /// Seals and appends a draft entry.
    ///
    /// When `expected_previous_hash` is supplied, the append succeeds only
    /// if it matches the current chain tip ([`GENESIS_HASH`] for an empty
    /// ledger); otherwise a [`LedgerError::ConcurrencyConflict`] tells the
    /// caller to re-read and retry. Validation is re-enforced here:
    /// client-side checks are a convenience, not a security boundary.
    fn append(
        &self,
        draft: NewLedgerEntry,
        expected_previous_hash: Option<String>,
    ) -> Result<LedgerEntry, LedgerError>;

    /// Returns the full ledger snapshot in sequence order.
    fn entries(&self, school_id: SchoolId, student_id: StudentId) -> Vec<LedgerEntry>;

    /// Returns a filtered ledger snapshot in sequence order.
    fn query(
        &self,
        school_id: SchoolId,
        student_id: StudentId,
        filter: &EntryFilter,
    ) -> Vec<LedgerEntry>;
}

type LedgerKey = (SchoolId, StudentId);

/// In-memory reference implementation of [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledgers: DashMap<LedgerKey, Vec<LedgerEntry>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(
        &self,
        draft: NewLedgerEntry,
        expected_previous_hash: Option<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        let key = (draft.school_id, draft.student_id);
        // The map entry guard serializes appends for this ledger.
        let mut ledger = self.ledgers.entry(key).or_default();

        let current_balance = balance_from_entries(&ledger).current_balance;
        match validate_entry(&draft, current_balance) {
            Ok(report) => {
                for warning in &report.warnings {
                    debug!(
                        school_id = %draft.school_id,
                        student_id = %draft.student_id,
                        %warning,
                        "Accepting entry with warning"
                    );
                }
            }
            Err(errors) => return Err(LedgerError::Validation(errors)),
        }

        let tip = ledger
            .last()
            .map_or(GENESIS_HASH, |e| e.entry_hash.as_str())
            .to_string();
        if let Some(expected) = expected_previous_hash {
            if expected != tip {
                return Err(LedgerError::ConcurrencyConflict {
                    expected,
                    actual: tip,
                });
            }
        }

        #[allow(clippy::cast_possible_wrap)]
        let sequence_number = ledger.len() as i64 + 1;
        let previous_running = ledger
            .last()
            .map_or(Decimal::ZERO, |e| e.running_balance);

        let entry = draft.seal(
            LedgerEntryId::new(),
            sequence_number,
            tip,
            previous_running,
            Utc::now(),
        );
        ledger.push(entry.clone());

        info!(
            school_id = %entry.school_id,
            student_id = %entry.student_id,
            sequence = entry.sequence_number,
            entry_type = %entry.entry_type,
            "Appended ledger entry"
        );
        Ok(entry)
    }

    fn entries(&self, school_id: SchoolId, student_id: StudentId) -> Vec<LedgerEntry> {
        self.ledgers
            .get(&(school_id, student_id))
            .map(|ledger| ledger.clone())
            .unwrap_or_default()
    }

    fn query(
        &self,
        school_id: SchoolId,
        student_id: StudentId,
        filter: &EntryFilter,
    ) -> Vec<LedgerEntry> {
        self.entries(school_id, student_id)
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect()
    }
}
