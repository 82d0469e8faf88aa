//! Ledger balance calculations.
//!
//! Balance is never persisted as an independent field on any aggregate
//! record; everything here derives it from an immutable entry slice. Totals
//! are order-independent; per-entry running balances are sequence-ordered
//! and must reproduce exactly what the store computed at append time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{LedgerEntry, Term};

/// Aggregate balance derived from a set of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerBalance {
    /// Sum of all debit amounts.
    pub total_debits: Decimal,
    /// Sum of all credit amounts.
    pub total_credits: Decimal,
    /// `total_debits - total_credits`; negative means the student is in
    /// credit (overpaid).
    pub current_balance: Decimal,
    /// Number of entries included.
    pub entry_count: usize,
    /// Entry date of the latest included entry in sequence order.
    pub last_entry_date: Option<NaiveDate>,
}

/// Derives the aggregate balance from an entry set.
///
/// Totals are order-independent; `last_entry_date` follows sequence order.
#[must_use]
pub fn balance_from_entries(entries: &[LedgerEntry]) -> LedgerBalance {
    let total_debits: Decimal = entries.iter().map(|e| e.debit_amount).sum();
    let total_credits: Decimal = entries.iter().map(|e| e.credit_amount).sum();
    let last_entry_date = entries
        .iter()
        .max_by_key(|e| e.sequence_number)
        .map(|e| e.entry_date);

    LedgerBalance {
        total_debits,
        total_credits,
        current_balance: total_debits - total_credits,
        entry_count: entries.len(),
        last_entry_date,
    }
}

/// Point-in-time balance: only entries effective on or before `as_of`.
#[must_use]
pub fn balance_at_date(entries: &[LedgerEntry], as_of: NaiveDate) -> LedgerBalance {
    let included: Vec<LedgerEntry> = entries
        .iter()
        .filter(|e| e.effective_date <= as_of)
        .cloned()
        .collect();
    balance_from_entries(&included)
}

/// Balance for a (year, term) window. Annual entries (`term == None`) apply
/// to every term of their year.
#[must_use]
pub fn balance_for_term(entries: &[LedgerEntry], academic_year: &str, term: Term) -> LedgerBalance {
    let included: Vec<LedgerEntry> = entries
        .iter()
        .filter(|e| e.in_period(academic_year, Some(term)))
        .cloned()
        .collect();
    balance_from_entries(&included)
}

/// Recomputes running balances in sequence order, exactly as the store does
/// at append time. Returns `(sequence_number, running_balance)` pairs.
#[must_use]
pub fn recompute_running_balances(entries: &[LedgerEntry]) -> Vec<(i64, Decimal)> {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.sequence_number);

    let mut running = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|e| {
            running += e.signed_amount();
            (e.sequence_number, running)
        })
        .collect()
}

/// Checks that every stored running balance matches the offline
/// recomputation.
#[must_use]
pub fn running_balances_consistent(entries: &[LedgerEntry]) -> bool {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.sequence_number);

    let recomputed = recompute_running_balances(entries);
    ordered
        .iter()
        .zip(recomputed)
        .all(|(entry, (sequence, balance))| {
            entry.sequence_number == sequence && entry.running_balance == balance
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::testing::{charge_draft, charge_on, payment_draft, payment_on, TestLedger};

    #[test]
    fn test_balance_from_entries() {
        let mut ledger = TestLedger::new();
        ledger.append(charge_draft(&ledger, dec!(500)));
        ledger.append(payment_draft(&ledger, dec!(300)));
        ledger.append(payment_draft(&ledger, dec!(250)));

        let balance = balance_from_entries(&ledger.entries);
        assert_eq!(balance.total_debits, dec!(500));
        assert_eq!(balance.total_credits, dec!(550));
        assert_eq!(balance.current_balance, dec!(-50));
        assert_eq!(balance.entry_count, 3);
    }

    #[test]
    fn test_empty_ledger_balance_is_zero() {
        let balance = balance_from_entries(&[]);
        assert_eq!(balance.current_balance, Decimal::ZERO);
        assert_eq!(balance.entry_count, 0);
        assert_eq!(balance.last_entry_date, None);
    }

    #[test]
    fn test_totals_are_order_insensitive() {
        let mut ledger = TestLedger::new();
        ledger.append(charge_draft(&ledger, dec!(500)));
        ledger.append(payment_draft(&ledger, dec!(120)));
        ledger.append(charge_draft(&ledger, dec!(75)));

        let forward = balance_from_entries(&ledger.entries);
        let mut reversed = ledger.entries.clone();
        reversed.reverse();
        let backward = balance_from_entries(&reversed);

        assert_eq!(forward.current_balance, backward.current_balance);
        assert_eq!(forward.total_debits, backward.total_debits);
        assert_eq!(forward.last_entry_date, backward.last_entry_date);
    }

    #[test]
    fn test_balance_at_date_excludes_future_entries() {
        let mut ledger = TestLedger::new();
        let jan = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        ledger.append(charge_on(&ledger, dec!(500), jan));
        ledger.append(payment_on(&ledger, dec!(200), feb));

        let at_jan = balance_at_date(&ledger.entries, jan);
        assert_eq!(at_jan.current_balance, dec!(500));

        let at_feb = balance_at_date(&ledger.entries, feb);
        assert_eq!(at_feb.current_balance, dec!(300));
    }

    #[test]
    fn test_balance_for_term_includes_annual_entries() {
        let mut ledger = TestLedger::new();
        let mut annual = charge_draft(&ledger, dec!(100));
        annual.term = None;
        ledger.append(annual);
        ledger.append(charge_draft(&ledger, dec!(500))); // Term1

        let mut other_year = charge_draft(&ledger, dec!(999));
        other_year.academic_year = "2025".to_string();
        ledger.append(other_year);

        let term1 = balance_for_term(&ledger.entries, "2024", Term::Term1);
        assert_eq!(term1.current_balance, dec!(600));

        let term2 = balance_for_term(&ledger.entries, "2024", Term::Term2);
        assert_eq!(term2.current_balance, dec!(100));
    }

    #[test]
    fn test_running_balances_match_store_values() {
        let mut ledger = TestLedger::new();
        ledger.append(charge_draft(&ledger, dec!(500)));
        ledger.append(payment_draft(&ledger, dec!(300)));
        ledger.append(payment_draft(&ledger, dec!(250)));

        assert!(running_balances_consistent(&ledger.entries));

        let recomputed = recompute_running_balances(&ledger.entries);
        assert_eq!(
            recomputed,
            vec![(1, dec!(500)), (2, dec!(200)), (3, dec!(-50))]
        );
    }

    #[test]
    fn test_tampered_running_balance_detected() {
        let mut ledger = TestLedger::new();
        ledger.append(charge_draft(&ledger, dec!(500)));
        ledger.append(payment_draft(&ledger, dec!(300)));

        let mut entries = ledger.entries.clone();
        entries[1].running_balance = dec!(999);
        assert!(!running_balances_consistent(&entries));
    }
}
