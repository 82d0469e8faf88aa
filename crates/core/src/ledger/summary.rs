//! Period summary generation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, LedgerEntry, Term};

/// Opening/closing balance and per-movement totals for a (year, term)
/// window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// The academic year of the window.
    pub academic_year: String,
    /// The term of the window; `None` summarizes the whole year.
    pub term: Option<Term>,
    /// Balance immediately before the first included entry.
    pub opening_balance: Decimal,
    /// Balance as of the last included entry.
    pub closing_balance: Decimal,
    /// Total charge debits.
    pub total_charges: Decimal,
    /// Total payment credits.
    pub total_payments: Decimal,
    /// Total standalone credit notes.
    pub total_credits: Decimal,
    /// Total waiver credits.
    pub total_waivers: Decimal,
    /// Net adjustments: adjustment debits minus adjustment credits.
    pub net_adjustments: Decimal,
    /// Total transfer-in debits.
    pub total_transfers_in: Decimal,
    /// Total transfer-out credits.
    pub total_transfers_out: Decimal,
    /// Net signed effect of reversal entries.
    pub net_reversals: Decimal,
    /// Number of entries in the window.
    pub entry_count: usize,
}

/// Summarizes a (year, term) window of the ledger.
///
/// Annual entries (`term == None`) are included in every term window of
/// their year. The opening balance is the first included entry's running
/// balance minus its own signed amount, i.e. the balance immediately before
/// it; the closing balance is opening + charges − payments − credits −
/// waivers + net adjustments + transfers in − transfers out + net
/// reversals. When the window is contiguous in sequence this coincides with
/// the last included entry's running balance; entries from other periods
/// interleaved mid-window move the running balance but not the window's net
/// movement.
#[must_use]
pub fn summary_for_period(
    entries: &[LedgerEntry],
    academic_year: &str,
    term: Option<Term>,
) -> LedgerSummary {
    let mut included: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.in_period(academic_year, term))
        .collect();
    included.sort_by_key(|e| e.sequence_number);

    let opening_balance = included
        .first()
        .map_or(Decimal::ZERO, |e| e.running_balance - e.signed_amount());

    let mut summary = LedgerSummary {
        academic_year: academic_year.to_string(),
        term,
        opening_balance,
        closing_balance: opening_balance,
        total_charges: Decimal::ZERO,
        total_payments: Decimal::ZERO,
        total_credits: Decimal::ZERO,
        total_waivers: Decimal::ZERO,
        net_adjustments: Decimal::ZERO,
        total_transfers_in: Decimal::ZERO,
        total_transfers_out: Decimal::ZERO,
        net_reversals: Decimal::ZERO,
        entry_count: included.len(),
    };

    for entry in &included {
        match entry.entry_type {
            EntryType::Charge => summary.total_charges += entry.debit_amount,
            EntryType::Payment => summary.total_payments += entry.credit_amount,
            EntryType::Credit => summary.total_credits += entry.credit_amount,
            EntryType::Waiver => summary.total_waivers += entry.credit_amount,
            EntryType::AdjustmentDebit => summary.net_adjustments += entry.debit_amount,
            EntryType::AdjustmentCredit => summary.net_adjustments -= entry.credit_amount,
            EntryType::TransferIn => summary.total_transfers_in += entry.debit_amount,
            EntryType::TransferOut => summary.total_transfers_out += entry.credit_amount,
            EntryType::Reversal => summary.net_reversals += entry.signed_amount(),
        }
    }

    summary.closing_balance = summary.opening_balance + summary.total_charges
        - summary.total_payments
        - summary.total_credits
        - summary.total_waivers
        + summary.net_adjustments
        + summary.total_transfers_in
        - summary.total_transfers_out
        + summary.net_reversals;

    summary
}
