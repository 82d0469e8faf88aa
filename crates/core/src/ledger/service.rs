//! Read-side ledger service.
//!
//! Wraps the pure calculators with the trust rule: derived values are only
//! produced over a verified chain. An integrity violation is surfaced as an
//! error, never healed or skipped, and blocks the derived read for the
//! affected range.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::LedgerEntryId;

use super::aging::{aging_analysis, AgingBuckets};
use super::balance::{
    balance_at_date, balance_for_term, balance_from_entries, LedgerBalance,
};
use super::category::{balances_by_category, CategoryBalance};
use super::entry::{LedgerEntry, Term};
use super::error::LedgerError;
use super::integrity::{verify_chain, ChainVerification};
use super::summary::{summary_for_period, LedgerSummary};

/// Read-side operations over an immutable entry snapshot.
pub struct LedgerService;

impl LedgerService {
    /// Runs integrity verification over the snapshot. Audit-path operation;
    /// read-only.
    #[must_use]
    pub fn verify(entries: &[LedgerEntry]) -> ChainVerification {
        verify_chain(entries)
    }

    fn ensure_trusted(entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        let verification = verify_chain(entries);
        match verification.broken_at_sequence {
            None => Ok(()),
            Some(sequence) => Err(LedgerError::IntegrityViolation {
                broken_at_sequence: sequence,
            }),
        }
    }

    /// Aggregate balance over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_balance(entries: &[LedgerEntry]) -> Result<LedgerBalance, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(balance_from_entries(entries))
    }

    /// Point-in-time balance over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_balance_at(
        entries: &[LedgerEntry],
        as_of: NaiveDate,
    ) -> Result<LedgerBalance, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(balance_at_date(entries, as_of))
    }

    /// Term balance over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_balance_for_term(
        entries: &[LedgerEntry],
        academic_year: &str,
        term: Term,
    ) -> Result<LedgerBalance, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(balance_for_term(entries, academic_year, term))
    }

    /// Per-category breakdown over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_category_balances(
        entries: &[LedgerEntry],
    ) -> Result<Vec<CategoryBalance>, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(balances_by_category(entries))
    }

    /// Aging analysis over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_aging(
        entries: &[LedgerEntry],
        as_of: NaiveDate,
    ) -> Result<AgingBuckets, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(aging_analysis(entries, as_of))
    }

    /// Period summary over a verified snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] if the chain is broken.
    pub fn trusted_summary(
        entries: &[LedgerEntry],
        academic_year: &str,
        term: Option<Term>,
    ) -> Result<LedgerSummary, LedgerError> {
        Self::ensure_trusted(entries)?;
        Ok(summary_for_period(entries, academic_year, term))
    }

    /// Resolves a related-entry reference within the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ReferenceNotFound`] if no entry has the id.
    pub fn find_entry(
        entries: &[LedgerEntry],
        id: LedgerEntryId,
    ) -> Result<&LedgerEntry, LedgerError> {
        entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(LedgerError::ReferenceNotFound(id))
    }

    /// Computes the outstanding amount of a charge: its debit minus all
    /// credits linked to it via `related_entry_id` (waivers, reversals,
    /// credit adjustments).
    #[must_use]
    pub fn outstanding_amount(entries: &[LedgerEntry], charge: &LedgerEntry) -> Decimal {
        let linked_credits: Decimal = entries
            .iter()
            .filter(|e| e.related_entry_id == Some(charge.id))
            .map(|e| e.credit_amount)
            .sum();
        charge.debit_amount - linked_credits
    }
}
