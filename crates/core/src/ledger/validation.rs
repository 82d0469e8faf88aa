//! Pre-submission validation for ledger entries.
//!
//! Checked at the caller boundary for responsiveness and re-enforced at the
//! durable-write boundary, since client-side checks are a convenience, not a
//! security boundary. All failures are collected as field-level errors; a
//! payment/credit that exceeds the current balance is a warning, not a
//! rejection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, NewLedgerEntry};

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Per-entry amount cap in currency units.
#[must_use]
pub fn max_entry_amount() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// The offending field.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Non-fatal validation warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A payment/credit exceeds the current balance and will produce a
    /// credit (overpayment) on the ledger.
    Overpayment {
        /// The credit amount being applied.
        amount: Decimal,
        /// The balance before this entry.
        current_balance: Decimal,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overpayment {
                amount,
                current_balance,
            } => write!(
                f,
                "Payment of {amount} exceeds current balance {current_balance}; \
                 the ledger will carry a credit"
            ),
        }
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Warnings the caller may surface; none of these block the entry.
    pub warnings: Vec<ValidationWarning>,
}

/// Validates a draft entry against policy and the current derived balance.
///
/// Checks, in order: amount is positive, amount is within the per-entry cap,
/// a related entry is present when the type's policy requires one, and the
/// description is non-empty and within length. There is no partial success:
/// on failure every violated check is reported.
///
/// # Errors
///
/// Returns the full list of field-level errors when any check fails.
pub fn validate_entry(
    draft: &NewLedgerEntry,
    current_balance: Decimal,
) -> Result<ValidationReport, Vec<FieldError>> {
    let mut errors = Vec::new();
    let amount = draft.amount();

    if amount <= Decimal::ZERO {
        errors.push(FieldError::new("amount", "Amount must be greater than zero"));
    } else if amount > max_entry_amount() {
        errors.push(FieldError::new("amount", "Amount exceeds maximum allowed"));
    }

    let policy = draft.entry_type.policy();
    if policy.requires_related_entry && draft.related_entry_id.is_none() {
        errors.push(FieldError::new(
            "related_entry_id",
            format!(
                "A related entry reference is required for {}",
                draft.entry_type
            ),
        ));
    }

    if draft.description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    } else if draft.description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new(
            "description",
            format!("Description exceeds {MAX_DESCRIPTION_LEN} characters"),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut report = ValidationReport::default();
    if matches!(draft.entry_type, EntryType::Payment | EntryType::Credit)
        && draft.credit_amount > current_balance
    {
        report.warnings.push(ValidationWarning::Overpayment {
            amount: draft.credit_amount,
            current_balance,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::testing::{charge_draft, payment_draft, waiver_draft_without_related, TestLedger};

    #[test]
    fn test_valid_charge_passes() {
        let ledger = TestLedger::new();
        let draft = charge_draft(&ledger, dec!(500));
        let report = validate_entry(&draft, Decimal::ZERO).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let ledger = TestLedger::new();
        let draft = charge_draft(&ledger, dec!(0));
        let errors = validate_entry(&draft, Decimal::ZERO).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
        assert_eq!(errors[0].message, "Amount must be greater than zero");
    }

    #[test]
    fn test_amount_over_cap_rejected() {
        let ledger = TestLedger::new();
        let draft = charge_draft(&ledger, dec!(2000000));
        let errors = validate_entry(&draft, Decimal::ZERO).unwrap_err();
        assert_eq!(errors[0].message, "Amount exceeds maximum allowed");
    }

    #[test]
    fn test_amount_at_cap_allowed() {
        let ledger = TestLedger::new();
        let draft = charge_draft(&ledger, dec!(1000000));
        assert!(validate_entry(&draft, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_waiver_without_related_entry_rejected() {
        let ledger = TestLedger::new();
        let draft = waiver_draft_without_related(&ledger, dec!(100));
        let errors = validate_entry(&draft, dec!(500)).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "related_entry_id"));
    }

    #[test]
    fn test_empty_description_rejected() {
        let ledger = TestLedger::new();
        let mut draft = charge_draft(&ledger, dec!(100));
        draft.description = "   ".to_string();
        let errors = validate_entry(&draft, Decimal::ZERO).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "description"));
    }

    #[test]
    fn test_oversized_description_rejected() {
        let ledger = TestLedger::new();
        let mut draft = charge_draft(&ledger, dec!(100));
        draft.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        let errors = validate_entry(&draft, Decimal::ZERO).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "description"));
    }

    #[test]
    fn test_all_errors_collected() {
        let ledger = TestLedger::new();
        let mut draft = waiver_draft_without_related(&ledger, dec!(0));
        draft.description = String::new();
        let errors = validate_entry(&draft, Decimal::ZERO).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_overpayment_warns_instead_of_rejecting() {
        let ledger = TestLedger::new();
        let draft = payment_draft(&ledger, dec!(250));
        let report = validate_entry(&draft, dec!(200)).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            report.warnings[0],
            ValidationWarning::Overpayment { .. }
        ));
    }

    #[test]
    fn test_exact_payment_does_not_warn() {
        let ledger = TestLedger::new();
        let draft = payment_draft(&ledger, dec!(200));
        let report = validate_entry(&draft, dec!(200)).unwrap();
        assert!(report.warnings.is_empty());
    }
}
