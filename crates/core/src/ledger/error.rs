//! Ledger error types.
//!
//! Four families: validation failures (recoverable, field-level detail),
//! missing references (recoverable), concurrency conflicts (retryable), and
//! integrity violations (fatal to trust in the ledger; never auto-corrected).

use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::types::LedgerEntryId;

use super::validation::FieldError;

fn summarize_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// One or more field-level validation failures. Every violated check is
    /// reported; per-field detail lives in the [`FieldError`] list rather
    /// than in separate variants.
    #[error("Entry validation failed: {}", summarize_fields(.0))]
    Validation(Vec<FieldError>),

    /// Waiver amount exceeds the charge's outstanding amount.
    #[error("Waiver of {requested} exceeds outstanding amount {outstanding}")]
    WaiverExceedsOutstanding {
        /// The requested waiver amount.
        requested: Decimal,
        /// The charge's remaining unpaid amount.
        outstanding: Decimal,
    },

    /// Waivers can only reference charge entries.
    #[error("Entry {0} is not a charge and cannot be waived")]
    NotACharge(LedgerEntryId),

    /// The referenced entry carries no amount to reverse.
    #[error("Entry {0} cannot be reversed")]
    NotReversible(LedgerEntryId),

    // ========== Reference Errors ==========
    /// A waiver/reversal cites an entry that does not exist in the ledger.
    #[error("Referenced entry not found: {0}")]
    ReferenceNotFound(LedgerEntryId),

    // ========== Concurrency Errors ==========
    /// The chain tip advanced between read and append.
    #[error("Ledger chain tip mismatch: expected {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The chain tip hash the caller expected.
        expected: String,
        /// The chain tip hash actually found.
        actual: String,
    },

    // ========== Integrity Errors ==========
    /// Hash-chain break detected on read. Not recoverable by retry; blocks
    /// derived reads for the affected range until resolved.
    #[error("Ledger integrity violation at sequence {broken_at_sequence}")]
    IntegrityViolation {
        /// Sequence number of the first broken entry.
        broken_at_sequence: i64,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::WaiverExceedsOutstanding { .. } => "WAIVER_EXCEEDS_OUTSTANDING",
            Self::NotACharge(_) => "NOT_A_CHARGE",
            Self::NotReversible(_) => "NOT_REVERSIBLE",
            Self::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::IntegrityViolation { .. } => "INTEGRITY_VIOLATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Validation(_)
            | Self::WaiverExceedsOutstanding { .. }
            | Self::NotACharge(_)
            | Self::NotReversible(_) => 400,

            // 404 Not Found
            Self::ReferenceNotFound(_) => 404,

            // 409 Conflict - retryable concurrency and (non-retryable)
            // integrity failures
            Self::ConcurrencyConflict { .. } | Self::IntegrityViolation { .. } => 409,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}
