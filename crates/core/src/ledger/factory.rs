//! Entry factory.
//!
//! Builders that produce correctly-signed `{debit_amount, credit_amount}`
//! pairs from a requested type and amount. This is the single place where a
//! reversal's sign is decided: the factory inspects the original entry and
//! applies the opposite direction, rather than looking the direction up in
//! the static policy table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{
    FeeCategoryId, FeeStructureId, LedgerEntryId, PaymentId, SchoolId, StudentId, UserId,
};

use super::entry::{EntryType, LedgerEntry, NewLedgerEntry, Term};
use super::error::LedgerError;
use super::policy::EntryDirection;

/// Common fields shared by every draft entry.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// The school (tenant) the ledger belongs to.
    pub school_id: SchoolId,
    /// The student the ledger belongs to.
    pub student_id: StudentId,
    /// The date the entry is recorded against.
    pub entry_date: NaiveDate,
    /// The date the entry takes financial effect.
    pub effective_date: NaiveDate,
    /// The academic year.
    pub academic_year: String,
    /// The term (`None` = annual).
    pub term: Option<Term>,
    /// The user recording the entry.
    pub recorded_by: UserId,
    /// The role the recording user acts under.
    pub recorded_by_role: String,
}

/// Builders for correctly-directioned draft entries.
pub struct EntryFactory;

impl EntryFactory {
    fn directioned(direction: EntryDirection, amount: Decimal) -> (Decimal, Decimal) {
        match direction {
            EntryDirection::Debit => (amount, Decimal::ZERO),
            EntryDirection::Credit => (Decimal::ZERO, amount),
        }
    }

    fn base(
        meta: EntryMeta,
        entry_type: EntryType,
        direction: EntryDirection,
        amount: Decimal,
        description: String,
    ) -> NewLedgerEntry {
        let (debit_amount, credit_amount) = Self::directioned(direction, amount);
        NewLedgerEntry {
            school_id: meta.school_id,
            student_id: meta.student_id,
            entry_type,
            entry_date: meta.entry_date,
            effective_date: meta.effective_date,
            academic_year: meta.academic_year,
            term: meta.term,
            debit_amount,
            credit_amount,
            fee_category_id: None,
            fee_structure_id: None,
            payment_id: None,
            related_entry_id: None,
            description,
            reference_number: None,
            notes: None,
            recorded_by: meta.recorded_by,
            recorded_by_role: meta.recorded_by_role,
        }
    }

    /// Builds a charge draft (debit) against a fee category and structure.
    #[must_use]
    pub fn charge(
        meta: EntryMeta,
        amount: Decimal,
        fee_category_id: FeeCategoryId,
        fee_structure_id: FeeStructureId,
        description: String,
    ) -> NewLedgerEntry {
        let mut draft = Self::base(
            meta,
            EntryType::Charge,
            EntryDirection::Debit,
            amount,
            description,
        );
        draft.fee_category_id = Some(fee_category_id);
        draft.fee_structure_id = Some(fee_structure_id);
        draft
    }

    /// Builds a payment draft (credit), optionally linked to a recorded
    /// payment and external reference.
    #[must_use]
    pub fn payment(
        meta: EntryMeta,
        amount: Decimal,
        description: String,
        payment_id: Option<PaymentId>,
        reference_number: Option<String>,
    ) -> NewLedgerEntry {
        let mut draft = Self::base(
            meta,
            EntryType::Payment,
            EntryDirection::Credit,
            amount,
            description,
        );
        draft.payment_id = payment_id;
        draft.reference_number = reference_number;
        draft
    }

    /// Builds a standalone credit note draft.
    #[must_use]
    pub fn credit(meta: EntryMeta, amount: Decimal, description: String) -> NewLedgerEntry {
        Self::base(
            meta,
            EntryType::Credit,
            EntryDirection::Credit,
            amount,
            description,
        )
    }

    /// Builds an adjustment draft in the requested direction, optionally
    /// referencing the entry being corrected.
    #[must_use]
    pub fn adjustment(
        meta: EntryMeta,
        direction: EntryDirection,
        amount: Decimal,
        description: String,
        related_entry_id: Option<LedgerEntryId>,
    ) -> NewLedgerEntry {
        let entry_type = match direction {
            EntryDirection::Debit => EntryType::AdjustmentDebit,
            EntryDirection::Credit => EntryType::AdjustmentCredit,
        };
        let mut draft = Self::base(meta, entry_type, direction, amount, description);
        draft.related_entry_id = related_entry_id;
        draft
    }

    /// Builds a transfer-in draft (debit): an obligation arriving from
    /// another ledger.
    #[must_use]
    pub fn transfer_in(
        meta: EntryMeta,
        amount: Decimal,
        description: String,
        reference_number: Option<String>,
    ) -> NewLedgerEntry {
        let mut draft = Self::base(
            meta,
            EntryType::TransferIn,
            EntryDirection::Debit,
            amount,
            description,
        );
        draft.reference_number = reference_number;
        draft
    }

    /// Builds a transfer-out draft (credit): an obligation leaving for
    /// another ledger.
    #[must_use]
    pub fn transfer_out(
        meta: EntryMeta,
        amount: Decimal,
        description: String,
        reference_number: Option<String>,
    ) -> NewLedgerEntry {
        let mut draft = Self::base(
            meta,
            EntryType::TransferOut,
            EntryDirection::Credit,
            amount,
            description,
        );
        draft.reference_number = reference_number;
        draft
    }

    /// Builds a reversal draft by inspecting the original entry.
    ///
    /// If the original was a debit, the reversal is a credit of the same
    /// amount, and vice versa. The description is auto-prefixed
    /// "Reversal: ", and category/structure/payment linkage is carried over
    /// so the correction stays traceable.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotReversible`] if the original entry carries
    /// no amount.
    pub fn reversal(meta: EntryMeta, original: &LedgerEntry) -> Result<NewLedgerEntry, LedgerError> {
        let amount = original.amount();
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NotReversible(original.id));
        }

        let direction = if original.is_debit() {
            EntryDirection::Credit
        } else {
            EntryDirection::Debit
        };

        let mut draft = Self::base(
            meta,
            EntryType::Reversal,
            direction,
            amount,
            format!("Reversal: {}", original.description),
        );
        draft.related_entry_id = Some(original.id);
        draft.fee_category_id = original.fee_category_id;
        draft.fee_structure_id = original.fee_structure_id;
        draft.payment_id = original.payment_id;
        Ok(draft)
    }

    /// Builds a waiver draft (credit) forgiving part or all of a charge.
    ///
    /// The caller supplies the charge's outstanding amount (charge debit
    /// minus credits already linked to it); the waiver may not exceed it.
    /// Notes capture the approver and reason.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotACharge`] if the referenced entry is not a
    /// charge, or [`LedgerError::WaiverExceedsOutstanding`] if the amount is
    /// larger than the outstanding amount.
    pub fn waiver(
        meta: EntryMeta,
        charge: &LedgerEntry,
        outstanding: Decimal,
        amount: Decimal,
        approved_by: &str,
        reason: &str,
    ) -> Result<NewLedgerEntry, LedgerError> {
        if charge.entry_type != EntryType::Charge {
            return Err(LedgerError::NotACharge(charge.id));
        }
        if amount > outstanding {
            return Err(LedgerError::WaiverExceedsOutstanding {
                requested: amount,
                outstanding,
            });
        }

        let mut draft = Self::base(
            meta,
            EntryType::Waiver,
            EntryDirection::Credit,
            amount,
            format!("Waiver: {}", charge.description),
        );
        draft.related_entry_id = Some(charge.id);
        draft.fee_category_id = charge.fee_category_id;
        draft.fee_structure_id = charge.fee_structure_id;
        draft.notes = Some(format!("Approved by {approved_by}; reason: {reason}"));
        Ok(draft)
    }
}
