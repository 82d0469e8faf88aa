//! Ledger entry domain types.
//!
//! A [`LedgerEntry`] is one immutable record of a single financial movement
//! against a student's account. Entries are append-only: corrections are new
//! entries referencing the original via `related_entry_id`, never edits.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    FeeCategoryId, FeeStructureId, LedgerEntryId, PaymentId, SchoolId, StudentId, UserId,
};

use super::integrity;

/// Type of ledger entry.
///
/// Each type has a fixed arithmetic direction except `Reversal`, whose
/// direction is the inverse of the entry it reverses and is decided by the
/// factory at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A fee charged to the student (debit).
    Charge,
    /// A payment received against the student's account (credit).
    Payment,
    /// A standalone credit note (credit).
    Credit,
    /// A correcting adjustment that increases the amount owed (debit).
    AdjustmentDebit,
    /// A correcting adjustment that decreases the amount owed (credit).
    AdjustmentCredit,
    /// Forgiveness of part or all of a previously charged amount (credit).
    Waiver,
    /// Cancels a prior entry by applying the opposite direction.
    Reversal,
    /// A balance transferred in from another ledger (debit).
    TransferIn,
    /// A balance transferred out to another ledger (credit).
    TransferOut,
}

impl EntryType {
    /// Stable wire name, used for serialization and canonical hashing.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Payment => "payment",
            Self::Credit => "credit",
            Self::AdjustmentDebit => "adjustment_debit",
            Self::AdjustmentCredit => "adjustment_credit",
            Self::Waiver => "waiver",
            Self::Reversal => "reversal",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Academic term within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// First term.
    Term1,
    /// Second term.
    Term2,
    /// Third term.
    Term3,
}

/// A single immutable entry in a student's fee ledger.
///
/// Exactly one of `debit_amount` / `credit_amount` is non-zero. The entry is
/// linked into a per-student hash chain via `previous_hash`, and carries the
/// running balance as of and including itself, computed once at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The school (tenant) this entry belongs to.
    pub school_id: SchoolId,
    /// The student whose ledger this entry belongs to.
    pub student_id: StudentId,
    /// Monotonic, gap-free sequence number per (school, student) ledger.
    pub sequence_number: i64,
    /// The type of financial movement.
    pub entry_type: EntryType,
    /// The date the entry was recorded against.
    pub entry_date: NaiveDate,
    /// The date the entry takes financial effect (due date for charges).
    pub effective_date: NaiveDate,
    /// The academic year this entry belongs to (e.g. "2024").
    pub academic_year: String,
    /// The term this entry applies to; `None` means the entry is annual and
    /// applies across all terms of the year.
    pub term: Option<Term>,
    /// Debit amount (increases the amount owed). Zero for credit entries.
    pub debit_amount: Decimal,
    /// Credit amount (decreases the amount owed). Zero for debit entries.
    pub credit_amount: Decimal,
    /// The fee category this entry is attributed to, if any.
    pub fee_category_id: Option<FeeCategoryId>,
    /// The fee structure that produced this entry, if any.
    pub fee_structure_id: Option<FeeStructureId>,
    /// The recorded payment that produced this entry, if any.
    pub payment_id: Option<PaymentId>,
    /// The entry this one corrects; required for waivers and reversals.
    pub related_entry_id: Option<LedgerEntryId>,
    /// Human-readable description (required, at most 500 characters).
    pub description: String,
    /// External reference number (receipt number, bank reference).
    pub reference_number: Option<String>,
    /// Free-form notes (e.g. waiver approver and reason).
    pub notes: Option<String>,
    /// The user who recorded this entry.
    pub recorded_by: UserId,
    /// The role the recording user acted under.
    pub recorded_by_role: String,
    /// When the entry was persisted.
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 hash of this entry's canonical serialization.
    pub entry_hash: String,
    /// The `entry_hash` of the immediately preceding entry in sequence; the
    /// first entry chains from [`integrity::GENESIS_HASH`].
    pub previous_hash: String,
    /// Cumulative balance as of and including this entry.
    pub running_balance: Decimal,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit_amount - self.credit_amount
    }

    /// Returns the non-zero amount of this entry.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        if self.debit_amount > Decimal::ZERO {
            self.debit_amount
        } else {
            self.credit_amount
        }
    }

    /// Returns true if this entry is a debit movement.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.debit_amount > Decimal::ZERO
    }

    /// Returns true if this entry falls in the given (year, term) window.
    ///
    /// Annual entries (`term == None`) apply to every term of their year.
    #[must_use]
    pub fn in_period(&self, academic_year: &str, term: Option<Term>) -> bool {
        if self.academic_year != academic_year {
            return false;
        }
        match term {
            None => true,
            Some(t) => self.term.is_none() || self.term == Some(t),
        }
    }
}

/// A draft ledger entry, produced by the factory and not yet appended.
///
/// The durable store assigns `id`, `sequence_number`, `previous_hash`,
/// `entry_hash`, `running_balance`, and `recorded_at` when sealing the draft
/// into a [`LedgerEntry`].
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// The school (tenant) this entry belongs to.
    pub school_id: SchoolId,
    /// The student whose ledger this entry belongs to.
    pub student_id: StudentId,
    /// The type of financial movement.
    pub entry_type: EntryType,
    /// The date the entry is recorded against.
    pub entry_date: NaiveDate,
    /// The date the entry takes financial effect.
    pub effective_date: NaiveDate,
    /// The academic year this entry belongs to.
    pub academic_year: String,
    /// The term this entry applies to (`None` = annual).
    pub term: Option<Term>,
    /// Debit amount; zero for credit entries.
    pub debit_amount: Decimal,
    /// Credit amount; zero for debit entries.
    pub credit_amount: Decimal,
    /// The fee category this entry is attributed to, if any.
    pub fee_category_id: Option<FeeCategoryId>,
    /// The fee structure that produced this entry, if any.
    pub fee_structure_id: Option<FeeStructureId>,
    /// The recorded payment that produced this entry, if any.
    pub payment_id: Option<PaymentId>,
    /// The entry this one corrects; required for waivers and reversals.
    pub related_entry_id: Option<LedgerEntryId>,
    /// Human-readable description.
    pub description: String,
    /// External reference number.
    pub reference_number: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// The user recording this entry.
    pub recorded_by: UserId,
    /// The role the recording user acts under.
    pub recorded_by_role: String,
}

impl NewLedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit_amount - self.credit_amount
    }

    /// Returns the non-zero amount of this draft.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        if self.debit_amount > Decimal::ZERO {
            self.debit_amount
        } else {
            self.credit_amount
        }
    }

    /// Seals this draft into a permanent [`LedgerEntry`].
    ///
    /// Called by the durable store with its assigned identity, sequence and
    /// chain tip. The entry hash and running balance are computed here so
    /// that append-time and offline recomputation share one code path.
    #[must_use]
    pub fn seal(
        self,
        id: LedgerEntryId,
        sequence_number: i64,
        previous_hash: String,
        previous_running_balance: Decimal,
        recorded_at: DateTime<Utc>,
    ) -> LedgerEntry {
        let running_balance = previous_running_balance + self.signed_amount();
        let entry_hash = integrity::entry_hash(&integrity::HashInput {
            sequence_number,
            entry_type: self.entry_type,
            debit_amount: self.debit_amount,
            credit_amount: self.credit_amount,
            student_id: self.student_id,
            school_id: self.school_id,
            entry_date: self.entry_date,
            effective_date: self.effective_date,
            description: &self.description,
            previous_hash: &previous_hash,
        });

        LedgerEntry {
            id,
            school_id: self.school_id,
            student_id: self.student_id,
            sequence_number,
            entry_type: self.entry_type,
            entry_date: self.entry_date,
            effective_date: self.effective_date,
            academic_year: self.academic_year,
            term: self.term,
            debit_amount: self.debit_amount,
            credit_amount: self.credit_amount,
            fee_category_id: self.fee_category_id,
            fee_structure_id: self.fee_structure_id,
            payment_id: self.payment_id,
            related_entry_id: self.related_entry_id,
            description: self.description,
            reference_number: self.reference_number,
            notes: self.notes,
            recorded_by: self.recorded_by,
            recorded_by_role: self.recorded_by_role,
            recorded_at,
            entry_hash,
            previous_hash,
            running_balance,
        }
    }
}
