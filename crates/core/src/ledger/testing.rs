//! Test helpers for building sealed, chained ledgers in memory.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{
    FeeCategoryId, FeeStructureId, LedgerEntryId, SchoolId, StudentId, UserId,
};

use super::entry::{EntryType, LedgerEntry, NewLedgerEntry, Term};
use super::factory::{EntryFactory, EntryMeta};
use super::integrity::GENESIS_HASH;

/// An in-memory ledger that seals drafts the same way the durable store
/// does, for use in unit and property tests.
pub(crate) struct TestLedger {
    pub school_id: SchoolId,
    pub student_id: StudentId,
    pub recorded_by: UserId,
    pub entries: Vec<LedgerEntry>,
}

pub(crate) fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

impl TestLedger {
    pub fn new() -> Self {
        Self {
            school_id: SchoolId::new(),
            student_id: StudentId::new(),
            recorded_by: UserId::new(),
            entries: Vec::new(),
        }
    }

    pub fn meta(&self) -> EntryMeta {
        self.meta_on(default_date())
    }

    pub fn meta_on(&self, date: NaiveDate) -> EntryMeta {
        EntryMeta {
            school_id: self.school_id,
            student_id: self.student_id,
            entry_date: date,
            effective_date: date,
            academic_year: "2024".to_string(),
            term: Some(Term::Term1),
            recorded_by: self.recorded_by,
            recorded_by_role: "bursar".to_string(),
        }
    }

    pub fn tip_hash(&self) -> String {
        self.entries
            .last()
            .map_or_else(|| GENESIS_HASH.to_string(), |e| e.entry_hash.clone())
    }

    /// Seals and appends a draft, assigning sequence/hash/running balance.
    pub fn append(&mut self, draft: NewLedgerEntry) -> LedgerEntry {
        let sequence = i64::try_from(self.entries.len()).unwrap() + 1;
        let previous_running = self
            .entries
            .last()
            .map_or(Decimal::ZERO, |e| e.running_balance);
        let entry = draft.seal(
            LedgerEntryId::new(),
            sequence,
            self.tip_hash(),
            previous_running,
            Utc::now(),
        );
        self.entries.push(entry.clone());
        entry
    }
}

pub(crate) fn charge_draft(ledger: &TestLedger, amount: Decimal) -> NewLedgerEntry {
    charge_on(ledger, amount, default_date())
}

pub(crate) fn charge_on(ledger: &TestLedger, amount: Decimal, date: NaiveDate) -> NewLedgerEntry {
    EntryFactory::charge(
        ledger.meta_on(date),
        amount,
        FeeCategoryId::new(),
        FeeStructureId::new(),
        "Term 1 tuition".to_string(),
    )
}

pub(crate) fn payment_draft(ledger: &TestLedger, amount: Decimal) -> NewLedgerEntry {
    payment_on(ledger, amount, default_date())
}

pub(crate) fn payment_on(ledger: &TestLedger, amount: Decimal, date: NaiveDate) -> NewLedgerEntry {
    EntryFactory::payment(
        ledger.meta_on(date),
        amount,
        "Payment received".to_string(),
        None,
        None,
    )
}

/// A structurally invalid waiver draft missing its required related entry.
pub(crate) fn waiver_draft_without_related(
    ledger: &TestLedger,
    amount: Decimal,
) -> NewLedgerEntry {
    let meta = ledger.meta();
    NewLedgerEntry {
        school_id: meta.school_id,
        student_id: meta.student_id,
        entry_type: EntryType::Waiver,
        entry_date: meta.entry_date,
        effective_date: meta.effective_date,
        academic_year: meta.academic_year,
        term: meta.term,
        debit_amount: Decimal::ZERO,
        credit_amount: amount,
        fee_category_id: None,
        fee_structure_id: None,
        payment_id: None,
        related_entry_id: None,
        description: "Waiver without reference".to_string(),
        reference_number: None,
        notes: None,
        recorded_by: meta.recorded_by,
        recorded_by_role: meta.recorded_by_role,
    }
}
