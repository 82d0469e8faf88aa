//! Payment aging analysis.
//!
//! Payments are matched against charges first-in-first-out from one pooled
//! credit total, not per category. The pooled simplification is part of the
//! contract for this report and must not be replaced with exact allocation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, LedgerEntry};

/// Unpaid charge amounts bucketed by days overdue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    /// Not yet due (effective date on or after the as-of date).
    pub current: Decimal,
    /// Overdue 1-30 days.
    pub days_1_30: Decimal,
    /// Overdue 31-60 days.
    pub days_31_60: Decimal,
    /// Overdue 61-90 days.
    pub days_61_90: Decimal,
    /// Overdue more than 90 days.
    pub days_over_90: Decimal,
}

impl AgingBuckets {
    /// Total unpaid amount across all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.days_over_90
    }

    fn add(&mut self, days_overdue: i64, amount: Decimal) {
        match days_overdue {
            i64::MIN..=0 => self.current += amount,
            1..=30 => self.days_1_30 += amount,
            31..=60 => self.days_31_60 += amount,
            61..=90 => self.days_61_90 += amount,
            _ => self.days_over_90 += amount,
        }
    }
}

/// Buckets unpaid charge amounts by age as of `as_of`.
///
/// Walks charges in ascending effective-date order, consuming one pooled
/// credit total (payments, credits, waivers) to satisfy each charge FIFO;
/// whatever remains of a charge is bucketed by
/// `as_of - charge.effective_date` in days.
#[must_use]
pub fn aging_analysis(entries: &[LedgerEntry], as_of: NaiveDate) -> AgingBuckets {
    let mut charges: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Charge)
        .collect();
    charges.sort_by_key(|e| (e.effective_date, e.sequence_number));

    let mut credit_pool: Decimal = entries
        .iter()
        .filter(|e| {
            matches!(
                e.entry_type,
                EntryType::Payment | EntryType::Credit | EntryType::Waiver
            )
        })
        .map(|e| e.credit_amount)
        .sum();

    let mut buckets = AgingBuckets::default();
    for charge in charges {
        let consumed = credit_pool.min(charge.debit_amount);
        credit_pool -= consumed;

        let remaining = charge.debit_amount - consumed;
        if remaining > Decimal::ZERO {
            let days_overdue = (as_of - charge.effective_date).num_days();
            buckets.add(days_overdue, remaining);
        }
    }

    buckets
}
