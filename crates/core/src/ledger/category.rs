//! Per-category balance aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::FeeCategoryId;

use super::entry::{EntryType, LedgerEntry};

/// Charged/paid/waived totals for one fee category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBalance {
    /// The fee category.
    pub fee_category_id: FeeCategoryId,
    /// Debits from charge and adjustment-debit entries.
    pub charged: Decimal,
    /// Credits from payment, credit, and adjustment-credit entries.
    pub paid: Decimal,
    /// Credits from waiver entries.
    pub waived: Decimal,
    /// `charged - paid - waived`.
    pub balance: Decimal,
}

/// Aggregates charged/paid/waived per fee category.
///
/// Entries without a fee category are skipped, and categories with zero
/// activity are omitted. Output is sorted by category id for determinism.
#[must_use]
pub fn balances_by_category(entries: &[LedgerEntry]) -> Vec<CategoryBalance> {
    let mut by_category: BTreeMap<FeeCategoryId, CategoryBalance> = BTreeMap::new();

    for entry in entries {
        let Some(category_id) = entry.fee_category_id else {
            continue;
        };

        let slot = by_category
            .entry(category_id)
            .or_insert_with(|| CategoryBalance {
                fee_category_id: category_id,
                charged: Decimal::ZERO,
                paid: Decimal::ZERO,
                waived: Decimal::ZERO,
                balance: Decimal::ZERO,
            });

        match entry.entry_type {
            EntryType::Charge | EntryType::AdjustmentDebit => slot.charged += entry.debit_amount,
            EntryType::Payment | EntryType::Credit | EntryType::AdjustmentCredit => {
                slot.paid += entry.credit_amount;
            }
            EntryType::Waiver => slot.waived += entry.credit_amount,
            EntryType::Reversal | EntryType::TransferIn | EntryType::TransferOut => {}
        }
    }

    by_category
        .into_values()
        .map(|mut balance| {
            balance.balance = balance.charged - balance.paid - balance.waived;
            balance
        })
        .filter(|balance| {
            balance.charged != Decimal::ZERO
                || balance.paid != Decimal::ZERO
                || balance.waived != Decimal::ZERO
        })
        .collect()
}
