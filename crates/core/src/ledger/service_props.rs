//! Property tests for ledger derivations and integrity.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{balance_from_entries, running_balances_consistent};
use super::entry::LedgerEntry;
use super::factory::EntryFactory;
use super::integrity::verify_chain;
use super::policy::EntryDirection;
use super::testing::{charge_draft, payment_draft, TestLedger};

#[derive(Debug, Clone, Copy)]
enum Movement {
    Charge,
    Payment,
    Credit,
    AdjustDebit,
    AdjustCredit,
}

fn movement_strategy() -> impl Strategy<Value = (Movement, Decimal)> {
    let kind = prop_oneof![
        Just(Movement::Charge),
        Just(Movement::Payment),
        Just(Movement::Credit),
        Just(Movement::AdjustDebit),
        Just(Movement::AdjustCredit),
    ];
    let amount = (1i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2));
    (kind, amount)
}

fn ledger_strategy(max_len: usize) -> impl Strategy<Value = Vec<(Movement, Decimal)>> {
    prop::collection::vec(movement_strategy(), 1..=max_len)
}

fn build_ledger(movements: &[(Movement, Decimal)]) -> TestLedger {
    let mut ledger = TestLedger::new();
    for (movement, amount) in movements {
        let draft = match movement {
            Movement::Charge => charge_draft(&ledger, *amount),
            Movement::Payment => payment_draft(&ledger, *amount),
            Movement::Credit => {
                EntryFactory::credit(ledger.meta(), *amount, "Credit note".to_string())
            }
            Movement::AdjustDebit => EntryFactory::adjustment(
                ledger.meta(),
                EntryDirection::Debit,
                *amount,
                "Correction".to_string(),
                None,
            ),
            Movement::AdjustCredit => EntryFactory::adjustment(
                ledger.meta(),
                EntryDirection::Credit,
                *amount,
                "Correction".to_string(),
                None,
            ),
        };
        ledger.append(draft);
    }
    ledger
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any entry set, `current_balance == total_debits - total_credits`.
    #[test]
    fn prop_balance_identity(movements in ledger_strategy(25)) {
        let ledger = build_ledger(&movements);
        let balance = balance_from_entries(&ledger.entries);
        prop_assert_eq!(
            balance.current_balance,
            balance.total_debits - balance.total_credits
        );
    }

    /// Reordering the input does not change derived totals.
    #[test]
    fn prop_totals_order_insensitive(
        movements in ledger_strategy(15),
        seed in any::<u64>(),
    ) {
        let ledger = build_ledger(&movements);
        let baseline = balance_from_entries(&ledger.entries);

        // Deterministic shuffle driven by the seed.
        let mut shuffled: Vec<LedgerEntry> = ledger.entries.clone();
        let len = shuffled.len();
        for i in 0..len {
            #[allow(clippy::cast_possible_truncation)]
            let j = ((seed.wrapping_mul(i as u64 + 1).wrapping_add(17)) % len as u64) as usize;
            shuffled.swap(i, j);
        }

        let reordered = balance_from_entries(&shuffled);
        prop_assert_eq!(baseline.total_debits, reordered.total_debits);
        prop_assert_eq!(baseline.total_credits, reordered.total_credits);
        prop_assert_eq!(baseline.current_balance, reordered.current_balance);
    }

    /// Stored running balances match the offline recomputation, and the
    /// final running balance equals the aggregate balance.
    #[test]
    fn prop_running_balances_reconstruct(movements in ledger_strategy(25)) {
        let ledger = build_ledger(&movements);
        prop_assert!(running_balances_consistent(&ledger.entries));

        let balance = balance_from_entries(&ledger.entries);
        let last = ledger.entries.last().unwrap();
        prop_assert_eq!(last.running_balance, balance.current_balance);
    }

    /// A charge followed by its full reversal nets to a zero balance
    /// change.
    #[test]
    fn prop_charge_plus_reversal_nets_zero(
        movements in ledger_strategy(10),
        amount in (1i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2)),
    ) {
        let mut ledger = build_ledger(&movements);
        let before = balance_from_entries(&ledger.entries).current_balance;

        let charge = ledger.append(charge_draft(&ledger, amount));
        let reversal = EntryFactory::reversal(ledger.meta(), &charge).unwrap();
        ledger.append(reversal);

        let after = balance_from_entries(&ledger.entries).current_balance;
        prop_assert_eq!(before, after);
    }

    /// An untampered chain always verifies.
    #[test]
    fn prop_untampered_chain_verifies(movements in ledger_strategy(20)) {
        let ledger = build_ledger(&movements);
        prop_assert!(verify_chain(&ledger.entries).is_valid);
    }

    /// Mutating any single entry is detected at that entry's sequence
    /// number.
    #[test]
    fn prop_single_mutation_detected(
        movements in ledger_strategy(20),
        index in any::<prop::sample::Index>(),
        mutation in 0u8..3,
    ) {
        let ledger = build_ledger(&movements);
        let mut entries = ledger.entries.clone();
        let i = index.index(entries.len());

        match mutation {
            0 => entries[i].debit_amount += Decimal::ONE,
            1 => entries[i].entry_hash = "tampered".to_string(),
            _ => entries[i].previous_hash = "tampered".to_string(),
        }

        let result = verify_chain(&entries);
        prop_assert!(!result.is_valid);
        prop_assert_eq!(result.broken_at_sequence, Some(entries[i].sequence_number));
    }
}
