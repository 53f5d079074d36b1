//! Property-based tests for the movement engine.
//!
//! - Total consistency after any sequence of item mutations
//! - Subtotal correctness
//! - Stock conservation under full reversal
//! - Idempotent item deletion
//! - Sufficiency boundary

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::MovementError;
use super::family::Family;
use super::fixture::InMemoryLedger;
use super::line::{LineInput, line_subtotal};
use super::stock::StockPolicy;
use super::types::ItemUpdate;

/// Strategy to generate unit values (0.00 to 999.99).
fn unit_value() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn family_strategy() -> impl Strategy<Value = Family> {
    prop_oneof![Just(Family::StockIn), Just(Family::Sale), Just(Family::Reject)]
}

#[derive(Debug, Clone)]
enum ItemOp {
    Add { quantity: i32, unit_value: Decimal },
    Update { index: usize, quantity: i32, unit_value: Decimal },
    Delete { index: usize },
}

fn item_op() -> impl Strategy<Value = ItemOp> {
    prop_oneof![
        (1i32..50, unit_value()).prop_map(|(quantity, unit_value)| ItemOp::Add {
            quantity,
            unit_value
        }),
        (0usize..8, 1i32..50, unit_value()).prop_map(|(index, quantity, unit_value)| {
            ItemOp::Update {
                index,
                quantity,
                unit_value,
            }
        }),
        (0usize..8).prop_map(|index| ItemOp::Delete { index }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The stored total always equals the sum of surviving subtotals.
    #[test]
    fn prop_total_consistency(
        family in family_strategy(),
        ops in prop::collection::vec(item_op(), 1..20),
    ) {
        let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
        let product = ledger.add_product(100_000);
        let movement = ledger.create(family, vec![]).unwrap();

        for op in ops {
            let items = ledger.item_ids(movement);
            match op {
                ItemOp::Add { quantity, unit_value } => {
                    ledger.add_item(movement, &LineInput::new(product, quantity, unit_value)).unwrap();
                }
                ItemOp::Update { index, quantity, unit_value } if !items.is_empty() => {
                    let item = items[index % items.len()];
                    let update = ItemUpdate { quantity, unit_value, tax: None, discount: None };
                    match ledger.update_item(movement, item, &update) {
                        Ok(()) | Err(MovementError::ItemNotFound(_)) => {}
                        Err(e) => prop_assert!(false, "unexpected error: {e}"),
                    }
                }
                ItemOp::Delete { index } if !items.is_empty() => {
                    ledger.delete_item(movement, items[index % items.len()]).unwrap();
                }
                _ => {}
            }
            prop_assert!(ledger.verify(movement).is_ok());
        }
    }

    /// Sale subtotals add tax and subtract discount; other families ignore both.
    #[test]
    fn prop_subtotal_correctness(
        quantity in 1i32..1_000,
        unit in unit_value(),
        tax in unit_value(),
    ) {
        let base = unit * Decimal::from(quantity);
        let sale = line_subtotal(Family::Sale, quantity, unit, tax, Decimal::ZERO).unwrap();
        prop_assert_eq!(sale, base + tax);

        let discounted = line_subtotal(Family::Sale, quantity, unit, tax, base + tax).unwrap();
        prop_assert_eq!(discounted, Decimal::ZERO);

        for family in [Family::StockIn, Family::Reject] {
            prop_assert_eq!(
                line_subtotal(family, quantity, unit, Decimal::ZERO, Decimal::ZERO).unwrap(),
                base
            );
        }
    }

    /// Deleting every movement returns stock to where it started.
    #[test]
    fn prop_stock_conservation(
        initial in 0i32..500,
        movements in prop::collection::vec((family_strategy(), 1i32..40), 1..12),
    ) {
        let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
        let product = ledger.add_product(initial);

        let mut created = Vec::new();
        for (family, quantity) in movements {
            if let Ok(id) = ledger.create(family, vec![LineInput::new(product, quantity, Decimal::ONE)]) {
                created.push(id);
            }
            prop_assert!(ledger.stock(product) >= 0);
        }

        // Undo newest first so no reversal ever needs stock that a later
        // movement already consumed.
        for id in created.into_iter().rev() {
            ledger.delete_movement(id).unwrap();
        }
        prop_assert_eq!(ledger.stock(product), initial);
    }

    /// A second delete of the same item leaves stock unchanged.
    #[test]
    fn prop_item_delete_idempotent(
        family in family_strategy(),
        quantity in 1i32..100,
        repeats in 1usize..5,
    ) {
        let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
        let product = ledger.add_product(100);
        let movement = ledger
            .create(family, vec![LineInput::new(product, quantity, Decimal::ONE)])
            .unwrap();
        let item = ledger.item_ids(movement)[0];

        ledger.delete_item(movement, item).unwrap();
        let after_first = ledger.stock(product);
        for _ in 0..repeats {
            ledger.delete_item(movement, item).unwrap();
        }
        prop_assert_eq!(ledger.stock(product), after_first);
        prop_assert_eq!(after_first, 100);
    }

    /// Exactly the stock on hand succeeds; one more fails and changes nothing.
    #[test]
    fn prop_sufficiency_boundary(
        stock in 1i32..10_000,
        family in prop_oneof![Just(Family::Sale), Just(Family::Reject)],
    ) {
        let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
        let over = ledger.add_product(stock);
        let result = ledger.create(family, vec![LineInput::new(over, stock + 1, Decimal::ONE)]);
        let is_insufficient = matches!(result, Err(MovementError::InsufficientStock { .. }));
        prop_assert!(is_insufficient);
        prop_assert_eq!(ledger.stock(over), stock);

        let exact = ledger.add_product(stock);
        ledger.create(family, vec![LineInput::new(exact, stock, Decimal::ONE)]).unwrap();
        prop_assert_eq!(ledger.stock(exact), 0);
    }
}
