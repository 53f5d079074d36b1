//! Scenario tests for the movement engine against the in-memory ledger.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::MovementError;
use super::family::Family;
use super::fixture::InMemoryLedger;
use super::line::LineInput;
use super::status::MovementStatus;
use super::stock::StockPolicy;
use super::types::ItemUpdate;

fn qty_update(quantity: i32, unit_value: Decimal) -> ItemUpdate {
    ItemUpdate {
        quantity,
        unit_value,
        tax: None,
        discount: None,
    }
}

#[test]
fn test_scenarios_a_to_e() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(0);

    // A: receive 10 at cost 5.
    let receipt = ledger
        .create(Family::StockIn, vec![LineInput::new(product, 10, dec!(5))])
        .unwrap();
    assert_eq!(ledger.stock(product), 10);
    assert_eq!(ledger.total(receipt), dec!(50));

    // B: sell 4 at 8.
    let sale = ledger
        .create(Family::Sale, vec![LineInput::new(product, 4, dec!(8))])
        .unwrap();
    assert_eq!(ledger.stock(product), 6);
    assert_eq!(ledger.total(sale), dec!(32));

    // C: raise the sale line to 6.
    let sale_item = ledger.item_ids(sale)[0];
    ledger
        .update_item(sale, sale_item, &qty_update(6, dec!(8)))
        .unwrap();
    assert_eq!(ledger.stock(product), 4);
    assert_eq!(ledger.total(sale), dec!(48));

    // D: delete the sale line.
    ledger.delete_item(sale, sale_item).unwrap();
    assert_eq!(ledger.stock(product), 10);
    assert_eq!(ledger.total(sale), Decimal::ZERO);

    // E: reject more than is on hand.
    let err = ledger
        .create(Family::Reject, vec![LineInput::new(product, 11, dec!(1))])
        .unwrap_err();
    assert!(matches!(
        err,
        MovementError::InsufficientStock {
            product_id,
            available: 10,
            requested: 11,
        } if product_id == product
    ));
    assert_eq!(ledger.stock(product), 10);

    ledger.verify(receipt).unwrap();
    ledger.verify(sale).unwrap();
}

#[test]
fn test_reject_boundary() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(7);

    ledger
        .create(Family::Reject, vec![LineInput::new(product, 7, dec!(2))])
        .unwrap();
    assert_eq!(ledger.stock(product), 0);
}

#[test]
fn test_failed_multi_line_create_changes_nothing() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let plenty = ledger.add_product(100);
    let scarce = ledger.add_product(1);

    let err = ledger
        .create(
            Family::Sale,
            vec![
                LineInput::new(plenty, 5, dec!(1)),
                LineInput::new(scarce, 2, dec!(1)),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, MovementError::InsufficientStock { .. }));
    assert_eq!(ledger.stock(plenty), 100);
    assert_eq!(ledger.stock(scarce), 1);
}

#[test]
fn test_completed_movement_is_locked() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(10);
    let sale = ledger
        .create(Family::Sale, vec![LineInput::new(product, 2, dec!(3))])
        .unwrap();
    ledger.transition(sale, MovementStatus::Completed).unwrap();

    let item = ledger.item_ids(sale)[0];
    assert!(matches!(
        ledger.update_item(sale, item, &qty_update(1, dec!(3))),
        Err(MovementError::TransactionLocked { .. })
    ));
    assert!(matches!(
        ledger.delete_item(sale, item),
        Err(MovementError::TransactionLocked { .. })
    ));
    assert!(matches!(
        ledger.add_item(sale, &LineInput::new(product, 1, dec!(3))),
        Err(MovementError::TransactionLocked { .. })
    ));
    assert_eq!(ledger.stock(product), 8);
    assert_eq!(ledger.total(sale), dec!(6));
}

#[test]
fn test_sale_completion_settles() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(10);
    let sale = ledger
        .create(
            Family::Sale,
            vec![LineInput::new(product, 2, dec!(10)).with_tax(dec!(2))],
        )
        .unwrap();

    let settlement = ledger.transition(sale, MovementStatus::Completed).unwrap();
    assert_eq!(settlement.paid, dec!(22));
    assert_eq!(settlement.balance, Decimal::ZERO);
    assert_eq!(ledger.header(sale).paid, dec!(22));
}

#[test]
fn test_deleting_completed_reject_is_locked() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(10);
    let reject = ledger
        .create(Family::Reject, vec![LineInput::new(product, 3, dec!(1))])
        .unwrap();
    ledger.transition(reject, MovementStatus::Completed).unwrap();

    assert!(matches!(
        ledger.delete_movement(reject),
        Err(MovementError::TransactionLocked { .. })
    ));
    assert_eq!(ledger.stock(product), 7);
}

#[test]
fn test_deleting_completed_sale_restores_stock() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(10);
    let sale = ledger
        .create(Family::Sale, vec![LineInput::new(product, 4, dec!(1))])
        .unwrap();
    ledger.transition(sale, MovementStatus::Completed).unwrap();

    ledger.delete_movement(sale).unwrap();
    assert_eq!(ledger.stock(product), 10);
    assert!(matches!(
        ledger.delete_movement(sale),
        Err(MovementError::TransactionNotFound(_))
    ));
}

#[test]
fn test_deleting_item_twice_reverses_once() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(10);
    let reject = ledger
        .create(Family::Reject, vec![LineInput::new(product, 3, dec!(1))])
        .unwrap();
    let item = ledger.item_ids(reject)[0];

    ledger.delete_item(reject, item).unwrap();
    ledger.delete_item(reject, item).unwrap();
    assert_eq!(ledger.stock(product), 10);
}

#[test]
fn test_stock_in_reversal_guard() {
    let mut ledger = InMemoryLedger::new(StockPolicy::STRICT);
    let product = ledger.add_product(0);
    let receipt = ledger
        .create(Family::StockIn, vec![LineInput::new(product, 5, dec!(1))])
        .unwrap();
    ledger
        .create(Family::Sale, vec![LineInput::new(product, 4, dec!(1))])
        .unwrap();

    // Only 1 unit left; removing the receipt would take stock to -4.
    assert!(matches!(
        ledger.delete_movement(receipt),
        Err(MovementError::InsufficientStock { .. })
    ));

    let mut lenient = InMemoryLedger::new(StockPolicy {
        enforce_on_sale: true,
        enforce_on_stock_in_reversal: false,
    });
    let product = lenient.add_product(0);
    let receipt = lenient
        .create(Family::StockIn, vec![LineInput::new(product, 5, dec!(1))])
        .unwrap();
    lenient
        .create(Family::Sale, vec![LineInput::new(product, 4, dec!(1))])
        .unwrap();
    lenient.delete_movement(receipt).unwrap();
    assert_eq!(lenient.stock(product), -4);
}
