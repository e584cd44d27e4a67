//! Integration tests for commitment arithmetic.
//!
//! The checkout service snapshots these numbers onto the order exactly once;
//! the invariant `total = subtotal + shipping_fee - discount` therefore only
//! needs to hold at computation time, which is what these tests pin down.

use driftwood_commerce::pricing::{
    self, FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD,
};
use rust_decimal::Decimal;

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

// =============================================================================
// Constants
// =============================================================================

#[test]
fn test_shipping_constants() {
    assert_eq!(FREE_SHIPPING_THRESHOLD, dec(100));
    assert_eq!(FLAT_SHIPPING_FEE, dec(15));
}

// =============================================================================
// Unit Price Selection
// =============================================================================

/// A set, positive promo price wins; anything else falls back to base.
#[test]
fn test_promo_price_selection() {
    assert_eq!(pricing::effective_unit_price(dec(80), Some(dec(60))), dec(60));
    assert_eq!(pricing::effective_unit_price(dec(80), None), dec(80));
    assert_eq!(
        pricing::effective_unit_price(dec(80), Some(Decimal::ZERO)),
        dec(80)
    );
}

// =============================================================================
// Order Totals
// =============================================================================

/// Two units of a 100-unit product: the subtotal of 200 clears the
/// free-shipping threshold, so the total is exactly 200.
#[test]
fn test_two_units_at_one_hundred_ship_free() {
    let unit_price = pricing::effective_unit_price(dec(100), None);
    let subtotal = unit_price * dec(2);
    let totals = pricing::totals(subtotal, None);

    assert_eq!(totals.subtotal, dec(200));
    assert_eq!(totals.shipping_fee, Decimal::ZERO);
    assert_eq!(totals.discount, Decimal::ZERO);
    assert_eq!(totals.total, dec(200));
}

#[test]
fn test_small_order_pays_flat_fee() {
    let totals = pricing::totals(dec(45), None);
    assert_eq!(totals.shipping_fee, dec(15));
    assert_eq!(totals.total, dec(60));
}

#[test]
fn test_threshold_is_inclusive() {
    assert_eq!(pricing::totals(dec(100), None).shipping_fee, Decimal::ZERO);
    assert_eq!(
        pricing::totals(Decimal::new(9999, 2), None).shipping_fee,
        dec(15)
    );
}

/// The invariant holds across a sweep of subtotals and discounts.
#[test]
fn test_total_invariant_across_inputs() {
    for subtotal in [0, 1, 50, 99, 100, 101, 250, 10_000] {
        for discount in [None, Some(dec(0)), Some(dec(5)), Some(dec(-3))] {
            let totals = pricing::totals(dec(subtotal), discount);
            assert_eq!(
                totals.total,
                totals.subtotal + totals.shipping_fee - totals.discount,
                "subtotal {subtotal}, discount {discount:?}"
            );
            assert!(totals.discount >= Decimal::ZERO);
        }
    }
}

#[test]
fn test_discount_reduces_total_after_shipping() {
    // Discount applies to subtotal + fee, not to the fee decision itself:
    // a 95 subtotal with a 10 discount still pays shipping.
    let totals = pricing::totals(dec(95), Some(dec(10)));
    assert_eq!(totals.shipping_fee, dec(15));
    assert_eq!(totals.total, dec(100));
}

// =============================================================================
// Refund Arithmetic
// =============================================================================

/// A return's refund amount is unit price x requested quantity, summed over
/// the requested lines - the same snapshot arithmetic as the order subtotal.
#[test]
fn test_refund_amount_mirrors_snapshot_arithmetic() {
    let lines = [(dec(100), 2), (dec(36), 1)];
    let refund: Decimal = lines
        .iter()
        .map(|(unit_price, quantity)| unit_price * dec(*quantity))
        .sum();
    assert_eq!(refund, dec(236));
}
