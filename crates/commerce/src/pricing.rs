//! Pure pricing rules: unit price selection, shipping fee, and order totals.
//!
//! Everything here is arithmetic over values already in hand - no I/O - so
//! checkout math is testable without a database. The checkout service applies
//! these functions exactly once per commitment; totals are snapshotted onto
//! the order and never recomputed.

use rust_decimal::Decimal;

/// Subtotal at or above this ships free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// The unit price a line actually pays: the promotional price when one is
/// set and positive, the base price otherwise.
#[must_use]
pub fn effective_unit_price(price: Decimal, promo_price: Option<Decimal>) -> Decimal {
    match promo_price {
        Some(promo) if promo > Decimal::ZERO => promo,
        _ => price,
    }
}

/// Shipping fee for a given subtotal.
#[must_use]
pub fn shipping_fee(subtotal: Decimal) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// The money columns of an order, computed once at commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Compute order totals from a subtotal and a caller-supplied discount.
///
/// The discount defaults to zero and is clamped at zero; beyond that it is
/// not validated here (it arrives pre-authorized from the caller). The
/// invariant `total = subtotal + shipping_fee - discount` holds by
/// construction.
#[must_use]
pub fn totals(subtotal: Decimal, discount: Option<Decimal>) -> OrderTotals {
    let discount = discount.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
    let shipping_fee = shipping_fee(subtotal);
    OrderTotals {
        subtotal,
        shipping_fee,
        discount,
        total: subtotal + shipping_fee - discount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_promo_price_wins_when_positive() {
        assert_eq!(effective_unit_price(dec(80), Some(dec(50))), dec(50));
    }

    #[test]
    fn test_base_price_when_no_promo() {
        assert_eq!(effective_unit_price(dec(80), None), dec(80));
    }

    #[test]
    fn test_base_price_when_promo_not_positive() {
        assert_eq!(effective_unit_price(dec(80), Some(Decimal::ZERO)), dec(80));
        assert_eq!(effective_unit_price(dec(80), Some(dec(-5))), dec(80));
    }

    #[test]
    fn test_shipping_fee_below_threshold() {
        assert_eq!(shipping_fee(dec(99)), FLAT_SHIPPING_FEE);
        assert_eq!(shipping_fee(Decimal::new(9999, 2)), FLAT_SHIPPING_FEE);
    }

    #[test]
    fn test_shipping_free_at_threshold() {
        assert_eq!(shipping_fee(dec(100)), Decimal::ZERO);
        assert_eq!(shipping_fee(dec(250)), Decimal::ZERO);
    }

    #[test]
    fn test_totals_invariant_holds() {
        let t = totals(dec(85), Some(dec(10)));
        assert_eq!(t.shipping_fee, FLAT_SHIPPING_FEE);
        assert_eq!(t.total, t.subtotal + t.shipping_fee - t.discount);
        assert_eq!(t.total, dec(90));
    }

    #[test]
    fn test_totals_discount_defaults_to_zero() {
        let t = totals(dec(40), None);
        assert_eq!(t.discount, Decimal::ZERO);
        assert_eq!(t.total, dec(55));
    }

    #[test]
    fn test_totals_negative_discount_clamped() {
        let t = totals(dec(40), Some(dec(-20)));
        assert_eq!(t.discount, Decimal::ZERO);
        assert_eq!(t.total, dec(55));
    }

    // Two units at 100 each: subtotal 200 clears the free-shipping threshold,
    // so the total stays exactly 200.
    #[test]
    fn test_two_units_at_one_hundred() {
        let subtotal = dec(100) * dec(2);
        let t = totals(subtotal, None);
        assert_eq!(t.subtotal, dec(200));
        assert_eq!(t.shipping_fee, Decimal::ZERO);
        assert_eq!(t.total, dec(200));
    }
}
