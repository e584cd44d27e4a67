//! Order and line item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::Address;

/// A committed order.
///
/// Immutable after commitment except for `status`, `tracking_number`, and the
/// delivery timestamps. `total` always equals
/// `subtotal + shipping_fee - discount` as computed once at commitment; it is
/// never recomputed.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable unique number, e.g. `ORD-20260806-413902`.
    pub order_number: String,
    pub user_id: UserId,
    /// Snapshot copied at checkout, never a reference.
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An immutable snapshot of one product line within an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at time of purchase.
    pub product_name: String,
    /// Unit price actually charged (promo price if one applied).
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// An order hydrated with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Checkout request: everything the commitment engine needs besides the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment_method: String,
    pub notes: Option<String>,
    /// Caller-supplied discount; clamped at zero, otherwise unvalidated.
    pub discount: Option<Decimal>,
}

/// Fully computed order row, ready for insertion.
///
/// Built by the checkout service after pricing; the repository persists it
/// verbatim.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// Line item snapshot ready for insertion.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// Sort direction for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
}

/// Filter and pagination for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Restrict to one user (always set for storefront listings).
    pub user_id: Option<UserId>,
    pub sort: OrderSort,
    pub page: u32,
    pub per_page: u32,
}

impl OrderFilter {
    /// Clamp pagination to sane bounds: page >= 1, 1 <= `per_page` <= 100.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.page == 0 {
            self.page = 1;
        }
        self.per_page = self.per_page.clamp(1, 100);
        self
    }

    /// SQL OFFSET for the normalized page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        let f = OrderFilter {
            page: 0,
            per_page: 0,
            ..OrderFilter::default()
        }
        .normalized();
        assert_eq!(f.page, 1);
        assert_eq!(f.per_page, 1);

        let f = OrderFilter {
            page: 3,
            per_page: 500,
            ..OrderFilter::default()
        }
        .normalized();
        assert_eq!(f.per_page, 100);
        assert_eq!(f.offset(), 200);
    }
}
