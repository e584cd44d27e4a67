//! Return and refund models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{OrderId, OrderItemId, ProductId, ReturnId, ReturnItemId, ReturnStatus, UserId};

/// A return request against a delivered order.
///
/// References its order by identifier; it does not own the order. At most one
/// non-terminal return may exist per order (enforced both here and by a
/// partial unique index). `refund_amount` is computed once at creation from
/// the order's immutable line item snapshots and never recomputed.
#[derive(Debug, Clone, Serialize)]
pub struct Return {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Human-readable unique number, e.g. `RET-20260806-102455`.
    pub return_number: String,
    pub status: ReturnStatus,
    pub reason: String,
    pub refund_amount: Decimal,
    pub refund_method: String,
    /// Tracking number for the return shipment, once the customer ships it.
    pub tracking_number: Option<String>,
    pub admin_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    /// Set by the explicit restock action; guards against double restocking.
    pub restocked_at: Option<DateTime<Utc>>,
}

/// One returned line, referencing the original order line item.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnItem {
    pub id: ReturnItemId,
    pub return_id: ReturnId,
    pub order_item_id: OrderItemId,
    /// Quantity being returned; never exceeds the original line quantity.
    pub quantity: i32,
}

/// A return hydrated with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnWithItems {
    #[serde(flatten)]
    pub ret: Return,
    pub items: Vec<ReturnItem>,
}

/// One requested line in a return creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnRequestItem {
    pub order_item_id: OrderItemId,
    pub quantity: i32,
}

/// Fully validated return, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewReturn {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub return_number: String,
    pub reason: String,
    pub refund_amount: Decimal,
    pub refund_method: String,
}

/// A return line joined back to its product, for restocking.
#[derive(Debug, Clone)]
pub struct RestockLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Filter and pagination for return listings.
#[derive(Debug, Clone, Default)]
pub struct ReturnFilter {
    pub status: Option<ReturnStatus>,
    pub user_id: Option<UserId>,
    pub page: u32,
    pub per_page: u32,
}

impl ReturnFilter {
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
