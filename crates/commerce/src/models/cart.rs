//! Cart staging models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use driftwood_core::{CartEntryId, ProductId, UserId};

/// One (user, product) staging row in the cart.
///
/// Carts never mutate stock; they only express intent. The row is deleted on
/// explicit removal, on cart clear, or when checkout consumes the cart inside
/// the commitment transaction.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart entry joined with live product data, priced for display.
///
/// Prices here are a preview; the binding snapshot is taken at commitment.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
    /// Live stock, so the storefront can warn before checkout fails.
    pub available_stock: i32,
    pub sellable: bool,
}
