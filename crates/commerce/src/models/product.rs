//! Catalog product model.
//!
//! The wider catalog (descriptions, images, categories) is owned elsewhere;
//! the engine only reads the columns it needs to price and reserve: price,
//! promo price, sellable flag, and the authoritative stock counter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use driftwood_core::ProductId;

/// A sellable catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Base price per unit.
    pub price: Decimal,
    /// Promotional price; takes effect when set and positive.
    pub promo_price: Option<Decimal>,
    pub on_sale: bool,
    /// Whether the product may currently be sold at all.
    pub sellable: bool,
    /// Available stock. Never negative; mutated only by the stock ledger.
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product (seeding and admin stock receiving).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub promo_price: Option<Decimal>,
    pub on_sale: bool,
    pub sellable: bool,
    pub stock: i32,
}
