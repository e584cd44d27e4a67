//! Driftwood Core - Shared types library.
//!
//! This crate provides common types used across all Driftwood components:
//! - `commerce` - Order lifecycle and inventory engine
//! - `storefront` - Public shopping API (cart, checkout, orders, returns)
//! - `admin` - Internal operations API (fulfillment, refunds, restocking)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the order/return status state machines, and
//!   the API response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
