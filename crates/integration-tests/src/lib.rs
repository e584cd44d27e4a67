//! Integration tests for Driftwood.
//!
//! # Test Categories
//!
//! - `order_lifecycle` - the order state machine end to end
//! - `return_lifecycle` - the return/refund state machine end to end
//! - `checkout_pricing` - commitment arithmetic and its invariants
//! - `api_envelope` - the response envelope both binaries serve
//!
//! These tests exercise the engine's decision logic without a live
//! database. The storage-level halves of the same invariants (conditional
//! stock updates, the commitment transaction, the partial unique index on
//! open returns) are structural properties of the SQL in
//! `driftwood-commerce::db` and are documented there.
//!
//! # Running against a live stack
//!
//! ```bash
//! dw-cli migrate && dw-cli seed
//! cargo test -p driftwood-integration-tests
//! ```
