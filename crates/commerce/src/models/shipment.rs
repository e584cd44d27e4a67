//! Fulfillment timeline events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use driftwood_core::{OrderId, ShipmentEventId};

/// One append-only event in an order's fulfillment timeline.
///
/// Loosely coupled to the order state machine: transitions append events
/// here, nothing ever reads them back for decisions.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentEvent {
    pub id: ShipmentEventId,
    pub order_id: OrderId,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
