//! Status enums for orders and returns.
//!
//! Both status fields drive state machines whose transition tables live here,
//! in one place, as `can_transition_to`. Every mutation path - storefront
//! cancellation, admin fulfillment updates, the return workflow - must consult
//! these tables before writing; nothing else in the codebase is allowed to
//! encode a transition rule.

use serde::{Deserialize, Serialize};

/// Order fulfillment lifecycle status.
///
/// ```text
/// PENDING -> CONFIRMED -> PREPARING -> SHIPPED -> DELIVERED
///    |           |            |
///    +-----------+------------+--> CANCELLED
/// ```
///
/// `DELIVERED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All order statuses, for exhaustive iteration in guards and tests.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether this status has no outbound transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The single source of truth for legal order status transitions.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Preparing | Self::Cancelled)
                | (Self::Preparing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether the *owning user* may still cancel an order in this status.
    ///
    /// Narrower than the transition table: admins may cancel a `PREPARING`
    /// order, users may not.
    #[must_use]
    pub const fn is_user_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Stable storage representation (matches the serde rename).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PREPARING" => Ok(Self::Preparing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Return/refund lifecycle status.
///
/// ```text
/// REQUESTED -> IN_TRANSIT -> RECEIVED -> VERIFIED -> REFUNDED
///     |            |            |           |
///     +------------+------------+-----------+--> REFUSED | CANCELLED
/// ```
///
/// `REFUNDED`, `REFUSED`, and `CANCELLED` are terminal. `REFUNDED` is only
/// reachable through the explicit refund operation, never through a plain
/// status update; the table still lists it so the refund path shares the
/// same guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    #[default]
    Requested,
    InTransit,
    Received,
    Verified,
    Refunded,
    Refused,
    Cancelled,
}

impl ReturnStatus {
    /// All return statuses, for exhaustive iteration in guards and tests.
    pub const ALL: [Self; 7] = [
        Self::Requested,
        Self::InTransit,
        Self::Received,
        Self::Verified,
        Self::Refunded,
        Self::Refused,
        Self::Cancelled,
    ];

    /// Whether this status has no outbound transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Refunded | Self::Refused | Self::Cancelled)
    }

    /// The single source of truth for legal return status transitions.
    ///
    /// Forward progress is strictly linear; any non-terminal status may fall
    /// out to `REFUSED` or `CANCELLED`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Refused | Self::Cancelled => true,
            Self::InTransit => matches!(self, Self::Requested),
            Self::Received => matches!(self, Self::InTransit),
            Self::Verified => matches!(self, Self::Received),
            Self::Refunded => matches!(self, Self::Verified),
            Self::Requested => false,
        }
    }

    /// Stable storage representation (matches the serde rename).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::InTransit => "IN_TRANSIT",
            Self::Received => "RECEIVED",
            Self::Verified => "VERIFIED",
            Self::Refunded => "REFUNDED",
            Self::Refused => "REFUSED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReturnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(Self::Requested),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "RECEIVED" => Ok(Self::Received),
            "VERIFIED" => Ok(Self::Verified),
            "REFUNDED" => Ok(Self::Refunded),
            "REFUSED" => Ok(Self::Refused),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid return status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_transition_table() {
        use OrderStatus::{Cancelled, Confirmed, Delivered, Pending, Preparing, Shipped};

        let legal = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Preparing),
            (Confirmed, Cancelled),
            (Preparing, Shipped),
            (Preparing, Cancelled),
            (Shipped, Delivered),
        ];

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_order_terminal_states_have_no_exits() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_order_self_transitions_are_illegal() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_user_cancellation_window() {
        assert!(OrderStatus::Pending.is_user_cancellable());
        assert!(OrderStatus::Confirmed.is_user_cancellable());
        assert!(!OrderStatus::Preparing.is_user_cancellable());
        assert!(!OrderStatus::Shipped.is_user_cancellable());
        assert!(!OrderStatus::Delivered.is_user_cancellable());
        assert!(!OrderStatus::Cancelled.is_user_cancellable());
    }

    #[test]
    fn test_admin_may_cancel_preparing_but_not_shipped() {
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_return_transition_table() {
        use ReturnStatus::{
            Cancelled, InTransit, Received, Refunded, Refused, Requested, Verified,
        };

        let legal = [
            (Requested, InTransit),
            (Requested, Refused),
            (Requested, Cancelled),
            (InTransit, Received),
            (InTransit, Refused),
            (InTransit, Cancelled),
            (Received, Verified),
            (Received, Refused),
            (Received, Cancelled),
            (Verified, Refunded),
            (Verified, Refused),
            (Verified, Cancelled),
        ];

        for from in ReturnStatus::ALL {
            for to in ReturnStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_return_terminal_states_have_no_exits() {
        for from in [
            ReturnStatus::Refunded,
            ReturnStatus::Refused,
            ReturnStatus::Cancelled,
        ] {
            assert!(from.is_terminal());
            for to in ReturnStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_refund_only_from_verified() {
        for from in ReturnStatus::ALL {
            let expected = from == ReturnStatus::Verified;
            assert_eq!(from.can_transition_to(ReturnStatus::Refunded), expected);
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
        for status in ReturnStatus::ALL {
            assert_eq!(ReturnStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::from_str("SHIPPING").is_err());
        assert!(ReturnStatus::from_str("requested").is_err());
    }

    #[test]
    fn test_status_serde_matches_storage_form() {
        let json = serde_json::to_string(&ReturnStatus::InTransit).unwrap();
        assert_eq!(json, "\"IN_TRANSIT\"");
        let back: OrderStatus = serde_json::from_str("\"PREPARING\"").unwrap();
        assert_eq!(back, OrderStatus::Preparing);
    }
}
