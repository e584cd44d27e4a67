//! Integration tests for the order state machine.
//!
//! These verify the decision logic every mutation path consults before
//! writing: the transition table, the terminal states, and the narrower
//! user-cancellation window.

use driftwood_core::OrderStatus;

// =============================================================================
// Happy Path
// =============================================================================

/// The full fulfillment sequence is legal step by step.
/// PENDING -> CONFIRMED -> PREPARING -> SHIPPED -> DELIVERED
#[test]
fn test_full_fulfillment_path_is_legal() {
    let path = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    for pair in path.windows(2) {
        assert!(
            pair[0].can_transition_to(pair[1]),
            "{} -> {} should be legal",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_no_skipping_fulfillment_steps() {
    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
    assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
    assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Delivered));
}

#[test]
fn test_no_moving_backwards() {
    assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
    assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Preparing));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
}

// =============================================================================
// Cancellation
// =============================================================================

/// Admins may cancel up to and including PREPARING; a shipped order is
/// committed to delivery.
#[test]
fn test_cancellation_window() {
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
    assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
    assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
}

/// Users get a narrower window than admins: PENDING and CONFIRMED only.
#[test]
fn test_user_window_is_narrower_than_admin_window() {
    for status in OrderStatus::ALL {
        if status.is_user_cancellable() {
            assert!(
                status.can_transition_to(OrderStatus::Cancelled),
                "user-cancellable {status} must also be admin-cancellable"
            );
        }
    }
    // The asymmetry: PREPARING is admin-cancellable but not user-cancellable.
    assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Preparing.is_user_cancellable());
}

// =============================================================================
// Terminal States
// =============================================================================

#[test]
fn test_terminal_states() {
    assert!(OrderStatus::Delivered.is_terminal());
    assert!(OrderStatus::Cancelled.is_terminal());
    assert!(!OrderStatus::Pending.is_terminal());
    assert!(!OrderStatus::Shipped.is_terminal());

    for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
        for next in OrderStatus::ALL {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

/// Only DELIVERED unlocks returns; the guard in the return service checks
/// for equality with this exact status.
#[test]
fn test_delivered_is_the_only_return_eligible_status() {
    let eligible: Vec<_> = OrderStatus::ALL
        .into_iter()
        .filter(|s| *s == OrderStatus::Delivered)
        .collect();
    assert_eq!(eligible, vec![OrderStatus::Delivered]);
}
