//! Integration tests for the return/refund state machine.

use driftwood_core::ReturnStatus;

// =============================================================================
// Forward Progress
// =============================================================================

/// The inspection pipeline is strictly linear.
/// REQUESTED -> IN_TRANSIT -> RECEIVED -> VERIFIED -> REFUNDED
#[test]
fn test_inspection_pipeline_is_legal() {
    let path = [
        ReturnStatus::Requested,
        ReturnStatus::InTransit,
        ReturnStatus::Received,
        ReturnStatus::Verified,
        ReturnStatus::Refunded,
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
fn test_no_skipping_inspection_steps() {
    assert!(!ReturnStatus::Requested.can_transition_to(ReturnStatus::Received));
    assert!(!ReturnStatus::Requested.can_transition_to(ReturnStatus::Verified));
    assert!(!ReturnStatus::Requested.can_transition_to(ReturnStatus::Refunded));
    assert!(!ReturnStatus::InTransit.can_transition_to(ReturnStatus::Verified));
    assert!(!ReturnStatus::Received.can_transition_to(ReturnStatus::Refunded));
}

/// A refund is only reachable from VERIFIED - the `processRefund` guard.
#[test]
fn test_refund_requires_verification() {
    for status in ReturnStatus::ALL {
        assert_eq!(
            status.can_transition_to(ReturnStatus::Refunded),
            status == ReturnStatus::Verified,
            "refund from {status}"
        );
    }
}

// =============================================================================
// Failure Paths
// =============================================================================

/// Every non-terminal status can fall out to REFUSED or CANCELLED.
#[test]
fn test_failure_paths_from_any_open_status() {
    for status in ReturnStatus::ALL {
        if status.is_terminal() {
            continue;
        }
        assert!(status.can_transition_to(ReturnStatus::Refused));
        assert!(status.can_transition_to(ReturnStatus::Cancelled));
    }
}

#[test]
fn test_terminal_states() {
    for terminal in [
        ReturnStatus::Refunded,
        ReturnStatus::Refused,
        ReturnStatus::Cancelled,
    ] {
        assert!(terminal.is_terminal());
        for next in ReturnStatus::ALL {
            assert!(
                !terminal.can_transition_to(next),
                "{terminal} -> {next} must be illegal"
            );
        }
    }
}

/// Nothing ever re-enters REQUESTED; a cancelled or refused return needs a
/// fresh request (which the one-open-return rule then allows, since the old
/// one is terminal).
#[test]
fn test_requested_is_entry_only() {
    for status in ReturnStatus::ALL {
        assert!(!status.can_transition_to(ReturnStatus::Requested));
    }
}

/// The tracking-number attachment is the only REQUESTED -> IN_TRANSIT edge,
/// and it exists solely from REQUESTED.
#[test]
fn test_in_transit_only_from_requested() {
    for status in ReturnStatus::ALL {
        assert_eq!(
            status.can_transition_to(ReturnStatus::InTransit),
            status == ReturnStatus::Requested,
            "in-transit from {status}"
        );
    }
}
