//! Human-readable order and return numbers.
//!
//! Numbers are derived from the current UTC date plus a random six-digit
//! suffix: `ORD-20260806-413902`. Collisions are unlikely but possible; the
//! unique index on the number column is the real guarantee, and the checkout
//! service retries once with a fresh suffix when the storage layer reports a
//! collision.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix for order numbers.
pub const ORDER_PREFIX: &str = "ORD";

/// Prefix for return numbers.
pub const RETURN_PREFIX: &str = "RET";

/// Generate an order number for the current date.
#[must_use]
pub fn order_number() -> String {
    numbered(ORDER_PREFIX, Utc::now())
}

/// Generate a return number for the current date.
#[must_use]
pub fn return_number() -> String {
    numbered(RETURN_PREFIX, Utc::now())
}

fn numbered(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}-{}-{:06}", prefix, at.format("%Y%m%d"), suffix)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_shape() {
        let at = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let number = numbered(ORDER_PREFIX, at);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], "20260806");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_prefixes_differ() {
        assert!(order_number().starts_with("ORD-"));
        assert!(return_number().starts_with("RET-"));
    }

    #[test]
    fn test_suffix_is_zero_padded() {
        // Over a handful of draws every suffix must stay exactly six chars.
        for _ in 0..32 {
            let number = order_number();
            let suffix = number.rsplit('-').next().unwrap();
            assert_eq!(suffix.len(), 6);
        }
    }
}
