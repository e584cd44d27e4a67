//! Postal address value type.

use serde::{Deserialize, Serialize};

/// A shipping or billing address.
///
/// Stored on orders as a JSONB *copy* of whatever the caller submitted at
/// checkout. Orders never reference a user's address book row, so later
/// address edits do not rewrite order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient full name.
    pub name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_serde_round_trip() {
        let address = Address {
            name: "Ada Lovelace".to_string(),
            line1: "12 Analytical Way".to_string(),
            line2: None,
            city: "London".to_string(),
            region: None,
            postal_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        };
        let json = serde_json::to_string(&address).unwrap();
        assert!(!json.contains("line2"));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
