//! API response envelope and pagination types.
//!
//! Every Driftwood API response, storefront and admin alike, uses the same
//! envelope:
//!
//! ```json
//! {
//!     "success": true,
//!     "message": "order cancelled",
//!     "data": { ... }
//! }
//! ```
//!
//! `message` and `data` are omitted when absent.

use serde::{Deserialize, Serialize};

/// Unified API response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable message (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Create a successful response with a message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Create a failure response with a message and no data.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page number (1-based).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Pagination {
    /// Compute pagination metadata from a page request and a total count.
    #[must_use]
    pub const fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            (total.div_ceil(per_page as u64)) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// A page of items plus its pagination metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Create a new page.
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_omits_message() {
        let json = serde_json::to_string(&ApiResponse::ok(5)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":5}"#);
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_string(&ApiResponse::<()>::error("cart is empty")).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"cart is empty"}"#);
    }

    #[test]
    fn test_ok_with_message() {
        let resp = ApiResponse::ok_with_message(1, "order cancelled");
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("order cancelled"));
        assert_eq!(resp.data, Some(1));
    }

    #[test]
    fn test_pagination_rounds_up() {
        let p = Pagination::new(1, 20, 41);
        assert_eq!(p.total_pages, 3);
        let p = Pagination::new(1, 20, 40);
        assert_eq!(p.total_pages, 2);
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_pagination_zero_per_page() {
        let p = Pagination::new(1, 0, 10);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_page_carries_items_and_metadata() {
        let page = Page::new(vec!["a", "b"], 2, 2, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
