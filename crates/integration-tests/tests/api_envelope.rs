//! Integration tests for the response envelope both binaries serve.

#![allow(clippy::unwrap_used)]

use driftwood_core::{ApiResponse, OrderStatus, Page};
use serde_json::json;

#[test]
fn test_success_envelope_shape() {
    let response = ApiResponse::ok(json!({ "order_number": "ORD-20260806-413902" }));
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(
        value["data"]["order_number"],
        json!("ORD-20260806-413902")
    );
    assert!(value.get("message").is_none());
}

#[test]
fn test_failure_envelope_shape() {
    let response = ApiResponse::<()>::error("insufficient stock for \"Walnut Serving Tray\"");
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(
        value["message"],
        json!("insufficient stock for \"Walnut Serving Tray\"")
    );
    assert!(value.get("data").is_none());
}

#[test]
fn test_paginated_envelope_shape() {
    let page = Page::new(vec!["a", "b", "c"], 2, 3, 8);
    let response = ApiResponse::ok_with_message(page, "orders listed");
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["data"]["items"], json!(["a", "b", "c"]));
    assert_eq!(value["data"]["pagination"]["page"], json!(2));
    assert_eq!(value["data"]["pagination"]["per_page"], json!(3));
    assert_eq!(value["data"]["pagination"]["total"], json!(8));
    assert_eq!(value["data"]["pagination"]["total_pages"], json!(3));
}

/// Status enums serialize in their storage form inside API payloads.
#[test]
fn test_status_serialization_in_payloads() {
    let value = serde_json::to_value(OrderStatus::Preparing).unwrap();
    assert_eq!(value, json!("PREPARING"));

    let parsed: OrderStatus = serde_json::from_value(json!("CANCELLED")).unwrap();
    assert_eq!(parsed, OrderStatus::Cancelled);
}
