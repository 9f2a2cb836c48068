//! Common test utilities for integration tests.
//!
//! Wiremock mounting helpers for the GraphQL endpoint, shared across the
//! transport, walker, and collector tests. Record and response factories
//! live in `wattvault::test_utils`.
#![allow(dead_code)]

use serde_json::Value;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a responder for the tail consumption request (`last: N`).
pub async fn mount_tail_page(server: &MockServer, body: &Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("\"last\":"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a responder for the forward request continuing from `cursor`.
pub async fn mount_cursor_page(server: &MockServer, cursor: &str, body: &Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(format!("\"after\":\"{cursor}\"")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a responder for the homes discovery query.
pub async fn mount_homes(server: &MockServer, body: &Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("homes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
