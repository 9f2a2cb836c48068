//! Integration tests for the GraphQL transport with a mock server.
//!
//! Verifies:
//! - Success responses pass through, including embedded GraphQL errors
//! - Rate-limit and transient failures are retried until they clear
//! - Exhausted retries surface as `TransportExhausted`

mod common;

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wattvault::api::retry::RetryPolicy;
use wattvault::api::types::{ConsumptionData, GraphQlResponse};
use wattvault::api::{PageRequest, Transport, consumption_payload};
use wattvault::core::models::Resolution;
use wattvault::error::WattError;
use wattvault::test_utils::{consumption_page_json, hourly_nodes, utc};

use common::mount_tail_page;

fn test_transport(server: &MockServer, policy: RetryPolicy) -> Transport {
    Transport::new(server.uri(), "test-token", Duration::from_secs(5), policy)
        .expect("build transport")
}

fn tail_payload() -> serde_json::Value {
    consumption_payload(
        "home-1",
        Resolution::Hourly,
        &PageRequest::Tail { last: 3 },
    )
}

// =============================================================================
// Success Responses
// =============================================================================

#[tokio::test]
async fn execute_returns_envelope_on_success() {
    let server = MockServer::start().await;
    let body = consumption_page_json(&hourly_nodes(utc(2024, 3, 9, 10), 3, 1.0), false, None);
    mount_tail_page(&server, &body).await;

    let transport = test_transport(&server, RetryPolicy::immediate(3));
    let envelope: GraphQlResponse<ConsumptionData> = transport
        .execute(&tail_payload())
        .await
        .expect("execute should succeed");

    let page = envelope.into_page().expect("well-formed page");
    assert_eq!(page.records.len(), 3);
    assert!(!page.has_next_page);
    assert_eq!(page.records[0].from_time, utc(2024, 3, 9, 10));
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let server = MockServer::start().await;
    let body = consumption_page_json(&[], false, None);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(1));
    let result: GraphQlResponse<ConsumptionData> = transport
        .execute(&tail_payload())
        .await
        .expect("authorized request should succeed");
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn embedded_errors_do_not_fail_the_request() {
    let server = MockServer::start().await;
    let mut body = consumption_page_json(&hourly_nodes(utc(2024, 3, 9, 10), 2, 1.0), false, None);
    body["errors"] = serde_json::json!([
        { "message": "field deprecated" },
    ]);

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(3));
    let envelope: GraphQlResponse<ConsumptionData> = transport
        .execute(&tail_payload())
        .await
        .expect("embedded errors must not fail the call");

    assert_eq!(envelope.errors.len(), 1);
    assert_eq!(envelope.errors[0].message, "field deprecated");
    assert_eq!(envelope.into_page().expect("page").records.len(), 2);
}

// =============================================================================
// Retry Behavior
// =============================================================================

#[tokio::test]
async fn rate_limit_then_success_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    let body = consumption_page_json(&hourly_nodes(utc(2024, 3, 9, 10), 1, 1.0), false, None);
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(3));
    let envelope: GraphQlResponse<ConsumptionData> = transport
        .execute(&tail_payload())
        .await
        .expect("third attempt should succeed");
    assert_eq!(envelope.into_page().expect("page").records.len(), 1);
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(3));
    let err = transport
        .execute::<ConsumptionData>(&tail_payload())
        .await
        .expect_err("should exhaust retries");

    match err {
        WattError::TransportExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("500"), "got: {last_error}");
        }
        other => panic!("expected TransportExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_failure_is_retried_to_exhaustion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(2));
    let err = transport
        .execute::<ConsumptionData>(&tail_payload())
        .await
        .expect_err("should exhaust retries");

    match err {
        WattError::TransportExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("401"), "got: {last_error}");
        }
        other => panic!("expected TransportExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_a_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(3)
        .mount(&server)
        .await;

    let transport = test_transport(&server, RetryPolicy::immediate(3));
    let err = transport
        .execute::<ConsumptionData>(&tail_payload())
        .await
        .expect_err("undecodable body should exhaust retries");

    assert!(matches!(
        err,
        WattError::TransportExhausted { attempts: 3, .. }
    ));
}
