// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error normalization tests for the HTTP transport.
//!
//! These tests use wiremock to simulate backend failures and check that every
//! failure reaches the caller as a single normalized `ApiError`.

use std::time::Duration;

use serde_json::json;
use stepprflow_client::{
    ApiClient, ClientConfig, ErrorCode, ExecutionApi, HealthApi, MetricsApi, OutboxApi,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new().with_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn test_structured_error_keeps_backend_code_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/workflows/exec-1/resume"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "timestamp": "2025-03-01T10:00:00Z",
            "code": "CONCURRENT_MODIFICATION",
            "message": "Execution was modified concurrently",
            "executionId": "exec-1"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .resume("exec-1", None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ConcurrentModification);
    assert_eq!(err.message, "Execution was modified concurrently");
    assert_eq!(err.details.execution_id.as_deref(), Some("exec-1"));
    assert_eq!(err.status, Some(409));
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_structured_error_without_message_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/workflows/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "RESOURCE_NOT_FOUND",
            "resourceType": "WorkflowExecution",
            "resourceId": "missing"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .execution("missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.message, "The requested item was not found");
    assert_eq!(err.details.resource_type.as_deref(), Some("WorkflowExecution"));
    assert_eq!(err.details.resource_id.as_deref(), Some("missing"));
}

#[tokio::test]
async fn test_unstructured_statuses_are_mapped() {
    let cases = [
        (401, ErrorCode::Unauthorized),
        (403, ErrorCode::Forbidden),
        (404, ErrorCode::ResourceNotFound),
        (500, ErrorCode::InternalError),
        (502, ErrorCode::InternalError),
        (418, ErrorCode::UnknownError),
    ];

    for (status, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/outbox/stats"))
            .respond_with(ResponseTemplate::new(status).set_body_string("<html>error</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).outbox_stats().await.unwrap_err();
        assert_eq!(err.code, expected, "status {}", status);
        assert_eq!(err.status, Some(status));
    }
}

#[tokio::test]
async fn test_unhealthy_body_survives_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "status": "DOWN",
            "components": {
                "broker": {"status": "DOWN", "details": {"type": "kafka", "available": false}}
            }
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).health().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::InternalError);
    assert_eq!(err.status, Some(503));
    let payload = err.payload.expect("503 body should be kept");
    assert_eq!(payload["components"]["broker"]["status"], "DOWN");
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(
        ClientConfig::new()
            .with_base_url(mock_server.uri())
            .with_request_timeout(Duration::from_millis(50)),
    )
    .unwrap();

    let err = client.metrics_dashboard().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Timeout);
    assert!(err.status.is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client =
        ApiClient::new(ClientConfig::new().with_base_url(format!("http://127.0.0.1:{}", port)))
            .unwrap();

    let err = client.recent().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NetworkError);
    assert!(err.status.is_none());
    assert!(err.payload.is_none());
}

#[tokio::test]
async fn test_undecodable_success_body_is_request_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/workflows/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).recent().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestError);
}
