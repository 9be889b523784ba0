// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end tests of the console against a mock monitoring API.

use serde_json::json;
use stepprflow_client::{ApiClient, ClientConfig, ErrorCode};
use stepprflow_console::{Console, HealthStatus, StoreConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn console_for(server: &MockServer) -> Console {
    let client = ApiClient::new(ClientConfig::new().with_base_url(server.uri())).unwrap();
    Console::new(client, StoreConfig::new())
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_all_fills_every_store() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/api/metrics",
        200,
        json!({
            "totalStarted": 1000,
            "totalCompleted": 950,
            "totalFailed": 30,
            "totalCancelled": 10,
            "globalSuccessRate": 95.0,
            "workflowMetrics": [
                {"topic": "order", "started": 50},
                {"topic": "payment", "started": 100}
            ]
        }),
    )
    .await;
    mount_json(
        &mock_server,
        "/api/circuit-breakers",
        200,
        json!([
            {"name": "broker", "state": "OPEN", "failureRate": 75.0},
            {"name": "payments", "state": "CLOSED"}
        ]),
    )
    .await;
    mount_json(
        &mock_server,
        "/api/health",
        200,
        json!({"status": "UP", "components": {"broker": {"status": "UP"}}}),
    )
    .await;
    mount_json(
        &mock_server,
        "/api/outbox/stats",
        200,
        json!({
            "pending": 2,
            "sent": 98,
            "failed": 0,
            "total": 100,
            "sendRate": 98.0,
            "health": "UP"
        }),
    )
    .await;

    let console = console_for(&mock_server);
    console.refresh_all().await;

    assert!(console.refresh_errors().await.is_empty());
    assert_eq!(console.metrics.total_processed().await, 990);
    assert_eq!(console.metrics.health_status().await, HealthStatus::Healthy);
    assert_eq!(console.metrics.workflows_sorted().await[0].topic, "payment");

    let open = console.circuit_breakers.open_breakers().await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].name, "broker");

    assert!(console.health.is_healthy().await);
    assert_eq!(console.outbox.stats().await.unwrap().sent, 98);
}

#[tokio::test]
async fn test_refresh_all_reports_each_failure_independently() {
    let mock_server = MockServer::start().await;

    mount_json(&mock_server, "/api/metrics", 200, json!({"totalStarted": 3})).await;
    mount_json(
        &mock_server,
        "/api/circuit-breakers",
        500,
        json!({"code": "INTERNAL_ERROR", "message": "breaker registry unavailable"}),
    )
    .await;
    mount_json(
        &mock_server,
        "/api/health",
        503,
        json!({
            "status": "DOWN",
            "components": {
                "broker": {"status": "DOWN", "details": {"error": "connection refused"}},
                "outbox": {"status": "UP"}
            }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/outbox/stats"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let console = console_for(&mock_server);
    console.refresh_all().await;

    assert_eq!(console.metrics.dashboard().await.total_started, 3);
    assert!(console.metrics.error().await.is_none());

    let breaker_error = console.circuit_breakers.error().await.unwrap();
    assert_eq!(breaker_error.code, ErrorCode::InternalError);
    assert_eq!(breaker_error.message, "breaker registry unavailable");

    // An unhealthy service is data, not an error.
    assert!(console.health.error().await.is_none());
    assert!(!console.health.is_healthy().await);
    assert_eq!(console.health.down_components().await, ["broker"]);

    let outbox_error = console.outbox.error().await.unwrap();
    assert!(outbox_error.is_not_found());

    assert_eq!(console.refresh_errors().await.len(), 2);
}

#[tokio::test]
async fn test_resume_conflict_through_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/workflows/exec-1/resume"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "CONCURRENT_MODIFICATION",
            "executionId": "exec-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let console = console_for(&mock_server);
    let outcome = console.executions.resume("exec-1", None).await;

    assert!(!outcome.success);
    assert!(outcome.needs_refresh);
    let error = outcome.error.unwrap();
    assert_eq!(error.code, ErrorCode::ConcurrentModification);
    assert_eq!(error.details.execution_id.as_deref(), Some("exec-1"));
}
