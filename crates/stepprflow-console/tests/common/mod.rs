// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for the store tests.
//!
//! Provides `FakeApi`, an in-memory implementation of every gateway trait
//! whose replies are scripted per endpoint. A reply can be ready up front or
//! held back behind a oneshot channel so tests decide completion order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use stepprflow_client::{
    ApiError, CircuitBreakerApi, CircuitBreakerConfig, CircuitBreakerStatus, DashboardApi,
    DashboardConfig, DashboardOverview, ErrorCode, Execution, ExecutionApi, ExecutionPage,
    ExecutionStats, HealthApi, HealthReport, MetricsApi, MetricsDashboard, MetricsSummary,
    OutboxApi, OutboxStats, QueryParams, Result, WorkflowDefinition, WorkflowFilters,
    WorkflowMetrics,
};
use tokio::sync::oneshot;

enum Reply<T> {
    Now(Result<T>),
    Later(oneshot::Receiver<Result<T>>),
}

/// Queue of replies for one endpoint, consumed in call order.
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T: Send> Script<T> {
    pub fn ok(&self, value: T) {
        self.replies.lock().unwrap().push_back(Reply::Now(Ok(value)));
    }

    pub fn err(&self, error: ApiError) {
        self.replies.lock().unwrap().push_back(Reply::Now(Err(error)));
    }

    /// Queue a reply that resolves when the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<Result<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Later(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Later(rx)) => rx.await.unwrap_or_else(|_| Err(ApiError::network())),
            None => Err(ApiError::new(ErrorCode::UnknownError, "no scripted reply")),
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub overview: Script<DashboardOverview>,
    pub dashboard_config: Script<DashboardConfig>,
    pub workflows: Script<Vec<WorkflowDefinition>>,

    pub executions: Script<ExecutionPage>,
    pub execution: Script<Execution>,
    pub recent: Script<Vec<Execution>>,
    pub stats: Script<ExecutionStats>,
    pub resume: Script<Option<Execution>>,
    pub cancel: Script<Option<Execution>>,
    pub update_payload: Script<Execution>,
    pub restore_payload: Script<Execution>,

    pub metrics_dashboard: Script<MetricsDashboard>,
    pub topic_metrics: Script<WorkflowMetrics>,
    pub metrics_summary: Script<MetricsSummary>,

    pub breakers: Script<Vec<CircuitBreakerStatus>>,
    pub breaker_config: Script<CircuitBreakerConfig>,
    pub breaker: Script<CircuitBreakerStatus>,
    pub reset: Script<Option<CircuitBreakerStatus>>,

    pub health: Script<HealthReport>,
    pub outbox: Script<OutboxStats>,

    /// Query of every `executions` call, in call order.
    pub queries: Mutex<Vec<QueryParams>>,
    /// `(id, from_step)` of every `resume` call.
    pub resumed: Mutex<Vec<(String, Option<u32>)>>,
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn overview(&self) -> Result<DashboardOverview> {
        self.overview.next().await
    }

    async fn dashboard_config(&self) -> Result<DashboardConfig> {
        self.dashboard_config.next().await
    }

    async fn workflows(&self, _filters: &WorkflowFilters) -> Result<Vec<WorkflowDefinition>> {
        self.workflows.next().await
    }
}

#[async_trait]
impl ExecutionApi for FakeApi {
    async fn executions(&self, query: &QueryParams) -> Result<ExecutionPage> {
        self.queries.lock().unwrap().push(query.clone());
        self.executions.next().await
    }

    async fn execution(&self, _id: &str) -> Result<Execution> {
        self.execution.next().await
    }

    async fn recent(&self) -> Result<Vec<Execution>> {
        self.recent.next().await
    }

    async fn execution_stats(&self) -> Result<ExecutionStats> {
        self.stats.next().await
    }

    async fn resume(&self, id: &str, from_step: Option<u32>) -> Result<Option<Execution>> {
        self.resumed
            .lock()
            .unwrap()
            .push((id.to_string(), from_step));
        self.resume.next().await
    }

    async fn cancel(&self, _id: &str) -> Result<Option<Execution>> {
        self.cancel.next().await
    }

    async fn update_payload_field(
        &self,
        _id: &str,
        _field_path: &str,
        _new_value: Value,
        _reason: &str,
    ) -> Result<Execution> {
        self.update_payload.next().await
    }

    async fn restore_payload(&self, _id: &str) -> Result<Execution> {
        self.restore_payload.next().await
    }
}

#[async_trait]
impl MetricsApi for FakeApi {
    async fn metrics_dashboard(&self) -> Result<MetricsDashboard> {
        self.metrics_dashboard.next().await
    }

    async fn topic_metrics(&self, _topic: &str) -> Result<WorkflowMetrics> {
        self.topic_metrics.next().await
    }

    async fn metrics_summary(&self) -> Result<MetricsSummary> {
        self.metrics_summary.next().await
    }
}

#[async_trait]
impl CircuitBreakerApi for FakeApi {
    async fn circuit_breakers(&self) -> Result<Vec<CircuitBreakerStatus>> {
        self.breakers.next().await
    }

    async fn circuit_breaker_config(&self) -> Result<CircuitBreakerConfig> {
        self.breaker_config.next().await
    }

    async fn circuit_breaker(&self, _name: &str) -> Result<CircuitBreakerStatus> {
        self.breaker.next().await
    }

    async fn reset_circuit_breaker(&self, _name: &str) -> Result<Option<CircuitBreakerStatus>> {
        self.reset.next().await
    }
}

#[async_trait]
impl HealthApi for FakeApi {
    async fn health(&self) -> Result<HealthReport> {
        self.health.next().await
    }
}

#[async_trait]
impl OutboxApi for FakeApi {
    async fn outbox_stats(&self) -> Result<OutboxStats> {
        self.outbox.next().await
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn execution(id: &str, status: &str) -> Execution {
    serde_json::from_value(json!({
        "executionId": id,
        "topic": "order-workflow",
        "status": status,
        "payload": {"orderId": 42}
    }))
    .unwrap()
}

pub fn page(ids: &[&str], total_elements: u64, total_pages: u32) -> ExecutionPage {
    ExecutionPage {
        content: ids.iter().map(|id| execution(id, "COMPLETED")).collect(),
        total_elements,
        total_pages,
    }
}

pub fn metrics_dashboard(value: Value) -> MetricsDashboard {
    serde_json::from_value(value).unwrap()
}

pub fn breaker(name: &str, state: &str) -> CircuitBreakerStatus {
    serde_json::from_value(json!({"name": name, "state": state})).unwrap()
}

pub fn conflict() -> ApiError {
    ApiError::new(ErrorCode::ConcurrentModification, "Execution was modified concurrently")
        .with_status(409)
}

/// Yield until `check` holds. Panics if it never does.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..1_000 {
        if check().await {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition was never reached");
}
