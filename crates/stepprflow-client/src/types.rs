// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wire types returned by the monitoring API.
//!
//! Missing fields default rather than fail: the dashboard must keep working
//! against backends that omit optional parts of a response.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Executions
// ============================================================================

/// Workflow execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// Queued, not yet started.
    Pending,
    /// A step is currently running.
    InProgress,
    /// All steps finished successfully.
    Completed,
    /// A step failed and retries are exhausted.
    Failed,
    /// Waiting for the next retry attempt.
    RetryPending,
    /// Cancelled by an operator.
    Cancelled,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl WorkflowStatus {
    /// Every status the dashboard can filter on.
    pub const ALL: [WorkflowStatus; 6] = [
        WorkflowStatus::Pending,
        WorkflowStatus::InProgress,
        WorkflowStatus::Completed,
        WorkflowStatus::Failed,
        WorkflowStatus::RetryPending,
        WorkflowStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "PENDING",
            WorkflowStatus::InProgress => "IN_PROGRESS",
            WorkflowStatus::Completed => "COMPLETED",
            WorkflowStatus::Failed => "FAILED",
            WorkflowStatus::RetryPending => "RETRY_PENDING",
            WorkflowStatus::Cancelled => "CANCELLED",
            WorkflowStatus::Unknown => "UNKNOWN",
        }
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }

    /// Whether an operator may resume an execution in this status.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Failed | WorkflowStatus::RetryPending | WorkflowStatus::Pending
        )
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        WorkflowStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown workflow status: {}", s))
    }
}

/// Retry bookkeeping for an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryInfo {
    pub attempt: u32,
    pub max_attempts: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Failure details, present when an execution is FAILED.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: Option<String>,
    pub message: Option<String>,
    pub exception_type: Option<String>,
    pub stack_trace: Option<String>,
    pub step_id: u32,
    pub step_label: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One entry in an execution's step history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepExecution {
    pub step_id: u32,
    pub step_label: Option<String>,
    pub status: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub error_message: Option<String>,
    pub attempt: u32,
}

/// A payload edit recorded on the execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayloadChange {
    pub field_path: String,
    pub old_value: Value,
    pub new_value: Value,
    pub changed_by: Option<String>,
    pub changed_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// A workflow execution as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub execution_id: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub topic: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub total_steps: u32,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub payload_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub retry_info: Option<RetryInfo>,
    #[serde(default)]
    pub error_info: Option<ErrorInfo>,
    #[serde(default)]
    pub step_history: Vec<StepExecution>,
    #[serde(default)]
    pub payload_history: Vec<PayloadChange>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub initiated_by: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// One page of executions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionPage {
    pub content: Vec<Execution>,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("invalid sort direction: {}", other)),
        }
    }
}

/// Body of `PATCH /workflows/{id}/payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadFieldUpdate {
    pub field_path: String,
    pub new_value: Value,
    pub changed_by: String,
    pub reason: String,
}

/// Execution counts keyed by status name, plus whatever else the backend adds.
pub type ExecutionStats = Map<String, Value>;

// ============================================================================
// Dashboard
// ============================================================================

/// A registered workflow as listed in the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub topic: String,
    pub description: String,
    /// Step count.
    pub steps: u32,
}

/// Response of `GET /dashboard/overview`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardOverview {
    pub stats: ExecutionStats,
    pub recent_executions: Vec<Execution>,
    pub workflows: Vec<WorkflowSummary>,
}

/// UI settings served by `GET /dashboard/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub title: Option<String>,
    /// Auto-refresh interval in seconds.
    pub refresh_interval: Option<u64>,
    pub dark_mode: bool,
    pub base_path: Option<String>,
}

/// A step of a workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: u32,
    pub label: String,
    pub description: String,
    pub skippable: bool,
    pub continue_on_failure: bool,
}

/// A service instance that registered a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceInstance {
    pub service_name: String,
    pub instance_id: String,
    pub host: String,
    pub port: u16,
}

/// A workflow definition from `GET /dashboard/workflows`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub topic: String,
    pub service_name: Option<String>,
    pub description: String,
    pub status: Option<String>,
    pub steps: Vec<WorkflowStep>,
    pub partitions: u32,
    pub replication: u32,
    pub registered_by: Vec<ServiceInstance>,
}

/// Filters accepted by `GET /dashboard/workflows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowFilters {
    pub topic: Option<String>,
    pub service_name: Option<String>,
    pub status: Option<String>,
}

// ============================================================================
// Metrics
// ============================================================================

/// Per-topic counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowMetrics {
    pub topic: String,
    pub service_name: Option<String>,
    pub started: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub active: u64,
    pub retries: u64,
    pub dlq: u64,
    pub avg_duration_ms: f64,
    pub success_rate: f64,
}

/// Response of `GET /metrics`.
///
/// Absent counters decode as zero and an absent `workflowMetrics` as an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricsDashboard {
    pub total_started: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_cancelled: u64,
    pub total_active: u64,
    pub total_retries: u64,
    pub total_dlq: u64,
    pub global_success_rate: f64,
    pub global_failure_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub workflow_metrics: Vec<WorkflowMetrics>,
}

/// Response of `GET /metrics/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricsSummary {
    pub topic: String,
    pub service_name: Option<String>,
    pub workflows_started: u64,
    pub workflows_completed: u64,
    pub workflows_failed: u64,
    pub workflows_cancelled: u64,
    pub workflows_active: u64,
    pub retry_count: u64,
    pub dlq_count: u64,
    pub avg_workflow_duration_ms: f64,
    pub success_rate: f64,
}

// ============================================================================
// Circuit breakers
// ============================================================================

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
    Disabled,
    ForcedOpen,
    MetricsOnly,
    #[serde(other)]
    Unknown,
}

impl BreakerState {
    /// Whether calls are currently being rejected.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerState::Open | BreakerState::ForcedOpen)
    }
}

/// Status of one circuit breaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreakerStatus {
    pub name: String,
    pub state: BreakerState,
    #[serde(default)]
    pub successful_calls: u64,
    #[serde(default)]
    pub failed_calls: u64,
    #[serde(default)]
    pub not_permitted_calls: u64,
    #[serde(default)]
    pub buffered_calls: u64,
    #[serde(default)]
    pub slow_calls: u64,
    #[serde(default)]
    pub slow_successful_calls: u64,
    #[serde(default)]
    pub slow_failed_calls: u64,
    #[serde(default)]
    pub failure_rate: f32,
    #[serde(default)]
    pub slow_call_rate: f32,
}

/// Circuit breaker settings shared by every breaker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreakerConfig {
    pub enabled: bool,
    pub failure_rate_threshold: f32,
    pub slow_call_rate_threshold: f32,
    pub slow_call_duration_threshold_ms: u64,
    pub sliding_window_size: u32,
    pub minimum_number_of_calls: u32,
    pub permitted_number_of_calls_in_half_open_state: u32,
    pub wait_duration_in_open_state_ms: u64,
    pub automatic_transition_from_open_to_half_open_enabled: bool,
}

// ============================================================================
// Health & outbox
// ============================================================================

/// `UP` / `WARNING` / `DOWN` style status string.
pub const STATUS_UP: &str = "UP";
pub const STATUS_DOWN: &str = "DOWN";

/// Health of one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentHealth {
    pub status: String,
    pub details: Map<String, Value>,
}

/// Response of `GET /health`, served with 200 when UP and 503 when DOWN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub components: HashMap<String, ComponentHealth>,
}

impl Default for HealthReport {
    fn default() -> Self {
        Self {
            status: STATUS_UP.to_string(),
            components: HashMap::new(),
        }
    }
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_UP)
    }
}

/// Response of `GET /outbox/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutboxStats {
    pub pending: u64,
    pub sent: u64,
    pub failed: u64,
    pub total: u64,
    /// Percentage of messages sent successfully.
    pub send_rate: f64,
    /// `UP`, `WARNING` or `DOWN`.
    pub health: String,
}

impl Default for OutboxStats {
    fn default() -> Self {
        Self {
            pending: 0,
            sent: 0,
            failed: 0,
            total: 0,
            send_rate: 0.0,
            health: STATUS_UP.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_status_parse() {
        assert_eq!(
            "in_progress".parse::<WorkflowStatus>().unwrap(),
            WorkflowStatus::InProgress
        );
        assert_eq!(
            "RETRY-PENDING".parse::<WorkflowStatus>().unwrap(),
            WorkflowStatus::RetryPending
        );
        assert!("sleeping".parse::<WorkflowStatus>().is_err());
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let status: WorkflowStatus = serde_json::from_value(json!("TIMED_OUT")).unwrap();
        assert_eq!(status, WorkflowStatus::Unknown);
    }

    #[test]
    fn test_execution_minimal_body() {
        let execution: Execution = serde_json::from_value(json!({
            "executionId": "exec-1",
            "status": "FAILED",
            "payload": {"orderId": 42},
            "errorInfo": {"message": "boom", "stepId": 2}
        }))
        .unwrap();

        assert_eq!(execution.execution_id, "exec-1");
        assert_eq!(execution.status, WorkflowStatus::Failed);
        assert!(execution.step_history.is_empty());
        assert_eq!(execution.error_info.unwrap().step_id, 2);
    }

    #[test]
    fn test_metrics_dashboard_null_list() {
        let dashboard: MetricsDashboard = serde_json::from_value(json!({
            "totalStarted": 5,
            "workflowMetrics": null
        }))
        .unwrap();
        assert_eq!(dashboard.total_started, 5);
        assert_eq!(dashboard.total_failed, 0);
        assert!(dashboard.workflow_metrics.is_empty());
    }

    #[test]
    fn test_breaker_state() {
        let status: CircuitBreakerStatus = serde_json::from_value(json!({
            "name": "broker",
            "state": "HALF_OPEN"
        }))
        .unwrap();
        assert_eq!(status.state, BreakerState::HalfOpen);
        assert!(!status.state.is_open());
        assert!(BreakerState::ForcedOpen.is_open());
    }
}
