// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow metrics.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stepprflow_client::{
    ApiError, MetricsApi, MetricsDashboard, MetricsSummary, WorkflowMetrics,
};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use super::{Fetch, StoreConfig, Tracked, fetch};
use crate::sequence::{Consistency, RequestSequence};

const HEALTHY_RATE: f64 = 95.0;
const WARNING_RATE: f64 = 80.0;

/// Overall health derived from the global success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= HEALTHY_RATE {
            HealthStatus::Healthy
        } else if rate >= WARNING_RATE {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsState {
    pub dashboard: MetricsDashboard,
    /// Per-topic metrics, keyed by topic.
    pub topics: HashMap<String, WorkflowMetrics>,
    pub summary: Option<MetricsSummary>,
    /// Time of the last successful dashboard fetch.
    pub last_updated: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl MetricsState {
    /// Completed, failed and cancelled executions.
    pub fn total_processed(&self) -> u64 {
        let dashboard = &self.dashboard;
        dashboard.total_completed + dashboard.total_failed + dashboard.total_cancelled
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from_success_rate(self.dashboard.global_success_rate)
    }

    /// Workflow metrics, busiest first. Ties keep their server order.
    pub fn workflows_sorted(&self) -> Vec<WorkflowMetrics> {
        let mut sorted = self.dashboard.workflow_metrics.clone();
        sorted.sort_by(|a, b| b.started.cmp(&a.started));
        sorted
    }
}

impl Tracked for MetricsState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

pub struct MetricsStore {
    api: Arc<dyn MetricsApi>,
    state: RwLock<MetricsState>,
    consistency: Consistency,
    dashboard_seq: RequestSequence,
    /// One sequence per topic, so fetches of different topics never
    /// supersede each other.
    topic_seqs: Mutex<HashMap<String, Arc<RequestSequence>>>,
    summary_seq: RequestSequence,
}

impl MetricsStore {
    pub fn new(api: Arc<dyn MetricsApi>, config: StoreConfig) -> Self {
        Self {
            api,
            state: RwLock::new(MetricsState::default()),
            consistency: config.consistency,
            dashboard_seq: RequestSequence::new(config.consistency),
            topic_seqs: Mutex::new(HashMap::new()),
            summary_seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> MetricsState {
        self.state.read().await.clone()
    }

    pub async fn dashboard(&self) -> MetricsDashboard {
        self.state.read().await.dashboard.clone()
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_updated
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    pub async fn total_processed(&self) -> u64 {
        self.state.read().await.total_processed()
    }

    pub async fn health_status(&self) -> HealthStatus {
        self.state.read().await.health_status()
    }

    pub async fn workflows_sorted(&self) -> Vec<WorkflowMetrics> {
        self.state.read().await.workflows_sorted()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    async fn topic_sequence(&self, topic: &str) -> Arc<RequestSequence> {
        let mut seqs = self.topic_seqs.lock().await;
        seqs.entry(topic.to_string())
            .or_insert_with(|| Arc::new(RequestSequence::new(self.consistency)))
            .clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch_dashboard(&self) {
        fetch(
            &self.state,
            &self.dashboard_seq,
            Fetch::Primary,
            "metrics",
            self.api.metrics_dashboard(),
            |s, dashboard| {
                s.dashboard = dashboard;
                s.last_updated = Some(Utc::now());
            },
        )
        .await;
    }

    /// Fetch one topic's metrics, keep them and hand them back.
    ///
    /// Returns `None` on failure; the error is recorded on the store.
    #[instrument(skip(self))]
    pub async fn fetch_workflow_metrics(&self, topic: &str) -> Option<WorkflowMetrics> {
        let seq = self.topic_sequence(topic).await;
        fetch(
            &self.state,
            &seq,
            Fetch::Primary,
            "topic",
            self.api.topic_metrics(topic),
            |s, metrics| {
                s.topics.insert(topic.to_string(), metrics.clone());
                metrics
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_summary(&self) {
        fetch(
            &self.state,
            &self.summary_seq,
            Fetch::Background,
            "summary",
            self.api.metrics_summary(),
            |s, summary| s.summary = Some(summary),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(topic: &str, started: u64) -> WorkflowMetrics {
        WorkflowMetrics {
            topic: topic.to_string(),
            started,
            ..Default::default()
        }
    }

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(HealthStatus::from_success_rate(100.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_success_rate(95.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_success_rate(94.9), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_success_rate(80.0), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_success_rate(79.9), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_success_rate(0.0), HealthStatus::Critical);
    }

    #[test]
    fn test_empty_dashboard_is_critical() {
        let state = MetricsState::default();
        assert_eq!(state.total_processed(), 0);
        assert_eq!(state.health_status(), HealthStatus::Critical);
        assert!(state.workflows_sorted().is_empty());
    }

    #[test]
    fn test_workflows_sorted_is_stable() {
        let mut state = MetricsState::default();
        state.dashboard.workflow_metrics = vec![
            metrics("order", 50),
            metrics("refund", 100),
            metrics("payment", 100),
        ];

        let topics: Vec<String> = state
            .workflows_sorted()
            .into_iter()
            .map(|m| m.topic)
            .collect();
        assert_eq!(topics, ["refund", "payment", "order"]);
        assert_eq!(state.dashboard.workflow_metrics[0].topic, "order");
    }
}
