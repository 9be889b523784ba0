// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Metrics endpoints (`/metrics/*`).

use async_trait::async_trait;
use tracing::instrument;

use super::segment;
use crate::error::Result;
use crate::transport::ApiClient;
use crate::types::{MetricsDashboard, MetricsSummary, WorkflowMetrics};

#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// `GET /metrics`
    async fn metrics_dashboard(&self) -> Result<MetricsDashboard>;

    /// `GET /metrics/{topic}`
    async fn topic_metrics(&self, topic: &str) -> Result<WorkflowMetrics>;

    /// `GET /metrics/summary`, aggregated across every topic.
    async fn metrics_summary(&self) -> Result<MetricsSummary>;
}

#[async_trait]
impl MetricsApi for ApiClient {
    #[instrument(skip(self))]
    async fn metrics_dashboard(&self) -> Result<MetricsDashboard> {
        self.get("metrics", None).await
    }

    #[instrument(skip(self))]
    async fn topic_metrics(&self, topic: &str) -> Result<WorkflowMetrics> {
        self.get(&format!("metrics/{}", segment(topic)), None).await
    }

    #[instrument(skip(self))]
    async fn metrics_summary(&self) -> Result<MetricsSummary> {
        self.get("metrics/summary", None).await
    }
}
