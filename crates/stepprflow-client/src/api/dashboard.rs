// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Dashboard endpoints (`/dashboard/*`).

use async_trait::async_trait;
use tracing::instrument;

use crate::error::Result;
use crate::transport::{ApiClient, QueryParams};
use crate::types::{DashboardConfig, DashboardOverview, WorkflowDefinition, WorkflowFilters};

/// UI configuration, overview and workflow definitions.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /dashboard/overview`
    async fn overview(&self) -> Result<DashboardOverview>;

    /// `GET /dashboard/config`
    async fn dashboard_config(&self) -> Result<DashboardConfig>;

    /// `GET /dashboard/workflows`, unset filters are left out of the query.
    async fn workflows(&self, filters: &WorkflowFilters) -> Result<Vec<WorkflowDefinition>>;
}

#[async_trait]
impl DashboardApi for ApiClient {
    #[instrument(skip(self))]
    async fn overview(&self) -> Result<DashboardOverview> {
        self.get("dashboard/overview", None).await
    }

    #[instrument(skip(self))]
    async fn dashboard_config(&self) -> Result<DashboardConfig> {
        self.get("dashboard/config", None).await
    }

    #[instrument(skip(self))]
    async fn workflows(&self, filters: &WorkflowFilters) -> Result<Vec<WorkflowDefinition>> {
        let mut query = QueryParams::new();
        query
            .set_opt("topic", filters.topic.as_deref())
            .set_opt("serviceName", filters.service_name.as_deref())
            .set_opt("status", filters.status.as_deref());

        self.get("dashboard/workflows", Some(&query)).await
    }
}
