// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Dashboard overview: execution stats, recent executions and registered
//! workflows.

use std::sync::Arc;

use stepprflow_client::{
    ApiError, DashboardApi, DashboardConfig, Execution, ExecutionApi, ExecutionStats,
    WorkflowDefinition, WorkflowFilters, WorkflowSummary,
};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{Fetch, StoreConfig, Tracked, fetch};
use crate::sequence::RequestSequence;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub stats: Option<ExecutionStats>,
    pub recent_executions: Vec<Execution>,
    /// Workflows listed by the overview.
    pub workflows: Vec<WorkflowSummary>,
    /// Full workflow definitions from the filtered workflow listing.
    pub definitions: Vec<WorkflowDefinition>,
    pub config: Option<DashboardConfig>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl Tracked for DashboardState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

pub struct DashboardStore {
    dashboard: Arc<dyn DashboardApi>,
    executions: Arc<dyn ExecutionApi>,
    state: RwLock<DashboardState>,
    overview_seq: RequestSequence,
    stats_seq: RequestSequence,
    recent_seq: RequestSequence,
    workflows_seq: RequestSequence,
    config_seq: RequestSequence,
}

impl DashboardStore {
    pub fn new(
        dashboard: Arc<dyn DashboardApi>,
        executions: Arc<dyn ExecutionApi>,
        config: StoreConfig,
    ) -> Self {
        Self {
            dashboard,
            executions,
            state: RwLock::new(DashboardState::default()),
            overview_seq: RequestSequence::new(config.consistency),
            stats_seq: RequestSequence::new(config.consistency),
            recent_seq: RequestSequence::new(config.consistency),
            workflows_seq: RequestSequence::new(config.consistency),
            config_seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Replace stats, recent executions and workflows from one overview call.
    #[instrument(skip(self))]
    pub async fn fetch_overview(&self) {
        fetch(
            &self.state,
            &self.overview_seq,
            Fetch::Background,
            "overview",
            self.dashboard.overview(),
            |s, overview| {
                s.stats = Some(overview.stats);
                s.recent_executions = overview.recent_executions;
                s.workflows = overview.workflows;
            },
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_stats(&self) {
        fetch(
            &self.state,
            &self.stats_seq,
            Fetch::Background,
            "stats",
            self.executions.execution_stats(),
            |s, stats| s.stats = Some(stats),
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_recent(&self) {
        fetch(
            &self.state,
            &self.recent_seq,
            Fetch::Background,
            "recent",
            self.executions.recent(),
            |s, recent| s.recent_executions = recent,
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_workflows(&self, filters: &WorkflowFilters) {
        fetch(
            &self.state,
            &self.workflows_seq,
            Fetch::Background,
            "workflows",
            self.dashboard.workflows(filters),
            |s, definitions| s.definitions = definitions,
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_config(&self) {
        fetch(
            &self.state,
            &self.config_seq,
            Fetch::Background,
            "config",
            self.dashboard.dashboard_config(),
            |s, config| s.config = Some(config),
        )
        .await;
    }
}
