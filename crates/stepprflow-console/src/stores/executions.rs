// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Execution list, pagination, filters and the current execution.

use std::sync::Arc;

use serde_json::Value;
use stepprflow_client::{
    ApiError, Execution, ExecutionApi, ExecutionQuery, SortDirection, WorkflowStatus,
};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::{Fetch, StoreConfig, Tracked, fetch};
use crate::outcome::ActionOutcome;
use crate::sequence::RequestSequence;

const DEFAULT_SORT: &str = "createdAt";

/// Paging position of the execution list. `page` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages.saturating_sub(1)
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }
}

/// Filters applied to the execution list. Blank values are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFilters {
    pub search: String,
    pub topic: String,
    pub statuses: Vec<WorkflowStatus>,
    pub sort_by: String,
    pub sort_dir: SortDirection,
}

impl Default for ExecutionFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            topic: String::new(),
            statuses: Vec::new(),
            sort_by: DEFAULT_SORT.to_string(),
            sort_dir: SortDirection::Desc,
        }
    }
}

impl ExecutionFilters {
    fn merge(&mut self, update: FilterUpdate) {
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(topic) = update.topic {
            self.topic = topic;
        }
        if let Some(statuses) = update.statuses {
            self.statuses = statuses;
        }
        if let Some(sort_by) = update.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_dir) = update.sort_dir {
            self.sort_dir = sort_dir;
        }
    }
}

/// A partial filter change. Unset keys keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub topic: Option<String>,
    pub statuses: Option<Vec<WorkflowStatus>>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDirection>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = WorkflowStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn sort(mut self, sort_by: impl Into<String>, sort_dir: SortDirection) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_dir = Some(sort_dir);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionsState {
    pub executions: Vec<Execution>,
    pub current: Option<Execution>,
    pub pagination: Pagination,
    pub filters: ExecutionFilters,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl ExecutionsState {
    fn new(page_size: u32) -> Self {
        Self {
            executions: Vec::new(),
            current: None,
            pagination: Pagination {
                page: 0,
                size: page_size,
                total_elements: 0,
                total_pages: 0,
            },
            filters: ExecutionFilters::default(),
            loading: false,
            error: None,
        }
    }

    fn query(&self) -> ExecutionQuery {
        ExecutionQuery::new()
            .with_page(self.pagination.page)
            .with_size(self.pagination.size)
            .with_sort(&self.filters.sort_by, self.filters.sort_dir)
            .with_search(&self.filters.search)
            .with_topic(&self.filters.topic)
            .with_statuses(self.filters.statuses.iter().copied())
    }

    fn is_current(&self, id: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.execution_id == id)
    }
}

impl Tracked for ExecutionsState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

/// Store behind the execution list and detail views.
///
/// Mutations refresh the current execution only when it is the one that was
/// mutated, and never touch the list.
pub struct ExecutionsStore {
    api: Arc<dyn ExecutionApi>,
    state: RwLock<ExecutionsState>,
    list_seq: RequestSequence,
    current_seq: RequestSequence,
}

impl ExecutionsStore {
    pub fn new(api: Arc<dyn ExecutionApi>, config: StoreConfig) -> Self {
        Self {
            api,
            state: RwLock::new(ExecutionsState::new(config.default_page_size)),
            list_seq: RequestSequence::new(config.consistency),
            current_seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> ExecutionsState {
        self.state.read().await.clone()
    }

    pub async fn executions(&self) -> Vec<Execution> {
        self.state.read().await.executions.clone()
    }

    pub async fn current(&self) -> Option<Execution> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }

    pub async fn filters(&self) -> ExecutionFilters {
        self.state.read().await.filters.clone()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    pub async fn has_next_page(&self) -> bool {
        self.state.read().await.pagination.has_next_page()
    }

    pub async fn has_prev_page(&self) -> bool {
        self.state.read().await.pagination.has_prev_page()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn clear_current(&self) {
        self.current_seq.issue();
        self.state.write().await.current = None;
    }

    /// Load the current page with the current filters.
    ///
    /// With `reset_page` the page is forced back to 0 first.
    #[instrument(skip(self))]
    pub async fn fetch_executions(&self, reset_page: bool) {
        let params = {
            let mut state = self.state.write().await;
            if reset_page {
                state.pagination.page = 0;
            }
            state.query().to_params()
        };

        fetch(
            &self.state,
            &self.list_seq,
            Fetch::Primary,
            "executions",
            self.api.executions(&params),
            |s, page| {
                s.executions = page.content;
                s.pagination.total_elements = page.total_elements;
                s.pagination.total_pages = page.total_pages;
            },
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_execution(&self, id: &str) {
        fetch(
            &self.state,
            &self.current_seq,
            Fetch::Primary,
            "current",
            self.api.execution(id),
            |s, execution| s.current = Some(execution),
        )
        .await;
    }

    /// Jump to `page` and reload.
    pub async fn set_page(&self, page: u32) {
        self.state.write().await.pagination.page = page;
        self.fetch_executions(false).await;
    }

    /// Change the page size, go back to the first page and reload.
    pub async fn set_page_size(&self, size: u32) {
        {
            let mut state = self.state.write().await;
            state.pagination.size = size.max(1);
            state.pagination.page = 0;
        }
        self.fetch_executions(false).await;
    }

    /// Advance one page and reload. No-op on the last page.
    pub async fn next_page(&self) {
        {
            let mut state = self.state.write().await;
            if !state.pagination.has_next_page() {
                return;
            }
            state.pagination.page = state.pagination.page.saturating_add(1);
        }
        self.fetch_executions(false).await;
    }

    /// Go back one page and reload. No-op on the first page.
    pub async fn prev_page(&self) {
        {
            let mut state = self.state.write().await;
            if !state.pagination.has_prev_page() {
                return;
            }
            state.pagination.page -= 1;
        }
        self.fetch_executions(false).await;
    }

    /// Merge `update` into the current filters and go back to the first page.
    pub async fn set_filters(&self, update: FilterUpdate) {
        let mut state = self.state.write().await;
        state.filters.merge(update);
        state.pagination.page = 0;
    }

    pub async fn reset_filters(&self) {
        let mut state = self.state.write().await;
        state.filters = ExecutionFilters::default();
        state.pagination.page = 0;
    }

    #[instrument(skip(self))]
    pub async fn resume(&self, id: &str, from_step: Option<u32>) -> ActionOutcome {
        let result = self.api.resume(id, from_step).await;
        self.settle_action(id, result).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> ActionOutcome {
        let result = self.api.cancel(id).await;
        self.settle_action(id, result).await
    }

    /// Edit one payload field. `reason` is recorded in the audit trail.
    #[instrument(skip(self, new_value))]
    pub async fn update_payload_field(
        &self,
        id: &str,
        field_path: &str,
        new_value: Value,
        reason: &str,
    ) -> ActionOutcome {
        let result = self
            .api
            .update_payload_field(id, field_path, new_value, reason)
            .await
            .map(Some);
        self.settle_action(id, result).await
    }

    #[instrument(skip(self))]
    pub async fn restore_payload(&self, id: &str) -> ActionOutcome {
        let result = self.api.restore_payload(id).await.map(Some);
        self.settle_action(id, result).await
    }

    async fn settle_action(
        &self,
        id: &str,
        result: Result<Option<Execution>, ApiError>,
    ) -> ActionOutcome {
        let updated = match result {
            Ok(updated) => updated,
            Err(e) => {
                if e.is_conflict() {
                    info!(code = %e.code, "Action rejected, view is stale");
                }
                self.state.write().await.error = Some(e.clone());
                return ActionOutcome::failed(e);
            }
        };

        let refetch = {
            let mut state = self.state.write().await;
            if !state.is_current(id) {
                false
            } else if let Some(execution) = updated.filter(|e| e.execution_id == id) {
                // Supersedes any detail fetch still in flight.
                self.current_seq.issue();
                state.current = Some(execution);
                false
            } else {
                true
            }
        };

        if refetch {
            self.fetch_execution(id).await;
        }
        ActionOutcome::succeeded()
    }
}
