// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow execution endpoints (`/workflows/*`).

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument};

use super::segment;
use crate::error::Result;
use crate::transport::{ApiClient, QueryParams};
use crate::types::{
    Execution, ExecutionPage, ExecutionStats, PayloadFieldUpdate, SortDirection, WorkflowStatus,
};

/// Query for `GET /workflows`.
///
/// Paging and sorting are always sent; `topic`, `status` and `search` only
/// when non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionQuery {
    pub page: u32,
    pub size: u32,
    pub sort: String,
    pub direction: SortDirection,
    pub topic: Option<String>,
    pub statuses: Vec<WorkflowStatus>,
    pub search: Option<String>,
}

impl Default for ExecutionQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort: "createdAt".to_string(),
            direction: SortDirection::Desc,
            topic: None,
            statuses: Vec::new(),
            search: None,
        }
    }
}

impl ExecutionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = sort.into();
        self.direction = direction;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = WorkflowStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Flatten into query parameters.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .set("page", self.page)
            .set("size", self.size)
            .set("sort", &self.sort)
            .set("direction", self.direction.as_str())
            .set_opt("search", self.search.as_deref())
            .set_opt("topic", self.topic.as_deref());

        if !self.statuses.is_empty() {
            let joined = self
                .statuses
                .iter()
                .map(WorkflowStatus::as_str)
                .collect::<Vec<_>>()
                .join(",");
            params.set("status", joined);
        }
        params
    }
}

/// Execution listing, detail and operator actions.
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// `GET /workflows`
    async fn executions(&self, query: &QueryParams) -> Result<ExecutionPage>;

    /// `GET /workflows/{id}`
    async fn execution(&self, id: &str) -> Result<Execution>;

    /// `GET /workflows/recent`
    async fn recent(&self) -> Result<Vec<Execution>>;

    /// `GET /workflows/stats`
    async fn execution_stats(&self) -> Result<ExecutionStats>;

    /// `POST /workflows/{id}/resume`, optionally from a given step.
    ///
    /// The backend may accept with an empty body; the updated execution is
    /// returned when it sends one.
    async fn resume(&self, id: &str, from_step: Option<u32>) -> Result<Option<Execution>>;

    /// `DELETE /workflows/{id}`
    async fn cancel(&self, id: &str) -> Result<Option<Execution>>;

    /// `PATCH /workflows/{id}/payload`
    ///
    /// `reason` is passed through unmodified for the audit trail.
    async fn update_payload_field(
        &self,
        id: &str,
        field_path: &str,
        new_value: Value,
        reason: &str,
    ) -> Result<Execution>;

    /// `POST /workflows/{id}/payload/restore`
    async fn restore_payload(&self, id: &str) -> Result<Execution>;
}

#[async_trait]
impl ExecutionApi for ApiClient {
    #[instrument(skip(self, query))]
    async fn executions(&self, query: &QueryParams) -> Result<ExecutionPage> {
        self.get("workflows", Some(query)).await
    }

    #[instrument(skip(self))]
    async fn execution(&self, id: &str) -> Result<Execution> {
        self.get(&format!("workflows/{}", segment(id)), None).await
    }

    #[instrument(skip(self))]
    async fn recent(&self) -> Result<Vec<Execution>> {
        self.get("workflows/recent", None).await
    }

    #[instrument(skip(self))]
    async fn execution_stats(&self) -> Result<ExecutionStats> {
        self.get("workflows/stats", None).await
    }

    #[instrument(skip(self))]
    async fn resume(&self, id: &str, from_step: Option<u32>) -> Result<Option<Execution>> {
        info!("Resuming execution");
        let mut query = QueryParams::new();
        query.set_opt("fromStep", from_step);

        self.request_optional::<Execution, ()>(
            Method::POST,
            &format!("workflows/{}/resume", segment(id)),
            Some(&query),
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: &str) -> Result<Option<Execution>> {
        info!("Cancelling execution");
        self.request_optional::<Execution, ()>(
            Method::DELETE,
            &format!("workflows/{}", segment(id)),
            None,
            None,
        )
        .await
    }

    #[instrument(skip(self, new_value))]
    async fn update_payload_field(
        &self,
        id: &str,
        field_path: &str,
        new_value: Value,
        reason: &str,
    ) -> Result<Execution> {
        info!("Updating payload field");
        let body = PayloadFieldUpdate {
            field_path: field_path.to_string(),
            new_value,
            changed_by: self.config().operator.clone(),
            reason: reason.to_string(),
        };

        self.request(
            Method::PATCH,
            &format!("workflows/{}/payload", segment(id)),
            None,
            Some(&body),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn restore_payload(&self, id: &str) -> Result<Execution> {
        info!("Restoring payload");
        self.request::<Execution, ()>(
            Method::POST,
            &format!("workflows/{}/payload/restore", segment(id)),
            None,
            None,
        )
        .await
    }
}
