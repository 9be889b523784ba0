// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Health endpoint (`/health`).

use async_trait::async_trait;
use tracing::instrument;

use crate::error::Result;
use crate::transport::ApiClient;
use crate::types::HealthReport;

#[async_trait]
pub trait HealthApi: Send + Sync {
    /// `GET /health`
    ///
    /// A DOWN system answers 503, which arrives here as an
    /// [`ApiError`](crate::ApiError) whose `payload` still holds the report.
    async fn health(&self) -> Result<HealthReport>;
}

#[async_trait]
impl HealthApi for ApiClient {
    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthReport> {
        self.get("health", None).await
    }
}
