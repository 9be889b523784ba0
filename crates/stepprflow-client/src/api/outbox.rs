// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Outbox endpoint (`/outbox/stats`).

use async_trait::async_trait;
use tracing::instrument;

use crate::error::Result;
use crate::transport::ApiClient;
use crate::types::OutboxStats;

#[async_trait]
pub trait OutboxApi: Send + Sync {
    /// `GET /outbox/stats`
    async fn outbox_stats(&self) -> Result<OutboxStats>;
}

#[async_trait]
impl OutboxApi for ApiClient {
    #[instrument(skip(self))]
    async fn outbox_stats(&self) -> Result<OutboxStats> {
        self.get("outbox/stats", None).await
    }
}
