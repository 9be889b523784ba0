// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Outbox delivery stats.

use std::sync::Arc;

use stepprflow_client::{ApiError, OutboxApi, OutboxStats};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{Fetch, StoreConfig, Tracked, fetch};
use crate::sequence::RequestSequence;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboxState {
    /// `None` until the first successful fetch.
    pub stats: Option<OutboxStats>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl Tracked for OutboxState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

pub struct OutboxStore {
    api: Arc<dyn OutboxApi>,
    state: RwLock<OutboxState>,
    seq: RequestSequence,
}

impl OutboxStore {
    pub fn new(api: Arc<dyn OutboxApi>, config: StoreConfig) -> Self {
        Self {
            api,
            state: RwLock::new(OutboxState::default()),
            seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> OutboxState {
        self.state.read().await.clone()
    }

    pub async fn stats(&self) -> Option<OutboxStats> {
        self.state.read().await.stats.clone()
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        fetch(
            &self.state,
            &self.seq,
            Fetch::Background,
            "outbox",
            self.api.outbox_stats(),
            |s, stats| s.stats = Some(stats),
        )
        .await;
    }
}
