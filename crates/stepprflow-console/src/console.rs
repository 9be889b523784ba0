// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! One instance of every store over a shared client.

use std::sync::Arc;

use stepprflow_client::{ApiClient, ApiError};
use tracing::instrument;

use crate::stores::{
    CircuitBreakerStore, DashboardStore, ExecutionsStore, HealthStore, MetricsStore, OutboxStore,
    StoreConfig,
};

/// All stores of one application instance.
///
/// Stores never reach into each other; the console only groups them and
/// offers [`refresh_all`](Console::refresh_all).
pub struct Console {
    pub dashboard: DashboardStore,
    pub executions: ExecutionsStore,
    pub metrics: MetricsStore,
    pub circuit_breakers: CircuitBreakerStore,
    pub health: HealthStore,
    pub outbox: OutboxStore,
}

impl Console {
    pub fn new(client: ApiClient, config: StoreConfig) -> Self {
        let client = Arc::new(client);
        Self {
            dashboard: DashboardStore::new(client.clone(), client.clone(), config),
            executions: ExecutionsStore::new(client.clone(), config),
            metrics: MetricsStore::new(client.clone(), config),
            circuit_breakers: CircuitBreakerStore::new(client.clone(), config),
            health: HealthStore::new(client.clone(), config),
            outbox: OutboxStore::new(client, config),
        }
    }

    /// Refresh metrics, circuit breakers, health and outbox concurrently and
    /// return once all four have settled.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.metrics.fetch_dashboard(),
            self.circuit_breakers.fetch_all(),
            self.health.fetch(),
            self.outbox.fetch(),
        );
    }

    /// Errors recorded by the stores `refresh_all` touches.
    pub async fn refresh_errors(&self) -> Vec<ApiError> {
        [
            self.metrics.error().await,
            self.circuit_breakers.error().await,
            self.health.error().await,
            self.outbox.error().await,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
