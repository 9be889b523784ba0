// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Circuit breaker endpoints (`/circuit-breakers/*`).

use async_trait::async_trait;
use reqwest::Method;
use tracing::{info, instrument};

use super::segment;
use crate::error::Result;
use crate::transport::ApiClient;
use crate::types::{CircuitBreakerConfig, CircuitBreakerStatus};

#[async_trait]
pub trait CircuitBreakerApi: Send + Sync {
    /// `GET /circuit-breakers`
    async fn circuit_breakers(&self) -> Result<Vec<CircuitBreakerStatus>>;

    /// `GET /circuit-breakers/config`
    async fn circuit_breaker_config(&self) -> Result<CircuitBreakerConfig>;

    /// `GET /circuit-breakers/{name}`
    async fn circuit_breaker(&self, name: &str) -> Result<CircuitBreakerStatus>;

    /// `POST /circuit-breakers/{name}/reset`
    ///
    /// Returns the breaker's new status when the server sends one.
    async fn reset_circuit_breaker(&self, name: &str) -> Result<Option<CircuitBreakerStatus>>;
}

#[async_trait]
impl CircuitBreakerApi for ApiClient {
    #[instrument(skip(self))]
    async fn circuit_breakers(&self) -> Result<Vec<CircuitBreakerStatus>> {
        self.get("circuit-breakers", None).await
    }

    #[instrument(skip(self))]
    async fn circuit_breaker_config(&self) -> Result<CircuitBreakerConfig> {
        self.get("circuit-breakers/config", None).await
    }

    #[instrument(skip(self))]
    async fn circuit_breaker(&self, name: &str) -> Result<CircuitBreakerStatus> {
        self.get(&format!("circuit-breakers/{}", segment(name)), None)
            .await
    }

    #[instrument(skip(self))]
    async fn reset_circuit_breaker(&self, name: &str) -> Result<Option<CircuitBreakerStatus>> {
        info!("Resetting circuit breaker");
        self.request_optional::<CircuitBreakerStatus, ()>(
            Method::POST,
            &format!("circuit-breakers/{}/reset", segment(name)),
            None,
            None,
        )
        .await
    }
}
