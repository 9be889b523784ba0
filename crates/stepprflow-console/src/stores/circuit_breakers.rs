// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Circuit breaker status.

use std::sync::Arc;

use stepprflow_client::{ApiError, CircuitBreakerApi, CircuitBreakerConfig, CircuitBreakerStatus};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::{Fetch, StoreConfig, Tracked, fetch};
use crate::outcome::ActionOutcome;
use crate::sequence::RequestSequence;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircuitBreakerState {
    pub breakers: Vec<CircuitBreakerStatus>,
    pub config: Option<CircuitBreakerConfig>,
    /// Last breaker fetched by name.
    pub selected: Option<CircuitBreakerStatus>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl CircuitBreakerState {
    /// Breakers currently rejecting calls.
    pub fn open_breakers(&self) -> Vec<&CircuitBreakerStatus> {
        self.breakers.iter().filter(|b| b.state.is_open()).collect()
    }
}

impl Tracked for CircuitBreakerState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

pub struct CircuitBreakerStore {
    api: Arc<dyn CircuitBreakerApi>,
    state: RwLock<CircuitBreakerState>,
    list_seq: RequestSequence,
    config_seq: RequestSequence,
    selected_seq: RequestSequence,
}

impl CircuitBreakerStore {
    pub fn new(api: Arc<dyn CircuitBreakerApi>, config: StoreConfig) -> Self {
        Self {
            api,
            state: RwLock::new(CircuitBreakerState::default()),
            list_seq: RequestSequence::new(config.consistency),
            config_seq: RequestSequence::new(config.consistency),
            selected_seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> CircuitBreakerState {
        self.state.read().await.clone()
    }

    pub async fn breakers(&self) -> Vec<CircuitBreakerStatus> {
        self.state.read().await.breakers.clone()
    }

    pub async fn open_breakers(&self) -> Vec<CircuitBreakerStatus> {
        self.state
            .read()
            .await
            .open_breakers()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    #[instrument(skip(self))]
    pub async fn fetch_all(&self) {
        fetch(
            &self.state,
            &self.list_seq,
            Fetch::Primary,
            "breakers",
            self.api.circuit_breakers(),
            |s, breakers| s.breakers = breakers,
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
            self.api.circuit_breaker_config(),
            |s, config| s.config = Some(config),
        )
        .await;
    }

    #[instrument(skip(self))]
    pub async fn fetch_one(&self, name: &str) {
        fetch(
            &self.state,
            &self.selected_seq,
            Fetch::Background,
            "selected",
            self.api.circuit_breaker(name),
            |s, breaker| s.selected = Some(breaker),
        )
        .await;
    }

    /// Reset a breaker. The list is re-fetched only if the reset succeeded;
    /// local breaker state is never edited in place.
    #[instrument(skip(self))]
    pub async fn reset(&self, name: &str) -> ActionOutcome {
        match self.api.reset_circuit_breaker(name).await {
            Ok(_) => {
                info!("Circuit breaker reset, refreshing list");
                self.fetch_all().await;
                ActionOutcome::succeeded()
            }
            Err(e) => {
                self.state.write().await.error = Some(e.clone());
                ActionOutcome::failed(e)
            }
        }
    }
}
