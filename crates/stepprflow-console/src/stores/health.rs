// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service health.
//!
//! The health endpoint answers 503 with a full component breakdown when the
//! service is down. That body is usable data, so it becomes the snapshot
//! instead of an error. Only a failure without such a body (unreachable
//! server, timeout, unstructured error) is recorded as an error.

use std::sync::Arc;

use stepprflow_client::{ApiError, HealthApi, HealthReport, STATUS_UP};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use super::{Fetch, StoreConfig, Tracked, settle};
use crate::sequence::RequestSequence;

const SERVICE_UNAVAILABLE: u16 = 503;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthState {
    /// Last report received, `None` until the service has answered once.
    pub report: Option<HealthReport>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl HealthState {
    /// False until a report says `UP`.
    pub fn is_healthy(&self) -> bool {
        self.report.as_ref().is_some_and(HealthReport::is_up)
    }

    /// Names of components not reporting `UP`, sorted.
    pub fn down_components(&self) -> Vec<String> {
        let Some(report) = &self.report else {
            return Vec::new();
        };
        let mut names: Vec<String> = report
            .components
            .iter()
            .filter(|(_, component)| !component.status.eq_ignore_ascii_case(STATUS_UP))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Tracked for HealthState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<ApiError> {
        &mut self.error
    }
}

/// Recover the component breakdown carried by a 503.
fn degraded_report(error: &ApiError) -> Option<HealthReport> {
    if error.status != Some(SERVICE_UNAVAILABLE) {
        return None;
    }
    let payload = error.payload.clone()?;
    serde_json::from_value(payload).ok()
}

pub struct HealthStore {
    api: Arc<dyn HealthApi>,
    state: RwLock<HealthState>,
    seq: RequestSequence,
}

impl HealthStore {
    pub fn new(api: Arc<dyn HealthApi>, config: StoreConfig) -> Self {
        Self {
            api,
            state: RwLock::new(HealthState::default()),
            seq: RequestSequence::new(config.consistency),
        }
    }

    pub async fn snapshot(&self) -> HealthState {
        self.state.read().await.clone()
    }

    pub async fn report(&self) -> Option<HealthReport> {
        self.state.read().await.report.clone()
    }

    pub async fn error(&self) -> Option<ApiError> {
        self.state.read().await.error.clone()
    }

    pub async fn is_healthy(&self) -> bool {
        self.state.read().await.is_healthy()
    }

    pub async fn down_components(&self) -> Vec<String> {
        self.state.read().await.down_components()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        settle(
            &self.state,
            &self.seq,
            Fetch::Background,
            "health",
            self.api.health(),
            |s, result| match result {
                Ok(report) => {
                    s.report = Some(report);
                    Some(())
                }
                Err(e) => match degraded_report(&e) {
                    Some(report) => {
                        warn!(status = %report.status, "Service reports unhealthy");
                        s.report = Some(report);
                        Some(())
                    }
                    None => {
                        s.error = Some(e);
                        None
                    }
                },
            },
        )
        .await;
    }
}
