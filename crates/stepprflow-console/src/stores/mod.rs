// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-domain state containers.
//!
//! Each store owns one state struct behind a `tokio::sync::RwLock`, calls its
//! gateways and is the only place where an [`ApiError`] is caught. Readers get
//! cloned snapshots; the lock is never held across a network call.
//!
//! Every fetch follows the same steps:
//!
//! 1. clear the previous error and, for primary fetches, raise `loading`
//! 2. await the gateway with the lock released
//! 3. on success replace the slice wholesale, on failure record the error
//!    and keep the previous data
//! 4. lower `loading`

mod circuit_breakers;
mod dashboard;
mod executions;
mod health;
mod metrics;
mod outbox;

use std::future::Future;

use stepprflow_client::ApiError;
use tokio::sync::RwLock;
use tracing::debug;

use crate::sequence::{Consistency, RequestSequence};

pub use circuit_breakers::{CircuitBreakerState, CircuitBreakerStore};
pub use dashboard::{DashboardState, DashboardStore};
pub use executions::{
    ExecutionFilters, ExecutionsState, ExecutionsStore, FilterUpdate, Pagination,
};
pub use health::{HealthState, HealthStore};
pub use metrics::{HealthStatus, MetricsState, MetricsStore};
pub use outbox::{OutboxState, OutboxStore};

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Settings shared by every store of a console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How overlapping fetches of one slice are resolved.
    pub consistency: Consistency,
    /// Page size of the execution list until the caller changes it.
    pub default_page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            consistency: Consistency::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size.max(1);
        self
    }
}

/// Loading and error flags carried by every store state.
pub(crate) trait Tracked {
    fn loading_mut(&mut self) -> &mut bool;
    fn error_mut(&mut self) -> &mut Option<ApiError>;
}

/// Whether a fetch drives the store's `loading` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetch {
    Primary,
    Background,
}

/// Run one fetch and hand its raw result to `apply`.
///
/// Returns `None` without calling `apply` when the response belongs to a
/// superseded request.
pub(crate) async fn settle<S, T, R>(
    state: &RwLock<S>,
    sequence: &RequestSequence,
    kind: Fetch,
    slice: &'static str,
    request: impl Future<Output = Result<T, ApiError>>,
    apply: impl FnOnce(&mut S, Result<T, ApiError>) -> Option<R>,
) -> Option<R>
where
    S: Tracked,
{
    let ticket = sequence.issue();
    {
        let mut guard = state.write().await;
        *guard.error_mut() = None;
        if kind == Fetch::Primary {
            *guard.loading_mut() = true;
        }
    }

    let result = request.await;

    let mut guard = state.write().await;
    if !sequence.admits(ticket) {
        debug!(slice, ?ticket, "Dropping response to a superseded request");
        return None;
    }
    if kind == Fetch::Primary {
        *guard.loading_mut() = false;
    }
    apply(&mut *guard, result)
}

/// [`settle`] for the common case: store the value on success, record the
/// error on failure.
pub(crate) async fn fetch<S, T, R>(
    state: &RwLock<S>,
    sequence: &RequestSequence,
    kind: Fetch,
    slice: &'static str,
    request: impl Future<Output = Result<T, ApiError>>,
    apply: impl FnOnce(&mut S, T) -> R,
) -> Option<R>
where
    S: Tracked,
{
    settle(state, sequence, kind, slice, request, |s, result| match result {
        Ok(value) => Some(apply(s, value)),
        Err(e) => {
            *s.error_mut() = Some(e);
            None
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepprflow_client::ErrorCode;

    #[derive(Default)]
    struct Probe {
        loading: bool,
        error: Option<ApiError>,
        value: Option<u32>,
    }

    impl Tracked for Probe {
        fn loading_mut(&mut self) -> &mut bool {
            &mut self.loading
        }

        fn error_mut(&mut self) -> &mut Option<ApiError> {
            &mut self.error
        }
    }

    #[tokio::test]
    async fn test_fetch_applies_value_and_clears_loading() {
        let state = RwLock::new(Probe::default());
        let seq = RequestSequence::default();

        let applied = fetch(&state, &seq, Fetch::Primary, "probe", async { Ok(7) }, |s, v| {
            s.value = Some(v);
        })
        .await;

        assert!(applied.is_some());
        let probe = state.read().await;
        assert_eq!(probe.value, Some(7));
        assert!(!probe.loading);
        assert!(probe.error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_value() {
        let state = RwLock::new(Probe {
            value: Some(1),
            ..Default::default()
        });
        let seq = RequestSequence::default();

        let applied = fetch(
            &state,
            &seq,
            Fetch::Primary,
            "probe",
            async { Err::<u32, _>(ApiError::timeout()) },
            |s, v| s.value = Some(v),
        )
        .await;

        assert!(applied.is_none());
        let probe = state.read().await;
        assert_eq!(probe.value, Some(1));
        assert!(!probe.loading);
        assert_eq!(probe.error.as_ref().unwrap().code, ErrorCode::Timeout);
    }

    #[test]
    fn test_page_size_floor() {
        assert_eq!(StoreConfig::new().default_page_size, 20);
        assert_eq!(StoreConfig::new().with_default_page_size(0).default_page_size, 1);
    }
}
