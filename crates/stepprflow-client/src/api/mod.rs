// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Domain gateways.
//!
//! One trait per backend resource area. Each method performs exactly one HTTP
//! call through [`ApiClient`](crate::ApiClient) and returns the parsed body.
//! Gateways hold no state and catch nothing: an [`ApiError`](crate::ApiError)
//! from the transport is returned untouched.
//!
//! The traits exist so the stores can be driven by something other than a
//! live server.

mod circuit_breakers;
mod dashboard;
mod executions;
mod health;
mod metrics;
mod outbox;

pub use circuit_breakers::CircuitBreakerApi;
pub use dashboard::DashboardApi;
pub use executions::{ExecutionApi, ExecutionQuery};
pub use health::HealthApi;
pub use metrics::MetricsApi;
pub use outbox::OutboxApi;

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
