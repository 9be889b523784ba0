// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! stepprflow client
//!
//! Typed client for the stepprflow monitoring API: dashboard overview,
//! workflow executions, metrics, circuit breakers, health and outbox.
//!
//! # Architecture
//!
//! - [`ApiClient`] is the transport. It talks to `<base_url>/api`, applies a
//!   single request timeout and converts every failure into an [`ApiError`].
//! - The gateway traits ([`DashboardApi`], [`ExecutionApi`], [`MetricsApi`],
//!   [`CircuitBreakerApi`], [`HealthApi`], [`OutboxApi`]) map one method to
//!   one HTTP call and are implemented by [`ApiClient`].
//! - [`ApiError`] carries a code, a message and structured details, and
//!   answers `is_conflict`, `is_not_found` and `is_validation`.
//!
//! # Example
//!
//! ```no_run
//! use stepprflow_client::{ApiClient, ClientConfig, ExecutionApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//!
//! match client.resume("exec-42", None).await {
//!     Ok(_) => println!("resumed"),
//!     Err(e) if e.is_conflict() => println!("stale view, refresh first: {}", e),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod error;
mod transport;
mod types;

pub use api::{
    CircuitBreakerApi, DashboardApi, ExecutionApi, ExecutionQuery, HealthApi, MetricsApi,
    OutboxApi,
};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, ErrorCode, ErrorDetails, FieldError, Result};
pub use transport::{ApiClient, QueryParams};
pub use types::{
    BreakerState, CircuitBreakerConfig, CircuitBreakerStatus, ComponentHealth, DashboardConfig,
    DashboardOverview, ErrorInfo, Execution, ExecutionPage, ExecutionStats, HealthReport,
    MetricsDashboard, MetricsSummary, OutboxStats, PayloadChange, PayloadFieldUpdate, RetryInfo,
    STATUS_DOWN, STATUS_UP, ServiceInstance, SortDirection, StepExecution, WorkflowDefinition,
    WorkflowFilters, WorkflowMetrics, WorkflowStatus, WorkflowStep, WorkflowSummary,
};
