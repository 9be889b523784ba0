// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! stepprflow console
//!
//! Client-side state for the stepprflow monitoring API. Each store caches one
//! domain (dashboard, executions, metrics, circuit breakers, health, outbox),
//! tracks loading and error flags, and exposes derived values and operator
//! actions. Stores are the only place where an
//! [`ApiError`](stepprflow_client::ApiError) is caught: a failed fetch keeps
//! the last good data and records the error next to it.
//!
//! # Example
//!
//! ```no_run
//! use stepprflow_client::{ApiClient, ClientConfig};
//! use stepprflow_console::{Console, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let console = Console::new(ApiClient::new(ClientConfig::from_env()?)?, StoreConfig::new());
//!
//! console.refresh_all().await;
//! println!("health: {}", console.metrics.health_status().await);
//!
//! let outcome = console.executions.resume("exec-42", None).await;
//! if outcome.needs_refresh {
//!     console.executions.fetch_execution("exec-42").await;
//! }
//! # Ok(())
//! # }
//! ```

mod console;
mod outcome;
mod sequence;
pub mod stores;

pub use console::Console;
pub use outcome::ActionOutcome;
pub use sequence::{Consistency, RequestSequence, Ticket};
pub use stores::{
    CircuitBreakerState, CircuitBreakerStore, DashboardState, DashboardStore, ExecutionFilters,
    ExecutionsState, ExecutionsStore, FilterUpdate, HealthState, HealthStatus, HealthStore,
    MetricsState, MetricsStore, OutboxState, OutboxStore, Pagination, StoreConfig,
};
