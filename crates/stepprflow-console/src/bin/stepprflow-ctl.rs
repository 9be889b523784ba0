// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! stepprflow Control CLI
//!
//! Inspect and operate workflow executions through the monitoring API.
//! Snapshots are printed to stdout as pretty JSON, logs go to stderr.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use stepprflow_client::{ApiClient, ApiError, ClientConfig, SortDirection, WorkflowStatus};
use stepprflow_console::{ActionOutcome, Consistency, Console, FilterUpdate, StoreConfig};

/// Operate stepprflow workflow executions.
#[derive(Parser)]
#[command(name = "stepprflow-ctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server origin; `/api` is appended
    #[arg(long, env = "STEPPRFLOW_API_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Request timeout in milliseconds
    #[arg(long, env = "STEPPRFLOW_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Name recorded on payload edits
    #[arg(long, env = "STEPPRFLOW_OPERATOR", default_value = "UI User")]
    operator: String,

    /// How overlapping fetches resolve: last-response-wins or latest-request-wins
    #[arg(long, env = "STEPPRFLOW_CONSISTENCY", default_value = "last-response-wins")]
    consistency: Consistency,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show execution stats, recent executions and registered workflows
    Overview,

    /// List executions
    Executions {
        /// Page number, starting at 0
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Page size
        #[arg(long, default_value_t = 20)]
        size: u32,

        /// Filter by workflow topic
        #[arg(long)]
        topic: Option<String>,

        /// Filter by status (comma-separated, e.g. FAILED,RETRY_PENDING)
        #[arg(long, value_delimiter = ',')]
        status: Vec<WorkflowStatus>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Sort key
        #[arg(long, default_value = "createdAt")]
        sort: String,

        /// Sort direction (asc or desc)
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
    },

    /// Show one execution
    Show {
        /// Execution ID
        id: String,
    },

    /// Resume a failed or pending execution
    Resume {
        /// Execution ID
        id: String,

        /// Restart from this step instead of the failed one
        #[arg(long)]
        from_step: Option<u32>,
    },

    /// Cancel an execution
    Cancel {
        /// Execution ID
        id: String,
    },

    /// Change one payload field
    EditPayload {
        /// Execution ID
        id: String,

        /// Dotted path of the field, e.g. customer.email
        field_path: String,

        /// New value as JSON; a bare word is taken as a string
        value: String,

        /// Why the payload is being changed
        #[arg(long)]
        reason: String,
    },

    /// Restore the original payload
    RestorePayload {
        /// Execution ID
        id: String,
    },

    /// Show workflow metrics
    Metrics {
        /// Show a single topic instead of the dashboard
        #[arg(long)]
        topic: Option<String>,
    },

    /// List circuit breakers
    Breakers,

    /// Reset a circuit breaker
    ResetBreaker {
        /// Breaker name
        name: String,
    },

    /// Show service health
    Health,

    /// Show outbox delivery stats
    Outbox,

    /// Refresh metrics, breakers, health and outbox at once
    RefreshAll,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}

fn report_error(error: &ApiError) {
    eprintln!("Error: {}", error);
    for field in &error.details.field_errors {
        eprintln!("  {}: {}", field.field, field.message);
    }
}

/// Print an action outcome and turn it into an exit code.
fn finish_action(action: &str, outcome: ActionOutcome) -> ExitCode {
    if outcome.success {
        eprintln!("{} succeeded", action);
        return ExitCode::SUCCESS;
    }
    if let Some(error) = &outcome.error {
        report_error(error);
    }
    if outcome.needs_refresh {
        eprintln!("The execution changed on the server: refresh and retry.");
    }
    ExitCode::FAILURE
}

/// Print `error` if present and pick the exit code.
fn finish_fetch(error: Option<ApiError>) -> ExitCode {
    match error {
        Some(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

/// Parse a CLI value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = ClientConfig::new()
        .with_base_url(cli.url)
        .with_request_timeout(Duration::from_millis(cli.timeout_ms))
        .with_operator(cli.operator);
    let client = ApiClient::new(config).context("Failed to create API client")?;

    let mut store_config = StoreConfig::new().with_consistency(cli.consistency);
    if let Commands::Executions { size, .. } = &cli.command {
        store_config = store_config.with_default_page_size(*size);
    }
    let console = Console::new(client, store_config);

    let code = match cli.command {
        Commands::Overview => {
            let store = &console.dashboard;
            store.fetch_overview().await;
            let state = store.snapshot().await;
            print_json(&json!({
                "stats": state.stats,
                "recentExecutions": state.recent_executions,
                "workflows": state.workflows,
            }))?;
            finish_fetch(state.error)
        }

        Commands::Executions {
            page,
            topic,
            status,
            search,
            sort,
            direction,
            ..
        } => {
            let store = &console.executions;
            let mut update = FilterUpdate::new().statuses(status).sort(sort, direction);
            if let Some(topic) = topic {
                update = update.topic(topic);
            }
            if let Some(search) = search {
                update = update.search(search);
            }
            store.set_filters(update).await;
            store.set_page(page).await;

            let state = store.snapshot().await;
            print_json(&json!({
                "content": state.executions,
                "page": state.pagination.page,
                "size": state.pagination.size,
                "totalElements": state.pagination.total_elements,
                "totalPages": state.pagination.total_pages,
            }))?;
            finish_fetch(state.error)
        }

        Commands::Show { id } => {
            let store = &console.executions;
            store.fetch_execution(&id).await;
            if let Some(execution) = store.current().await {
                print_json(&execution)?;
            }
            finish_fetch(store.error().await)
        }

        Commands::Resume { id, from_step } => {
            finish_action("Resume", console.executions.resume(&id, from_step).await)
        }

        Commands::Cancel { id } => finish_action("Cancel", console.executions.cancel(&id).await),

        Commands::EditPayload {
            id,
            field_path,
            value,
            reason,
        } => {
            let store = &console.executions;
            // Load first so the edited execution lands in the current slot.
            store.fetch_execution(&id).await;
            let outcome = store
                .update_payload_field(&id, &field_path, parse_value(&value), &reason)
                .await;
            if outcome.success {
                if let Some(execution) = store.current().await {
                    print_json(&execution.payload)?;
                }
            }
            finish_action("Payload update", outcome)
        }

        Commands::RestorePayload { id } => {
            let store = &console.executions;
            store.fetch_execution(&id).await;
            let outcome = store.restore_payload(&id).await;
            if outcome.success {
                if let Some(execution) = store.current().await {
                    print_json(&execution.payload)?;
                }
            }
            finish_action("Payload restore", outcome)
        }

        Commands::Metrics { topic: Some(topic) } => {
            let store = &console.metrics;
            if let Some(metrics) = store.fetch_workflow_metrics(&topic).await {
                print_json(&metrics)?;
            }
            finish_fetch(store.error().await)
        }

        Commands::Metrics { topic: None } => {
            let store = &console.metrics;
            store.fetch_dashboard().await;
            let state = store.snapshot().await;
            print_json(&json!({
                "totalProcessed": state.total_processed(),
                "healthStatus": state.health_status(),
                "globalSuccessRate": state.dashboard.global_success_rate,
                "workflows": state.workflows_sorted(),
                "lastUpdated": state.last_updated,
            }))?;
            finish_fetch(state.error)
        }

        Commands::Breakers => {
            let store = &console.circuit_breakers;
            store.fetch_all().await;
            print_json(&store.breakers().await)?;
            finish_fetch(store.error().await)
        }

        Commands::ResetBreaker { name } => {
            let store = &console.circuit_breakers;
            let outcome = store.reset(&name).await;
            if outcome.success {
                print_json(&store.breakers().await)?;
            }
            finish_action("Reset", outcome)
        }

        Commands::Health => {
            let store = &console.health;
            store.fetch().await;
            let state = store.snapshot().await;
            print_json(&state.report)?;
            if state.error.is_none() && !state.is_healthy() {
                eprintln!("Unhealthy components: {}", state.down_components().join(", "));
                ExitCode::FAILURE
            } else {
                finish_fetch(state.error)
            }
        }

        Commands::Outbox => {
            let store = &console.outbox;
            store.fetch().await;
            print_json(&store.stats().await)?;
            finish_fetch(store.error().await)
        }

        Commands::RefreshAll => {
            console.refresh_all().await;
            let metrics = console.metrics.snapshot().await;
            let health = console.health.snapshot().await;
            print_json(&json!({
                "healthStatus": metrics.health_status(),
                "totalProcessed": metrics.total_processed(),
                "openBreakers": console.circuit_breakers.open_breakers().await,
                "health": health.report.as_ref().map(|report| report.status.as_str()),
                "downComponents": health.down_components(),
                "outbox": console.outbox.stats().await,
            }))?;

            let errors = console.refresh_errors().await;
            for error in &errors {
                report_error(error);
            }
            if errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Default to warn if RUST_LOG is not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
