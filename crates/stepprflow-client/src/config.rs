// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the API client.

use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_OPERATOR: &str = "UI User";

/// Configuration for the [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin. The client appends the `/api` base path itself.
    pub base_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Recorded as `changedBy` on payload edits.
    pub operator: String,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            operator: DEFAULT_OPERATOR.to_string(),
            user_agent: concat!("stepprflow-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STEPPRFLOW_API_URL`: Server origin (default: "http://localhost:8080")
    /// - `STEPPRFLOW_REQUEST_TIMEOUT_MS`: Request timeout in milliseconds (default: 10000)
    /// - `STEPPRFLOW_OPERATOR`: Name recorded on payload edits (default: "UI User")
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("STEPPRFLOW_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let request_timeout_ms: u64 = match std::env::var("STEPPRFLOW_REQUEST_TIMEOUT_MS") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidEnv {
                name: "STEPPRFLOW_REQUEST_TIMEOUT_MS",
                reason: format!("{}", e),
            })?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        let operator =
            std::env::var("STEPPRFLOW_OPERATOR").unwrap_or_else(|_| DEFAULT_OPERATOR.to_string());

        Ok(Self {
            base_url,
            request_timeout: Duration::from_millis(request_timeout_ms),
            operator,
            ..Self::default()
        })
    }

    /// Set the server origin.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the operator name recorded on payload edits.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        Ok(())
    }
}
