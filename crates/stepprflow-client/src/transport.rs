// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP transport.
//!
//! [`ApiClient`] owns the `reqwest` client, prefixes every path with the
//! `/api` base path and turns every failure into an [`ApiError`]. It never
//! retries and never caches.

use std::collections::BTreeMap;

use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError, Result};

const API_BASE_PATH: &str = "api";

/// Flat query-string builder.
///
/// Empty values are dropped instead of being sent as `key=`, so an unset
/// filter never reaches the backend as "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. Blank values are ignored.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        if !value.trim().is_empty() {
            self.0.insert(key.into(), value);
        }
        self
    }

    /// Set a parameter when a value is present.
    pub fn set_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Client for the stepprflow monitoring API.
///
/// The domain gateways ([`DashboardApi`](crate::DashboardApi),
/// [`ExecutionApi`](crate::ExecutionApi), ...) are implemented on this type.
///
/// # Example
///
/// ```no_run
/// use stepprflow_client::{ApiClient, ClientConfig, ExecutionApi};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(ClientConfig::new().with_base_url("http://localhost:8080"))?;
/// let recent = client.recent().await?;
/// println!("{} recent executions", recent.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a full URL from a path relative to the API base path.
    pub(crate) fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            API_BASE_PATH,
            path
        )
    }

    /// Issue a request and decode a JSON response body.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.send(method, path, query, body).await?;
        decode(&bytes).inspect_err(report)
    }

    /// Issue a request whose success response may have no body (202/204).
    pub(crate) async fn request_optional<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.send(method, path, query, body).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        decode(&bytes).map(Some).inspect_err(report)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&QueryParams>,
    ) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, query, None).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<&B>,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");

        let mut builder = self.http.request(method, &url);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let pairs: Vec<(&str, &str)> = query.iter().collect();
            builder = builder.query(&pairs);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(ApiError::from)
            .inspect_err(report)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(ApiError::from)
            .inspect_err(report)?;

        if status.is_success() || status == StatusCode::NO_CONTENT {
            Ok(bytes.to_vec())
        } else {
            let err = ApiError::from_response(status.as_u16(), &bytes);
            report(&err);
            Err(err)
        }
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::request(format!("failed to decode response body: {}", e)))
}

/// Log a normalized error. Never alters it.
fn report(err: &ApiError) {
    warn!(
        code = %err.code,
        message = %err.message,
        status = ?err.status,
        details = ?err.details,
        "API error"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(ClientConfig::new().with_base_url(base)).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client("http://localhost:8080");
        assert_eq!(
            client.url("workflows/recent"),
            "http://localhost:8080/api/workflows/recent"
        );
        assert_eq!(
            client.url("/workflows/recent"),
            "http://localhost:8080/api/workflows/recent"
        );
    }

    #[test]
    fn test_url_building_with_trailing_slash() {
        let client = client("http://localhost:8080/");
        assert_eq!(client.url("health"), "http://localhost:8080/api/health");
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        let result = ApiClient::new(ClientConfig::new().with_base_url("not-a-url"));
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_query_params_skip_blank_values() {
        let mut params = QueryParams::new();
        params
            .set("page", 0)
            .set("topic", "")
            .set("search", "   ")
            .set_opt::<&str>("status", None)
            .set_opt("sort", Some("createdAt"));

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("page"), Some("0"));
        assert_eq!(params.get("sort"), Some("createdAt"));
        assert!(params.get("topic").is_none());
    }

    #[test]
    fn test_query_params_from_iter() {
        let params: QueryParams = [("topic", "orders"), ("status", "")].into_iter().collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("topic"), Some("orders"));
    }
}
