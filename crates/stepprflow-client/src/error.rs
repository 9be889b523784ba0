// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for stepprflow-client.
//!
//! Every failed call made through [`ApiClient`](crate::ApiClient) surfaces as
//! exactly one [`ApiError`]. Three kinds of failure collapse into it:
//!
//! - transport failures (no response at all): `NETWORK_ERROR` or `TIMEOUT`
//! - protocol failures (an HTTP status without the backend's error envelope):
//!   mapped from the status code
//! - domain failures (the backend's `{code, message, ...}` envelope): the
//!   envelope's own code is kept verbatim

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for gateway calls.
pub type Result<T> = std::result::Result<T, ApiError>;

const GENERIC_MESSAGE: &str = "An error occurred";

/// Machine-readable error code.
///
/// Known codes get their own variant; anything else the backend sends is
/// preserved in [`ErrorCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    /// `INVALID_ARGUMENT` - the request carried a bad parameter.
    InvalidArgument,
    /// `INVALID_STATE` - the resource is in a status that forbids the action.
    InvalidState,
    /// `CONCURRENT_MODIFICATION` - optimistic locking failed on the server.
    ConcurrentModification,
    /// `RESOURCE_NOT_FOUND`
    ResourceNotFound,
    /// `VALIDATION_ERROR` - bean validation rejected the request body.
    ValidationError,
    /// `INTERNAL_ERROR`
    InternalError,
    /// `UNAUTHORIZED`
    Unauthorized,
    /// `FORBIDDEN`
    Forbidden,
    /// `NETWORK_ERROR` - no response was received.
    NetworkError,
    /// `TIMEOUT` - the client-side request timeout fired.
    Timeout,
    /// `UNKNOWN_ERROR` - an unstructured failure with an unmapped status.
    UnknownError,
    /// `REQUEST_ERROR` - the request could not be built or the response not decoded.
    RequestError,
    /// Any other code reported by the backend.
    Other(String),
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::RequestError => "REQUEST_ERROR",
            ErrorCode::Other(code) => code,
        }
    }

    /// User-facing message used when the backend envelope carries no message.
    ///
    /// Only the codes produced by the backend's exception handler have one.
    pub fn fallback_message(&self) -> Option<&'static str> {
        match self {
            ErrorCode::InvalidArgument => Some("Invalid input provided"),
            ErrorCode::InvalidState => Some("This action is not allowed in the current state"),
            ErrorCode::ConcurrentModification => {
                Some("This item was modified by another user. Please refresh and try again.")
            }
            ErrorCode::ResourceNotFound => Some("The requested item was not found"),
            ErrorCode::ValidationError => Some("Please check your input and try again"),
            ErrorCode::InternalError => {
                Some("An unexpected error occurred. Please try again later.")
            }
            _ => None,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        match value {
            "INVALID_ARGUMENT" => ErrorCode::InvalidArgument,
            "INVALID_STATE" => ErrorCode::InvalidState,
            "CONCURRENT_MODIFICATION" => ErrorCode::ConcurrentModification,
            "RESOURCE_NOT_FOUND" => ErrorCode::ResourceNotFound,
            "VALIDATION_ERROR" => ErrorCode::ValidationError,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NETWORK_ERROR" => ErrorCode::NetworkError,
            "TIMEOUT" => ErrorCode::Timeout,
            "UNKNOWN_ERROR" => ErrorCode::UnknownError,
            "REQUEST_ERROR" => ErrorCode::RequestError,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ErrorCode::from(s))
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        ErrorCode::from(value.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field or parameter.
    #[serde(default)]
    pub field: String,
    /// Why it was rejected.
    #[serde(default)]
    pub message: String,
}

/// Structured context attached to an [`ApiError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorDetails {
    pub timestamp: Option<String>,
    pub execution_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ErrorDetails {
    /// True when no detail field is populated.
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none()
            && self.execution_id.is_none()
            && self.resource_type.is_none()
            && self.resource_id.is_none()
            && self.field_errors.is_empty()
    }
}

impl ErrorDetails {
    /// Read the detail fields of a backend error body.
    ///
    /// Each field is defaulted on its own, so one malformed field never
    /// hides the others.
    fn from_envelope(value: &Value) -> Self {
        Self {
            timestamp: text_field(value, "timestamp"),
            execution_id: text_field(value, "executionId"),
            resource_type: text_field(value, "resourceType"),
            resource_id: text_field(value, "resourceId"),
            field_errors: value
                .get("fieldErrors")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| FieldError::deserialize(item).ok())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// A string field of the envelope. Numeric ids are kept as their decimal text.
fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Normalized API error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context from the backend envelope.
    pub details: ErrorDetails,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Raw JSON body of the failed response, when it had one.
    pub payload: Option<Value>,
}

impl ApiError {
    /// Create an error with a code and message and no details.
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: ErrorDetails::default(),
            status: None,
            payload: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Attach the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the raw response body.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Error for a request that never got a response.
    pub fn network() -> Self {
        Self::new(
            ErrorCode::NetworkError,
            "Unable to connect to server. Please check your connection.",
        )
    }

    /// Error for a request aborted by the client-side timeout.
    pub fn timeout() -> Self {
        Self::new(
            ErrorCode::Timeout,
            "Request timed out. Please check your connection and try again.",
        )
    }

    /// Error for a request that could not be built or whose body could not be decoded.
    pub fn request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RequestError, message)
    }

    /// Classify a non-success HTTP response.
    ///
    /// A JSON body with a non-empty `code` is treated as the backend envelope.
    /// Anything else is mapped from the status code.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();

        if let Some(value) = parsed.as_ref().filter(|v| has_code(v)) {
            return Self::from_envelope(value)
                .with_status(status)
                .with_payload(value.clone());
        }

        let error = match status {
            401 => Self::new(ErrorCode::Unauthorized, "Please log in to continue"),
            403 => Self::new(
                ErrorCode::Forbidden,
                "You do not have permission to perform this action",
            ),
            404 => Self::new(
                ErrorCode::ResourceNotFound,
                "The requested resource was not found",
            ),
            s if s >= 500 => Self::new(
                ErrorCode::InternalError,
                "Server error. Please try again later.",
            ),
            _ => {
                let message = parsed
                    .as_ref()
                    .and_then(|v| v.get("message"))
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(GENERIC_MESSAGE);
                Self::new(ErrorCode::UnknownError, message)
            }
        }
        .with_status(status);

        match parsed {
            Some(value) => error.with_payload(value),
            None => error,
        }
    }

    fn from_envelope(value: &Value) -> Self {
        let code = value.get("code").and_then(Value::as_str).unwrap_or_default();
        let code = ErrorCode::from(code);
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| code.fallback_message().map(str::to_string))
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string());

        Self::new(code, message).with_details(ErrorDetails::from_envelope(value))
    }

    /// Check for a specific code.
    pub fn is(&self, code: &ErrorCode) -> bool {
        &self.code == code
    }

    /// The server-side state changed since it was read, or forbids the transition.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConcurrentModification | ErrorCode::InvalidState
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::ResourceNotFound
    }

    /// The request was rejected on input; `details.field_errors` may say where.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidArgument | ErrorCode::ValidationError
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::timeout()
        } else if err.is_connect() || err.is_request() {
            ApiError::network()
        } else {
            ApiError::request(err.to_string())
        }
    }
}

fn has_code(value: &Value) -> bool {
    value
        .get("code")
        .and_then(Value::as_str)
        .is_some_and(|code| !code.is_empty())
}

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a malformed value.
    #[error("invalid {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    /// The base URL is not an http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
