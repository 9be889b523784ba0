// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Result of a store mutation.

use stepprflow_client::ApiError;

/// What happened to an operator action (resume, cancel, payload edit, reset).
///
/// `needs_refresh` is set when the server rejected the action because the
/// caller's view of the resource is stale. The caller should re-fetch before
/// retrying; a plain failure carries the error alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<ApiError>,
    pub needs_refresh: bool,
}

impl ActionOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
            needs_refresh: false,
        }
    }

    pub fn failed(error: ApiError) -> Self {
        Self {
            success: false,
            needs_refresh: error.is_conflict(),
            error: Some(error),
        }
    }
}
