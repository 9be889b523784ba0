// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ordering of overlapping fetches against one state slice.
//!
//! Fetches are never deduplicated or cancelled. Two calls of the same fetch
//! may be in flight at once, and [`Consistency`] decides which of their
//! responses may write to the store.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a store resolves overlapping fetches of the same slice.
///
/// Parsed from and displayed as `last-response-wins` or
/// `latest-request-wins`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Consistency {
    /// Every response is applied in arrival order, so the last one to arrive
    /// wins even if it answers an older request.
    #[default]
    LastResponseWins,
    /// Only the response to the most recently issued request is applied.
    /// Responses to superseded requests are dropped.
    LatestRequestWins,
}

impl Consistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::LastResponseWins => "last-response-wins",
            Consistency::LatestRequestWins => "latest-request-wins",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "last-response-wins" => Ok(Consistency::LastResponseWins),
            "latest-request-wins" => Ok(Consistency::LatestRequestWins),
            other => Err(format!("invalid consistency mode: {}", other)),
        }
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic ticket counter for one state slice.
#[derive(Debug)]
pub struct RequestSequence {
    consistency: Consistency,
    issued: AtomicU64,
}

impl RequestSequence {
    pub fn new(consistency: Consistency) -> Self {
        Self {
            consistency,
            issued: AtomicU64::new(0),
        }
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    /// Take the next ticket. Any ticket issued earlier becomes stale.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a response holding `ticket` may be applied.
    pub fn admits(&self, ticket: Ticket) -> bool {
        match self.consistency {
            Consistency::LastResponseWins => true,
            Consistency::LatestRequestWins => self.issued.load(Ordering::SeqCst) == ticket.0,
        }
    }
}

impl Default for RequestSequence {
    fn default() -> Self {
        Self::new(Consistency::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_parses_its_display_form() {
        for mode in [Consistency::LastResponseWins, Consistency::LatestRequestWins] {
            assert_eq!(mode.to_string().parse::<Consistency>(), Ok(mode));
        }
        assert!("first-wins".parse::<Consistency>().is_err());
    }

    #[test]
    fn test_last_response_wins_admits_everything() {
        let seq = RequestSequence::new(Consistency::LastResponseWins);
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.admits(first));
        assert!(seq.admits(second));
    }

    #[test]
    fn test_latest_request_wins_drops_superseded() {
        let seq = RequestSequence::new(Consistency::LatestRequestWins);
        let first = seq.issue();
        assert!(seq.admits(first));

        let second = seq.issue();
        assert!(first < second);
        assert!(!seq.admits(first));
        assert!(seq.admits(second));
    }
}
