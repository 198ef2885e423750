// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Latest-request-wins bookkeeping for in-flight fetches

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation captured when a request starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Monotonic request counter shared between the requester and whoever may
/// supersede its requests
#[derive(Debug, Clone, Default)]
pub struct RequestGeneration {
    current: Arc<AtomicU64>,
}

impl RequestGeneration {
    /// Fresh counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Invalidate every outstanding token without starting a request
    pub fn supersede(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether `token` belongs to the most recent request
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.load(Ordering::Acquire) == token.0
    }

    /// `value` if `token` is still current, otherwise `None` (and the value is discarded)
    pub fn accept<T>(&self, token: RequestToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            tracing::debug!("Discarding superseded response (generation {})", token.0);
            None
        }
    }
}
