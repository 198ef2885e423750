// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fetch-and-hold cache of remote responses
//!
//! Holds raw API JSON only. Local edits are never written here; they are
//! merged on every read, so a refetch cannot lose or resurrect an edit.

use crate::fetcher::ListQuery;
use crate::resource::EntityKind;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Freshness windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// List responses are fresh for this long
    pub list_stale: Duration,
    /// Detail responses are fresh for this long
    pub detail_stale: Duration,
    /// List responses are dropped after this long
    pub list_gc: Duration,
    /// Detail responses are dropped after this long
    pub detail_gc: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            list_stale: Duration::from_secs(5 * 60),
            detail_stale: Duration::from_secs(10 * 60),
            list_gc: Duration::from_secs(10 * 60),
            detail_gc: Duration::from_secs(30 * 60),
        }
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// Within the stale window
    Fresh(&'a Value),
    /// Past the stale window but not yet collected; usable if a refetch fails
    Stale(&'a Value),
    /// Nothing held
    Miss,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    fetched_at: Instant,
}

/// In-process response cache
#[derive(Debug, Clone, Default)]
pub struct FetchCache {
    policy: CachePolicy,
    lists: HashMap<(EntityKind, ListQuery), Entry>,
    details: HashMap<(EntityKind, String), Entry>,
}

impl FetchCache {
    /// Empty cache with the given windows
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Freshness windows in use
    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up a list response as of `now`
    #[must_use]
    pub fn list(&self, kind: EntityKind, query: &ListQuery, now: Instant) -> Lookup<'_> {
        let entry = self.lists.get(&(kind, query.clone()));
        classify(entry, now, self.policy.list_stale, self.policy.list_gc)
    }

    /// Hold a list response fetched at `now`
    pub fn put_list(&mut self, kind: EntityKind, query: &ListQuery, value: Value, now: Instant) {
        self.lists.insert(
            (kind, query.clone()),
            Entry {
                value,
                fetched_at: now,
            },
        );
    }

    /// Look up a detail response as of `now`
    #[must_use]
    pub fn detail(&self, kind: EntityKind, id: &str, now: Instant) -> Lookup<'_> {
        let entry = self.details.get(&(kind, id.to_string()));
        classify(entry, now, self.policy.detail_stale, self.policy.detail_gc)
    }

    /// Hold a detail response fetched at `now`
    pub fn put_detail(&mut self, kind: EntityKind, id: &str, value: Value, now: Instant) {
        self.details.insert(
            (kind, id.to_string()),
            Entry {
                value,
                fetched_at: now,
            },
        );
    }

    /// Drop everything held for `kind`
    pub fn invalidate(&mut self, kind: EntityKind) {
        self.lists.retain(|(k, _), _| *k != kind);
        self.details.retain(|(k, _), _| *k != kind);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.lists.clear();
        self.details.clear();
    }

    /// Drop entries past their gc window
    pub fn prune(&mut self, now: Instant) {
        let CachePolicy {
            list_gc, detail_gc, ..
        } = self.policy;
        self.lists
            .retain(|_, e| now.saturating_duration_since(e.fetched_at) < list_gc);
        self.details
            .retain(|_, e| now.saturating_duration_since(e.fetched_at) < detail_gc);
    }

    /// Number of held responses
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len() + self.details.len()
    }

    /// Whether nothing is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn classify(entry: Option<&Entry>, now: Instant, stale: Duration, gc: Duration) -> Lookup<'_> {
    match entry {
        None => Lookup::Miss,
        Some(entry) => {
            let age = now.saturating_duration_since(entry.fetched_at);
            if age < stale {
                Lookup::Fresh(&entry.value)
            } else if age < gc {
                Lookup::Stale(&entry.value)
            } else {
                Lookup::Miss
            }
        }
    }
}
