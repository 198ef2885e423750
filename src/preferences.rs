// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Theme preference and search history

use crate::storage::{JsonStore, KeyValueBackend, SEARCH_HISTORY_KEY, THEME_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search terms kept in history
pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other} (valid: light, dark)")),
        }
    }
}

/// Preferences persisted next to the edits
#[derive(Debug, Clone)]
pub struct Preferences<B> {
    store: JsonStore<B>,
}

impl<B: KeyValueBackend> Preferences<B> {
    /// Preferences over a backend
    pub fn new(backend: B) -> Self {
        Self {
            store: JsonStore::new(backend),
        }
    }

    /// Saved theme, if any
    pub fn theme(&self) -> Option<Theme> {
        self.store.get(THEME_KEY)
    }

    /// Save the theme
    pub fn set_theme(&self, theme: Theme) {
        self.store.set(THEME_KEY, &theme);
    }

    /// Recent search terms, newest first
    pub fn search_history(&self) -> Vec<String> {
        self.store.get(SEARCH_HISTORY_KEY).unwrap_or_default()
    }

    /// Move `term` to the front of the history, keeping at most
    /// [`SEARCH_HISTORY_LIMIT`] distinct terms
    pub fn add_search_term(&self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        let mut history = self.search_history();
        history.retain(|t| t != term);
        history.insert(0, term.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);
        self.store.set(SEARCH_HISTORY_KEY, &history);
    }

    /// Forget every search term
    pub fn clear_search_history(&self) {
        self.store.remove(SEARCH_HISTORY_KEY);
    }
}
