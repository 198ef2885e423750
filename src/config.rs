// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layered: built-in defaults, then the TOML config file, then `HOLOCRON_*`
//! environment variables.

use crate::cache::CachePolicy;
use crate::explorer::ExplorerSettings;
use crate::fetcher::{RetryPolicy, DEFAULT_BASE_URL};
use crate::pagination::DEFAULT_PAGE_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API base URL
    pub base_url: String,
    /// Directory holding local edits and preferences
    pub data_dir: PathBuf,
    /// API page size
    pub page_size: u32,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries after a failed request
    pub max_retries: u32,
    /// Delay before the first retry, doubled per retry
    pub retry_base_ms: u64,
    /// Seconds a list response stays fresh
    pub list_stale_secs: u64,
    /// Seconds a detail response stays fresh
    pub detail_stale_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| {
                    std::env::current_dir()
                        .unwrap_or_else(|_| PathBuf::from("."))
                        .join(".holocron")
                }),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 15,
            max_retries: 3,
            retry_base_ms: 1000,
            list_stale_secs: 5 * 60,
            detail_stale_secs: 10 * 60,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hyperpolymath", "holocron")
}

/// Config file used when none is given
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

impl Config {
    /// Retry policy for the HTTP client
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_ms),
            ..RetryPolicy::default()
        }
    }

    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Session tunables
    #[must_use]
    pub fn explorer_settings(&self) -> ExplorerSettings {
        let list_stale = Duration::from_secs(self.list_stale_secs);
        let detail_stale = Duration::from_secs(self.detail_stale_secs);
        let defaults = CachePolicy::default();
        ExplorerSettings {
            page_size: self.page_size,
            cache: CachePolicy {
                list_stale,
                detail_stale,
                list_gc: defaults.list_gc.max(list_stale),
                detail_gc: defaults.detail_gc.max(detail_stale),
            },
        }
    }

    /// One setting rendered as text
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let table = toml::Value::try_from(self).ok()?;
        match table.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whole configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn validate(self) -> Result<Self> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.base_url))?;
        Ok(self)
    }
}

/// Load configuration: defaults, then `path` (or the default config file if
/// it exists), then `HOLOCRON_*` environment variables
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;
    let mut builder = config::Config::builder().add_source(defaults);

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }

    let layered = builder
        .add_source(config::Environment::with_prefix("HOLOCRON").try_parsing(true))
        .build()
        .context("Failed to load configuration")?;

    layered
        .try_deserialize::<Config>()
        .context("Invalid configuration")?
        .validate()
}
