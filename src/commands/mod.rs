// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod clear;
pub mod completions;
pub mod config;
pub mod edit;
pub mod edits;
pub mod kinds;
pub mod list;
pub mod prefs;
pub mod restore;
pub mod show;

use anyhow::{Context as _, Result};
use holocron::config::Config;
use holocron::edits::EditStore;
use holocron::explorer::Explorer;
use holocron::fetcher::SwapiClient;
use holocron::preferences::Preferences;
use holocron::storage::{FileBackend, JsonStore};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

/// Everything a command needs from the command line and config
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Print JSON instead of text
    pub json: bool,
    /// Styling of text output
    pub palette: Palette,
}

impl Context {
    /// Storage rooted at the data directory
    pub fn backend(&self) -> FileBackend {
        FileBackend::new(&self.config.data_dir)
    }

    /// Edit store over the data directory
    pub fn edit_store(&self) -> EditStore<FileBackend> {
        EditStore::new(self.backend())
    }

    /// Raw key/value store over the data directory
    pub fn store(&self) -> JsonStore<FileBackend> {
        JsonStore::new(self.backend())
    }

    /// Preferences over the data directory
    pub fn preferences(&self) -> Preferences<FileBackend> {
        Preferences::new(self.backend())
    }

    /// Explorer session against the configured API
    pub fn explorer(&self) -> Result<Explorer<SwapiClient, FileBackend>> {
        let client = SwapiClient::new(
            &self.config.base_url,
            self.config.timeout(),
            self.config.retry_policy(),
        )
        .context("Failed to create HTTP client")?;
        Ok(Explorer::new(
            client,
            self.backend(),
            self.config.explorer_settings(),
        ))
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Text styles, disabled for `--no-color` and non-terminal output
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Palette that styles text only when `enabled`
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Section headings and entity names
    pub fn heading(self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    /// Values overridden by a local edit
    pub fn edited(self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    /// Secondary detail
    pub fn muted(self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    /// Completed actions
    pub fn ok(self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn paint(self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}
