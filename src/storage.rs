// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Key-value persistence adapter
//!
//! A [`KeyValueBackend`] is a raw, synchronous, string-only store (the
//! terminal stand-in for browser local storage). [`JsonStore`] layers typed
//! JSON access on top of it and contains every failure: corrupt or missing
//! data reads as absent, failed writes are logged and dropped.

use crate::resource::EntityKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Theme preference key
pub const THEME_KEY: &str = "star-wars-theme-preference";
/// Search history key
pub const SEARCH_HISTORY_KEY: &str = "star-wars-search-history";
/// Legacy single-kind character edits key (cleared, never written)
pub const LEGACY_CHARACTER_EDITS_KEY: &str = "star-wars-character-edits";
/// Legacy mixed entity edits key (cleared, never written)
pub const LEGACY_ENTITY_EDITS_KEY: &str = "star-wars-entity-edits";

/// Storage key holding the edit collection of one entity kind
#[must_use]
pub fn edits_key(kind: EntityKind) -> String {
    format!("star-wars-{}-edits", kind.as_str())
}

/// Every key this application owns
#[must_use]
pub fn known_keys() -> Vec<String> {
    let mut keys = vec![
        THEME_KEY.to_string(),
        SEARCH_HISTORY_KEY.to_string(),
        LEGACY_CHARACTER_EDITS_KEY.to_string(),
        LEGACY_ENTITY_EDITS_KEY.to_string(),
    ];
    keys.extend(EntityKind::ALL.iter().map(|kind| edits_key(*kind)));
    keys
}

/// Raw backend failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters the backend cannot address
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    /// Write would exceed the backend quota
    #[error("storage quota exceeded writing {key} ({needed} bytes, {available} available)")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Bytes the write needs
        needed: usize,
        /// Bytes left in the quota
        available: usize,
    },
    /// Underlying I/O failure
    #[error("storage I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Cause
        #[source]
        source: io::Error,
    },
}

/// Synchronous string key/value store
pub trait KeyValueBackend {
    /// Read a raw value
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Write a raw value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete a key; deleting a missing key succeeds
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for &B {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

// =============================================================================
// File backend
// =============================================================================

/// One file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a half-written value
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

// =============================================================================
// Memory backend
// =============================================================================

/// In-memory backend with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Unbounded backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose total stored bytes (keys + values) may not exceed `quota`
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota: Some(quota),
        }
    }

    /// Keys currently stored, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(self.used_without(key));
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// Typed JSON adapter
// =============================================================================

/// Fail-soft typed JSON access over a [`KeyValueBackend`]
#[derive(Debug, Clone)]
pub struct JsonStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> JsonStore<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and parse a value; `None` when missing, unreadable or corrupt
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                warn!("Error reading storage key \"{}\": {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt value under storage key \"{}\": {}", key, e);
                None
            }
        }
    }

    /// Serialize and write a value. Failures are logged and absorbed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing value for storage key \"{}\": {}", key, e);
                return;
            }
        };
        if let Err(e) = self.backend.set_item(key, &json) {
            error!("Error writing storage key \"{}\": {}", key, e);
        }
    }

    /// Delete a key. Failures are logged and absorbed.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            error!("Error removing storage key \"{}\": {}", key, e);
        }
    }

    /// Remove every key this application owns, leaving foreign keys alone
    pub fn clear_all(&self) {
        for key in known_keys() {
            debug!("Clearing storage key {}", key);
            self.remove(&key);
        }
    }

    /// Raw stored string, for diagnostics
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.get_item(key).ok().flatten()
    }
}
