// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit store - local overrides organized by entity kind and ID
//!
//! Each kind's [`EditCollection`] lives under its own storage key and is
//! always read and written whole. A write that the backend rejects is
//! dropped by the [`JsonStore`], so the caller's view can run ahead of what
//! is persisted until the next successful write. Concurrent writers in
//! different processes race last-write-wins; [`EditStore::replace_edit`]
//! detects that race instead of hiding it.

use crate::resource::{normalize_id, EntityKind, Patch, Resource};
use crate::storage::{edits_key, JsonStore, KeyValueBackend};
use crate::types::{EditCollection, EditRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// The persisted record changed since it was read
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("edit for {kind}/{id} changed since it was loaded (expected {expected:?}, found {found:?})")]
pub struct EditConflict {
    /// Kind of the entity
    pub kind: EntityKind,
    /// Entity ID
    pub id: String,
    /// `lastModified` the caller loaded
    pub expected: Option<DateTime<Utc>>,
    /// `lastModified` currently persisted
    pub found: Option<DateTime<Utc>>,
}

/// Edit collections over a key-value backend
#[derive(Debug, Clone)]
pub struct EditStore<B> {
    store: JsonStore<B>,
}

impl<B: KeyValueBackend> EditStore<B> {
    /// Edit store over a backend
    pub fn new(backend: B) -> Self {
        Self {
            store: JsonStore::new(backend),
        }
    }

    /// Underlying JSON store
    pub fn store(&self) -> &JsonStore<B> {
        &self.store
    }

    /// Every edit of kind `R`; empty when none exist or storage is unreadable
    pub fn get_edits<R: Resource>(&self) -> EditCollection<R::Patch> {
        let key = edits_key(R::KIND);
        let mut edits: EditCollection<R::Patch> = self.store.get(&key).unwrap_or_default();
        edits.retain(|id, record| {
            let consistent = record.id == *id;
            if !consistent {
                warn!(
                    "Dropping {} edit stored under {:?} with mismatched id {:?}",
                    R::KIND,
                    id,
                    record.id
                );
            }
            consistent
        });
        edits
    }

    /// Edit for one entity
    pub fn get_edit<R: Resource>(&self, id: &str) -> Option<EditRecord<R::Patch>> {
        self.get_edits::<R>().remove(&normalize_id(id))
    }

    /// Store `record` for `id`, replacing any previous record wholesale
    pub fn set_edit<R: Resource>(&self, id: &str, mut record: EditRecord<R::Patch>) {
        let id = normalize_id(id);
        if normalize_id(&record.id) != id {
            warn!(
                "Rewriting {} edit id {:?} to match its key {:?}",
                R::KIND,
                record.id,
                id
            );
        }
        record.id.clone_from(&id);

        let mut edits = self.get_edits::<R>();
        edits.insert(id.clone(), record);
        self.write::<R>(&edits);
        debug!("Saved {} edit for {}", R::KIND, id);
    }

    /// Drop the edit for `id`, if any
    pub fn remove_edit<R: Resource>(&self, id: &str) {
        let id = normalize_id(id);
        let mut edits = self.get_edits::<R>();
        if edits.remove(&id).is_some() {
            self.write::<R>(&edits);
            debug!("Removed {} edit for {}", R::KIND, id);
        }
    }

    /// Record `patch` for `id` stamped with the current time.
    ///
    /// A patch that overrides nothing removes the edit instead. Returns the
    /// record that was stored.
    pub fn save<R: Resource>(&self, id: &str, patch: R::Patch) -> Option<EditRecord<R::Patch>> {
        let id = normalize_id(id);
        if patch.is_empty() {
            self.remove_edit::<R>(&id);
            return None;
        }
        let record = EditRecord::new(id.as_str(), patch);
        self.set_edit::<R>(&id, record.clone());
        Some(record)
    }

    /// Store `record` only if the persisted record still carries
    /// `expected` as its `lastModified` (`None`: no record may exist)
    pub fn replace_edit<R: Resource>(
        &self,
        id: &str,
        record: EditRecord<R::Patch>,
        expected: Option<DateTime<Utc>>,
    ) -> Result<(), EditConflict> {
        let found = self.get_edit::<R>(id).map(|r| r.last_modified);
        if found != expected {
            return Err(EditConflict {
                kind: R::KIND,
                id: normalize_id(id),
                expected,
                found,
            });
        }
        self.set_edit::<R>(id, record);
        Ok(())
    }

    /// Drop every edit of kind `R`
    pub fn clear<R: Resource>(&self) {
        self.store.remove(&edits_key(R::KIND));
    }

    fn write<R: Resource>(&self, edits: &EditCollection<R::Patch>) {
        let key = edits_key(R::KIND);
        if edits.is_empty() {
            self.store.remove(&key);
        } else {
            self.store.set(&key, edits);
        }
    }
}
