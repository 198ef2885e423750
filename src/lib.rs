// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Holocron library - Star Wars reference data with local edit overlays
//!
//! Remote entities are fetched read-only and never modified. Local edits are
//! persisted per entity kind in a key-value store and merged over the remote
//! data every time an entity is shown, until they are restored.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod edits;
pub mod explorer;
pub mod fetcher;
pub mod format;
pub mod latest;
pub mod merge;
pub mod pagination;
pub mod preferences;
pub mod resource;
pub mod storage;
pub mod validation;

/// Core persisted data types
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    // =========================================================================
    // Edit records
    // =========================================================================

    /// Field-level overrides a user applied to one entity
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EditRecord<P> {
        /// Entity ID; always equal to the record's key in its collection
        pub id: String,
        /// Only the fields the user changed
        pub edited_data: P,
        /// When the record was saved
        pub last_modified: DateTime<Utc>,
    }

    impl<P> EditRecord<P> {
        /// Record stamped with the current time
        pub fn new(id: impl Into<String>, edited_data: P) -> Self {
            Self {
                id: id.into(),
                edited_data,
                last_modified: Utc::now(),
            }
        }
    }

    /// Every edit of one entity kind, keyed by entity ID
    pub type EditCollection<P> = BTreeMap<String, EditRecord<P>>;
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::edits::EditStore;
    pub use crate::explorer::{Explorer, ExplorerSettings};
    pub use crate::fetcher::{ApiError, EntitySource, ListQuery, SwapiClient};
    pub use crate::merge::{merge, MergedEntity};
    pub use crate::resource::{
        Character, EntityKind, FieldTag, Film, Patch, Planet, Resource, Species, Starship, Vehicle,
    };
    pub use crate::storage::{FileBackend, JsonStore, KeyValueBackend, MemoryBackend};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
