// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Explorer session - remote data, cache and local edits behind one service
//!
//! The session is constructed explicitly with its source and storage
//! backend and handed to whoever renders lists and details.

use crate::cache::{CachePolicy, FetchCache, Lookup};
use crate::edits::EditStore;
use crate::fetcher::{decode_entity, decode_page, ApiError, EntitySource, ListQuery};
use crate::latest::RequestGeneration;
use crate::merge::{merge, MergedEntity};
use crate::pagination::{PaginationInfo, DEFAULT_PAGE_SIZE};
use crate::preferences::Preferences;
use crate::resource::{normalize_id, EntityKind, Resource};
use crate::storage::KeyValueBackend;
use crate::types::EditRecord;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// Tunables of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerSettings {
    /// API page size used for page counts
    pub page_size: u32,
    /// Cache windows
    pub cache: CachePolicy,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache: CachePolicy::default(),
        }
    }
}

/// A merged page of entities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<R> {
    /// Entities with local edits applied
    pub entities: Vec<MergedEntity<R>>,
    /// Page summary
    pub pagination: PaginationInfo,
    /// Served from an expired cache entry because the refetch failed
    pub stale: bool,
}

/// A merged entity with what it was merged from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView<R: Resource> {
    /// Entity with local edits applied
    pub merged: MergedEntity<R>,
    /// Entity as the API returned it
    pub original: R,
    /// Applied edit, if any
    pub edit: Option<EditRecord<R::Patch>>,
    /// Served from an expired cache entry because the refetch failed
    pub stale: bool,
}

/// One explorer session
pub struct Explorer<S, B> {
    source: S,
    edits: EditStore<B>,
    preferences: Preferences<B>,
    cache: FetchCache,
    generation: RequestGeneration,
    settings: ExplorerSettings,
}

impl<S: EntitySource, B: KeyValueBackend + Clone> Explorer<S, B> {
    /// Session over a remote source and a storage backend
    pub fn new(source: S, backend: B, settings: ExplorerSettings) -> Self {
        Self {
            source,
            edits: EditStore::new(backend.clone()),
            preferences: Preferences::new(backend),
            cache: FetchCache::new(settings.cache),
            generation: RequestGeneration::new(),
            settings,
        }
    }

    /// Local edit store
    pub fn edits(&self) -> &EditStore<B> {
        &self.edits
    }

    /// Preferences
    pub fn preferences(&self) -> &Preferences<B> {
        &self.preferences
    }

    /// Request counter; clone it to supersede requests from elsewhere
    pub fn generation(&self) -> &RequestGeneration {
        &self.generation
    }

    /// A page of `R`, merged with local edits
    pub fn list<R: Resource>(&mut self, query: &ListQuery) -> Result<ListView<R>, ApiError> {
        if query.search.is_some() && !R::KIND.searchable() {
            return Err(ApiError::NotSearchable(R::KIND));
        }

        let token = self.generation.begin();
        let (raw, stale) = self.load(
            R::KIND,
            |source| source.fetch_list(R::KIND, query),
            |cache, now| cache.list(R::KIND, query, now),
            |cache, value, now| cache.put_list(R::KIND, query, value, now),
        )?;
        let raw = self.generation.accept(token, raw).ok_or(ApiError::Superseded)?;

        let page = decode_page::<R>(raw)?;
        let edits = self.edits.get_edits::<R>();
        let entities = page
            .results
            .iter()
            .map(|entity| merge(entity, edits.get(&entity.entity_id())))
            .collect();

        if let Some(term) = &query.search {
            self.preferences.add_search_term(term);
        }

        Ok(ListView {
            entities,
            pagination: PaginationInfo::new(
                page.count,
                page.next.as_deref(),
                page.previous.as_deref(),
                self.settings.page_size,
            ),
            stale,
        })
    }

    /// One `R`, merged with its local edit
    pub fn detail<R: Resource>(&mut self, id: &str) -> Result<DetailView<R>, ApiError> {
        let id = normalize_id(id);
        let token = self.generation.begin();
        let (raw, stale) = self.load(
            R::KIND,
            |source| source.fetch_one(R::KIND, &id),
            |cache, now| cache.detail(R::KIND, &id, now),
            |cache, value, now| cache.put_detail(R::KIND, &id, value, now),
        )?;
        let raw = self.generation.accept(token, raw).ok_or(ApiError::Superseded)?;

        let original = decode_entity::<R>(raw)?;
        let edit = self.edits.get_edit::<R>(&original.entity_id());
        Ok(DetailView {
            merged: merge(&original, edit.as_ref()),
            original,
            edit,
            stale,
        })
    }

    /// Save a local edit for `id` (form submit)
    pub fn save_edit<R: Resource>(&self, id: &str, patch: R::Patch) -> Option<EditRecord<R::Patch>> {
        self.edits.save::<R>(id, patch)
    }

    /// Drop the local edit for `id`
    pub fn restore<R: Resource>(&self, id: &str) {
        self.edits.remove_edit::<R>(id);
    }

    /// Forget cached remote data for `kind`, or for every kind
    pub fn refresh(&mut self, kind: Option<EntityKind>) {
        match kind {
            Some(kind) => self.cache.invalidate(kind),
            None => self.cache.clear(),
        }
    }

    /// Cached JSON if fresh, otherwise fetched; an expired entry is served
    /// (flagged stale) when the refetch fails
    fn load(
        &mut self,
        kind: EntityKind,
        fetch: impl FnOnce(&S) -> Result<Value, ApiError>,
        lookup: impl Fn(&FetchCache, Instant) -> Lookup<'_>,
        store: impl FnOnce(&mut FetchCache, Value, Instant),
    ) -> Result<(Value, bool), ApiError> {
        let now = Instant::now();
        self.cache.prune(now);

        let fallback = match lookup(&self.cache, now) {
            Lookup::Fresh(value) => {
                debug!("Serving {} from cache", kind);
                return Ok((value.clone(), false));
            }
            Lookup::Stale(value) => Some(value.clone()),
            Lookup::Miss => None,
        };

        match fetch(&self.source) {
            Ok(value) => {
                store(&mut self.cache, value.clone(), Instant::now());
                Ok((value, false))
            }
            Err(e) => match fallback {
                Some(value) if !e.is_not_found() => {
                    warn!("Refetch of {} failed ({}), serving stale data", kind, e);
                    Ok((value, true))
                }
                _ => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Character, CharacterPatch};
    use crate::storage::MemoryBackend;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    struct Fixture {
        calls: Cell<usize>,
        fail: Cell<bool>,
        superseder: RefCell<Option<RequestGeneration>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: Cell::new(false),
                superseder: RefCell::new(None),
            }
        }
    }

    impl EntitySource for Fixture {
        fn fetch_list(&self, _kind: EntityKind, _query: &ListQuery) -> Result<Value, ApiError> {
            self.calls.set(self.calls.get() + 1);
            Ok(json!({
                "count": 12,
                "next": "https://swapi.py4e.com/api/people/?page=2",
                "previous": null,
                "results": [
                    {"name": "Luke Skywalker", "height": "172", "url": "https://swapi.py4e.com/api/people/1/"},
                    {"name": "C-3PO", "height": "167", "url": "https://swapi.py4e.com/api/people/2/"}
                ]
            }))
        }

        fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Value, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(generation) = self.superseder.borrow().as_ref() {
                generation.supersede();
            }
            if self.fail.get() {
                return Err(ApiError::Transport { url: "test".into(), message: "offline".into() });
            }
            if id != "1" {
                return Err(ApiError::NotFound { kind, id: id.into() });
            }
            Ok(json!({"name": "Luke Skywalker", "height": "172", "url": "https://swapi.py4e.com/api/people/1/"}))
        }
    }

    #[test]
    fn test_list_merges_edits() {
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(Fixture::new(), &backend, ExplorerSettings::default());
        explorer.save_edit::<Character>(
            "2",
            CharacterPatch {
                name: Some("See-Threepio".into()),
                ..Default::default()
            },
        );

        let view = explorer.list::<Character>(&ListQuery::default()).unwrap();
        assert_eq!(view.entities[0].entity.name, "Luke Skywalker");
        assert!(!view.entities[0].has_local_edits);
        assert_eq!(view.entities[1].entity.name, "See-Threepio");
        assert!(view.entities[1].has_local_edits);
        assert_eq!(view.pagination.current_page, 1);
        assert_eq!(view.pagination.total_pages, 2);
    }

    #[test]
    fn test_edits_survive_cached_and_refetched_data() {
        let source = Fixture::new();
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(&source, &backend, ExplorerSettings::default());

        explorer.detail::<Character>("1").unwrap();
        explorer.save_edit::<Character>(
            "1",
            CharacterPatch {
                height: Some("180".into()),
                ..Default::default()
            },
        );

        // Cached response, fresh merge
        let cached = explorer.detail::<Character>("1").unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(cached.merged.entity.height, "180");
        assert_eq!(cached.original.height, "172");

        explorer.refresh(None);
        let refetched = explorer.detail::<Character>("1").unwrap();
        assert_eq!(source.calls.get(), 2);
        assert_eq!(refetched.merged.entity.height, "180");

        explorer.restore::<Character>("1");
        let restored = explorer.detail::<Character>("1").unwrap();
        assert_eq!(restored.merged.entity.height, "172");
        assert!(!restored.merged.has_local_edits);
    }

    #[test]
    fn test_refresh_one_kind() {
        let source = Fixture::new();
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(&source, &backend, ExplorerSettings::default());

        explorer.detail::<Character>("1").unwrap();
        explorer.refresh(Some(EntityKind::Films));
        explorer.detail::<Character>("1").unwrap();
        assert_eq!(source.calls.get(), 1);

        explorer.refresh(Some(EntityKind::Characters));
        explorer.detail::<Character>("1").unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_padded_id_is_one_entity() {
        let source = Fixture::new();
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(&source, &backend, ExplorerSettings::default());
        explorer.save_edit::<Character>(
            "001",
            CharacterPatch {
                height: Some("180".into()),
                ..Default::default()
            },
        );

        let view = explorer.detail::<Character>("01").unwrap();
        assert_eq!(view.merged.entity.height, "180");
        explorer.detail::<Character>("1").unwrap();
        assert_eq!(source.calls.get(), 1);

        explorer.restore::<Character>(" 1 ");
        assert!(explorer.edits().get_edits::<Character>().is_empty());
    }

    #[test]
    fn test_not_found_is_distinct() {
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(Fixture::new(), &backend, ExplorerSettings::default());
        let err = explorer.detail::<Character>("999").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stale_data_served_when_refetch_fails() {
        let source = Fixture::new();
        let settings = ExplorerSettings {
            cache: CachePolicy {
                detail_stale: std::time::Duration::ZERO,
                ..CachePolicy::default()
            },
            ..ExplorerSettings::default()
        };
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(&source, &backend, settings);

        assert!(!explorer.detail::<Character>("1").unwrap().stale);
        source.fail.set(true);
        let view = explorer.detail::<Character>("1").unwrap();
        assert!(view.stale);
        assert_eq!(view.original.name, "Luke Skywalker");
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let source = Fixture::new();
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(&source, &backend, ExplorerSettings::default());
        source.superseder.replace(Some(explorer.generation().clone()));

        let err = explorer.detail::<Character>("1").unwrap_err();
        assert_eq!(err, ApiError::Superseded);
    }

    #[test]
    fn test_species_not_searchable() {
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(Fixture::new(), &backend, ExplorerSettings::default());
        let err = explorer
            .list::<crate::resource::Species>(&ListQuery::new(Some("wook".into()), None))
            .unwrap_err();
        assert_eq!(err, ApiError::NotSearchable(EntityKind::Species));
    }

    #[test]
    fn test_search_recorded_in_history() {
        let backend = MemoryBackend::new();
        let mut explorer = Explorer::new(Fixture::new(), &backend, ExplorerSettings::default());
        explorer
            .list::<Character>(&ListQuery::new(Some("sky".into()), None))
            .unwrap();
        assert_eq!(explorer.preferences().search_history(), vec!["sky".to_string()]);
    }
}
