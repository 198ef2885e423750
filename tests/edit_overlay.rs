// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit overlay tests - persistence, scoping and merge behavior
//!
//! These tests verify the overlay contract end to end:
//! 1. Merging is deterministic and edits take precedence
//! 2. Edits round-trip through storage, isolated per kind
//! 3. Restore and corrupt storage both fall back to the API data

use chrono::{DateTime, TimeZone, Utc};
use holocron::edits::EditStore;
use holocron::merge::merge;
use holocron::pagination::{current_page, PaginationInfo};
use holocron::resource::{Character, CharacterPatch, EntityKind, Film, FilmPatch};
use holocron::storage::{edits_key, FileBackend, JsonStore, KeyValueBackend, MemoryBackend};
use holocron::types::EditRecord;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn luke() -> Character {
    serde_json::from_value(json!({
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "homeworld": "https://swapi.py4e.com/api/planets/1/",
        "films": ["https://swapi.py4e.com/api/films/1/"],
        "url": "https://swapi.py4e.com/api/people/1/"
    }))
    .unwrap()
}

fn new_hope() -> Film {
    serde_json::from_value(json!({
        "title": "A New Hope",
        "episode_id": 4,
        "director": "George Lucas",
        "release_date": "1977-05-25",
        "url": "https://swapi.py4e.com/api/films/1/"
    }))
    .unwrap()
}

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn height_edit(height: &str) -> EditRecord<CharacterPatch> {
    EditRecord {
        id: "1".into(),
        edited_data: CharacterPatch {
            height: Some(height.into()),
            ..Default::default()
        },
        last_modified: new_year(),
    }
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn test_merge_is_idempotent() {
    let entity = luke();
    let record = height_edit("180");
    assert_eq!(merge(&entity, Some(&record)), merge(&entity, Some(&record)));
}

#[test]
fn test_override_precedence() {
    let entity = luke();
    let record = EditRecord {
        id: "1".into(),
        edited_data: CharacterPatch {
            name: Some("Luke".into()),
            eye_color: Some("green".into()),
            ..Default::default()
        },
        last_modified: new_year(),
    };

    let merged = merge(&entity, Some(&record));
    assert_eq!(merged.entity.name, "Luke");
    assert_eq!(merged.entity.eye_color, "green");
    // Fields only on the entity are untouched
    assert_eq!(merged.entity.height, "172");
    assert_eq!(merged.entity.films, entity.films);
    assert_eq!(merged.entity.url, entity.url);
}

#[test]
fn test_no_edit_passthrough() {
    let entity = luke();
    let merged = merge(&entity, None);

    assert_eq!(merged.entity, entity);
    assert_eq!(merged.id, "1");
    assert!(!merged.has_local_edits);

    let mut expected = serde_json::to_value(&entity).unwrap();
    expected["id"] = json!("1");
    expected["hasLocalEdits"] = json!(false);
    assert_eq!(serde_json::to_value(&merged).unwrap(), expected);
}

#[test]
fn test_empty_override_does_not_erase() {
    let record = EditRecord {
        id: "1".into(),
        edited_data: CharacterPatch {
            name: Some(String::new()),
            ..Default::default()
        },
        last_modified: new_year(),
    };
    let merged = merge(&luke(), Some(&record));
    assert_eq!(merged.entity.name, "Luke Skywalker");
    assert!(merged.has_local_edits);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_round_trip_with_unrelated_write() {
    let store = EditStore::new(MemoryBackend::new());
    let record = height_edit("180");

    store.set_edit::<Character>("1", record.clone());
    let mut other = height_edit("167");
    other.id = "2".into();
    store.set_edit::<Character>("2", other);

    assert_eq!(store.get_edit::<Character>("1"), Some(record));
    assert_eq!(store.get_edits::<Character>().len(), 2);
}

#[test]
fn test_round_trip_across_processes() {
    let dir = TempDir::new().unwrap();
    let record = height_edit("180");

    EditStore::new(FileBackend::new(dir.path())).set_edit::<Character>("1", record.clone());

    let reopened = EditStore::new(FileBackend::new(dir.path()));
    assert_eq!(reopened.get_edit::<Character>("1"), Some(record));
}

#[test]
fn test_scoping_isolation() {
    let store = EditStore::new(MemoryBackend::new());
    store.set_edit::<Character>("1", height_edit("180"));

    assert_eq!(store.get_edit::<Film>("1"), None);
    assert!(store.get_edits::<Film>().is_empty());
    assert_ne!(edits_key(EntityKind::Characters), edits_key(EntityKind::Films));
}

#[test]
fn test_restore_clears_override() {
    let store = EditStore::new(MemoryBackend::new());
    let entity = luke();
    store.set_edit::<Character>("1", height_edit("180"));
    store.remove_edit::<Character>("1");

    assert_eq!(store.get_edit::<Character>("1"), None);
    let merged = merge(&entity, store.get_edit::<Character>("1").as_ref());
    assert_eq!(merged, merge(&entity, None));
}

#[test]
fn test_corrupt_storage_reads_as_empty() {
    let backend = MemoryBackend::new();
    backend
        .set_item(&edits_key(EntityKind::Characters), "{not json")
        .unwrap();

    let store = EditStore::new(&backend);
    assert!(store.get_edits::<Character>().is_empty());
    assert_eq!(store.get_edit::<Character>("1"), None);

    // The next write replaces the corrupt value
    store.set_edit::<Character>("1", height_edit("180"));
    assert_eq!(store.get_edits::<Character>().len(), 1);
}

#[test]
fn test_wrong_shape_reads_as_empty() {
    let backend = MemoryBackend::new();
    backend
        .set_item(&edits_key(EntityKind::Films), "[1, 2, 3]")
        .unwrap();
    assert!(EditStore::new(&backend).get_edits::<Film>().is_empty());
}

#[test]
fn test_quota_failure_is_absorbed() {
    let backend = MemoryBackend::with_quota(16);
    let store = EditStore::new(&backend);

    store.set_edit::<Character>("1", height_edit("180"));
    assert_eq!(store.get_edit::<Character>("1"), None);
}

#[test]
fn test_persisted_layout() {
    let backend = MemoryBackend::new();
    EditStore::new(&backend).set_edit::<Character>("1", height_edit("180"));

    let raw = backend.get_item("star-wars-characters-edits").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        json!({
            "1": {
                "id": "1",
                "editedData": {"height": "180"},
                "lastModified": "2024-01-01T00:00:00Z"
            }
        })
    );
}

#[test]
fn test_clear_all_spares_foreign_keys() {
    let backend = MemoryBackend::new();
    backend.set_item("another-app-state", "\"keep\"").unwrap();
    let store = EditStore::new(&backend);
    store.set_edit::<Character>("1", height_edit("180"));
    store.set_edit::<Film>(
        "1",
        EditRecord {
            id: "1".into(),
            edited_data: FilmPatch {
                director: Some("Lucas".into()),
                ..Default::default()
            },
            last_modified: new_year(),
        },
    );

    JsonStore::new(&backend).clear_all();
    assert_eq!(backend.keys(), vec!["another-app-state".to_string()]);
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_page_derivation() {
    assert_eq!(current_page(Some("https://swapi.py4e.com/api/people/?page=3"), None), 2);
    assert_eq!(current_page(None, Some("https://swapi.py4e.com/api/people/?page=2")), 3);

    let info = PaginationInfo::new(82, Some("https://swapi.py4e.com/api/people/?page=3"), None, 10);
    assert_eq!(info.current_page, 2);
    assert_eq!(info.total_pages, 9);
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_luke_height_edit_and_restore() {
    let dir = TempDir::new().unwrap();
    let store = EditStore::new(FileBackend::new(dir.path()));
    let original: Character = serde_json::from_value(json!({
        "name": "Luke Skywalker",
        "height": "172",
        "url": "https://swapi.py4e.com/api/people/1/"
    }))
    .unwrap();

    store.set_edit::<Character>("1", height_edit("180"));
    let edited = serde_json::to_value(merge(&original, store.get_edit::<Character>("1").as_ref())).unwrap();
    assert_eq!(edited["name"], "Luke Skywalker");
    assert_eq!(edited["height"], "180");
    assert_eq!(edited["id"], "1");
    assert_eq!(edited["hasLocalEdits"], true);

    store.remove_edit::<Character>("1");
    let restored = serde_json::to_value(merge(&original, store.get_edit::<Character>("1").as_ref())).unwrap();
    assert_eq!(restored["name"], "Luke Skywalker");
    assert_eq!(restored["height"], "172");
    assert_eq!(restored["id"], "1");
    assert_eq!(restored["hasLocalEdits"], false);
}
