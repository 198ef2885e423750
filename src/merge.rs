// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Entity merge layer

use crate::resource::Resource;
use crate::types::EditRecord;
use serde::{Deserialize, Serialize};

/// An entity with its local overrides applied
///
/// Serializes as the entity's own fields plus `id` and `hasLocalEdits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedEntity<R> {
    /// Entity fields after overlay
    #[serde(flatten)]
    pub entity: R,
    /// Short ID extracted from the entity URL
    pub id: String,
    /// Whether a local edit record was applied
    pub has_local_edits: bool,
}

/// Overlay `edit` onto a copy of `entity`.
///
/// Every field the edit sets replaces the entity's value; unset and empty
/// fields leave the entity untouched.
pub fn merge<R: Resource>(entity: &R, edit: Option<&EditRecord<R::Patch>>) -> MergedEntity<R> {
    let mut merged = entity.clone();
    if let Some(record) = edit {
        merged.overlay(&record.edited_data);
    }

    MergedEntity {
        id: entity.entity_id(),
        entity: merged,
        has_local_edits: edit.is_some(),
    }
}

impl<R: Resource> MergedEntity<R> {
    /// Display name after overlay
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.entity.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Film, FilmPatch};
    use serde_json::json;

    fn new_hope() -> Film {
        serde_json::from_value(json!({
            "title": "A New Hope",
            "episode_id": 4,
            "director": "George Lucas",
            "producer": "Gary Kurtz, Rick McCallum",
            "release_date": "1977-05-25",
            "opening_crawl": "It is a period of civil war.",
            "characters": ["https://swapi.py4e.com/api/people/1/"],
            "url": "https://swapi.py4e.com/api/films/1/"
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_without_edit() {
        let film = new_hope();
        let merged = merge(&film, None);

        assert_eq!(merged.entity, film);
        assert_eq!(merged.id, "1");
        assert!(!merged.has_local_edits);
    }

    #[test]
    fn test_merge_overrides_typed_field() {
        let film = new_hope();
        let record = EditRecord::new(
            "1",
            FilmPatch {
                episode_id: Some(9),
                director: Some(String::new()),
                ..Default::default()
            },
        );

        let merged = merge(&film, Some(&record));

        assert_eq!(merged.entity.episode_id, 9);
        assert_eq!(merged.entity.director, "George Lucas");
        assert_eq!(merged.entity.characters, film.characters);
        assert!(merged.has_local_edits);
    }

    #[test]
    fn test_zero_episode_does_not_overlay() {
        let film = new_hope();
        let record = EditRecord::new(
            "1",
            FilmPatch {
                episode_id: Some(0),
                ..Default::default()
            },
        );

        assert_eq!(merge(&film, Some(&record)).entity.episode_id, 4);
    }

    #[test]
    fn test_merged_json_shape() {
        let merged = merge(&new_hope(), None);
        let value = serde_json::to_value(&merged).unwrap();

        assert_eq!(value["title"], "A New Hope");
        assert_eq!(value["id"], "1");
        assert_eq!(value["hasLocalEdits"], false);
    }
}
