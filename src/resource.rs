// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Entity kinds and their schemas
//!
//! Every kind gets three types generated by [`resource!`]: the entity as the
//! API returns it, a closed enum of its editable fields, and a typed patch
//! holding at most one override per editable field.

use crate::validation::Rule;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Entity kinds
// =============================================================================

/// Closed set of resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// People (`/people`)
    Characters,
    /// Films
    Films,
    /// Planets
    Planets,
    /// Starships
    Starships,
    /// Species
    Species,
    /// Vehicles
    Vehicles,
}

impl EntityKind {
    /// Every kind, in display order
    pub const ALL: &'static [Self] = &[
        Self::Characters,
        Self::Films,
        Self::Planets,
        Self::Starships,
        Self::Species,
        Self::Vehicles,
    ];

    /// Kind name used in storage keys and on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Films => "films",
            Self::Planets => "planets",
            Self::Starships => "starships",
            Self::Species => "species",
            Self::Vehicles => "vehicles",
        }
    }

    /// API endpoint path relative to the base URL
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Characters => "/people",
            Self::Films => "/films",
            Self::Planets => "/planets",
            Self::Starships => "/starships",
            Self::Species => "/species",
            Self::Vehicles => "/vehicles",
        }
    }

    /// Singular display name
    #[must_use]
    pub fn singular(self) -> &'static str {
        match self {
            Self::Characters => "Character",
            Self::Films => "Film",
            Self::Planets => "Planet",
            Self::Starships => "Starship",
            Self::Species => "Species",
            Self::Vehicles => "Vehicle",
        }
    }

    /// Whether list requests accept a search term
    #[must_use]
    pub fn searchable(self) -> bool {
        !matches!(self, Self::Species | Self::Vehicles)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized kind name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown entity kind: {0} (valid: characters, films, planets, starships, species, vehicles)")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "characters" | "character" | "people" => Ok(Self::Characters),
            "films" | "film" => Ok(Self::Films),
            "planets" | "planet" => Ok(Self::Planets),
            "starships" | "starship" => Ok(Self::Starships),
            "species" => Ok(Self::Species),
            "vehicles" | "vehicle" => Ok(Self::Vehicles),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

// =============================================================================
// ID extraction
// =============================================================================

/// Short entity ID from a resource URL: the last non-empty path segment
#[must_use]
pub fn extract_entity_id(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string();
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

/// Canonical form of a user-supplied ID: trimmed, and numeric IDs without
/// leading zeros so `01` and `1` name the same entity
#[must_use]
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = id.trim_start_matches('0');
        return if stripped.is_empty() { "0" } else { stripped }.to_string();
    }
    id.to_string()
}

// =============================================================================
// Field traits
// =============================================================================

/// Value type of an editable field
pub trait FieldValue: Clone + fmt::Display + FromStr {
    /// Whether this value counts as set; empty strings do not
    fn is_present(&self) -> bool;
}

impl FieldValue for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

/// Zero stands for a cleared numeric input
impl FieldValue for i64 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

/// Closed set of editable fields of one kind
pub trait FieldTag: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// Every editable field in form order
    const ALL: &'static [Self];

    /// JSON key
    fn key(self) -> &'static str;

    /// Human label
    fn label(self) -> &'static str;

    /// Form validation rule
    fn rule(self) -> Rule;

    /// Look a field up by JSON key
    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// Field-level overrides for one entity
pub trait Patch: Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned {
    /// Field tag type
    type Field: FieldTag;

    /// Stored value, rendered, if any (may be empty)
    fn get(&self, field: Self::Field) -> Option<String>;

    /// Parse and store a value
    fn set(&mut self, field: Self::Field, raw: &str) -> Result<(), FieldError>;

    /// Drop an override
    fn unset(&mut self, field: Self::Field);

    /// Whether the field overrides the entity when merged
    fn is_present(&self, field: Self::Field) -> bool;

    /// True when nothing would be overlaid
    fn is_empty(&self) -> bool {
        Self::Field::ALL.iter().all(|f| !self.is_present(*f))
    }

    /// Present overrides in form order
    fn overrides(&self) -> Vec<(Self::Field, String)> {
        Self::Field::ALL
            .iter()
            .filter(|f| self.is_present(**f))
            .filter_map(|f| self.get(*f).map(|v| (*f, v)))
            .collect()
    }
}

/// A remote entity of one kind
pub trait Resource: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Kind of this resource
    const KIND: EntityKind;
    /// Editable fields
    type Field: FieldTag;
    /// Override bag
    type Patch: Patch<Field = Self::Field>;

    /// Canonical resource URL
    fn url(&self) -> &str;

    /// Title for films, name for everything else
    fn display_name(&self) -> &str;

    /// Current value of an editable field, rendered
    fn value(&self, field: Self::Field) -> String;

    /// Replace every present field of `patch` in place
    fn overlay(&mut self, patch: &Self::Patch);

    /// Short ID derived from the URL
    fn entity_id(&self) -> String {
        extract_entity_id(self.url())
    }
}

/// Failures turning user input into a patch
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// No such editable field
    #[error("unknown field `{field}` for {kind} (editable: {valid})")]
    Unknown {
        /// Kind being edited
        kind: EntityKind,
        /// Offending key
        field: String,
        /// Comma-separated editable keys
        valid: String,
    },
    /// Value does not parse as the field's type
    #[error("invalid value {value:?} for `{field}`: expected {expected}")]
    Invalid {
        /// Field key
        field: &'static str,
        /// Offending input
        value: String,
        /// Expected type
        expected: &'static str,
    },
    /// Assignment without `=`
    #[error("expected field=value, got {0:?}")]
    Assignment(String),
}

/// Resolve an editable field of `R` by its JSON key
pub fn field_by_key<R: Resource>(key: &str) -> Result<R::Field, FieldError> {
    R::Field::from_key(key.trim()).ok_or_else(|| FieldError::Unknown {
        kind: R::KIND,
        field: key.to_string(),
        valid: R::Field::ALL
            .iter()
            .map(|f| f.key())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Apply a `field=value` assignment to a patch
pub fn apply_assignment<R: Resource>(patch: &mut R::Patch, assignment: &str) -> Result<(), FieldError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| FieldError::Assignment(assignment.to_string()))?;
    let field = field_by_key::<R>(key)?;
    patch.set(field, value)
}

// =============================================================================
// Schema generation
// =============================================================================

macro_rules! resource {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:ident) {
            primary: $primary:ident,
            fields: $field:ident,
            patch: $patch:ident,
            editable {
                $( $efield:ident ($key:literal, $label:literal): $ety:ty = $rule:expr => $variant:ident, )+
            }
            links {
                $( $lfield:ident: $lty:ty, )*
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[allow(missing_docs)]
                #[serde(rename = $key, default)]
                pub $efield: $ety,
            )+
            $(
                #[allow(missing_docs)]
                #[serde(default)]
                pub $lfield: $lty,
            )*
            /// Creation timestamp as reported by the API
            #[serde(default)]
            pub created: String,
            /// Last remote edit timestamp
            #[serde(default)]
            pub edited: String,
            /// Canonical resource URL
            pub url: String,
        }

        #[doc = concat!("Editable fields of [`", stringify!($name), "`]")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $field {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl FieldTag for $field {
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn rule(self) -> Rule {
                match self {
                    $(Self::$variant => $rule,)+
                }
            }
        }

        impl fmt::Display for $field {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        #[doc = concat!("Local overrides for a [`", stringify!($name), "`]")]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $patch {
            $(
                #[allow(missing_docs)]
                #[serde(rename = $key, skip_serializing_if = "Option::is_none")]
                pub $efield: Option<$ety>,
            )+
        }

        impl Patch for $patch {
            type Field = $field;

            fn get(&self, field: $field) -> Option<String> {
                match field {
                    $($field::$variant => self.$efield.as_ref().map(ToString::to_string),)+
                }
            }

            fn set(&mut self, field: $field, raw: &str) -> Result<(), FieldError> {
                match field {
                    $(
                        $field::$variant => {
                            let value = raw.trim().parse::<$ety>().map_err(|_| FieldError::Invalid {
                                field: $key,
                                value: raw.to_string(),
                                expected: stringify!($ety),
                            })?;
                            self.$efield = Some(value);
                        }
                    )+
                }
                Ok(())
            }

            fn unset(&mut self, field: $field) {
                match field {
                    $($field::$variant => self.$efield = None,)+
                }
            }

            fn is_present(&self, field: $field) -> bool {
                match field {
                    $($field::$variant => self.$efield.as_ref().is_some_and(FieldValue::is_present),)+
                }
            }
        }

        impl Resource for $name {
            const KIND: EntityKind = EntityKind::$kind;
            type Field = $field;
            type Patch = $patch;

            fn url(&self) -> &str {
                &self.url
            }

            fn display_name(&self) -> &str {
                &self.$primary
            }

            fn value(&self, field: $field) -> String {
                match field {
                    $($field::$variant => self.$efield.to_string(),)+
                }
            }

            fn overlay(&mut self, patch: &$patch) {
                $(
                    if let Some(value) = patch.$efield.as_ref().filter(|v| FieldValue::is_present(*v)) {
                        self.$efield = value.clone();
                    }
                )+
            }
        }
    };
}

const GENDERS: &[&str] = &["male", "female", "hermaphrodite", "n/a", "none", "unknown"];

resource! {
    /// A person (`/people`)
    Character (Characters) {
        primary: name,
        fields: CharacterField,
        patch: CharacterPatch,
        editable {
            name ("name", "Name"): String = Rule::Text { min: 2, max: 50 } => Name,
            height ("height", "Height (cm)"): String = Rule::Measure => Height,
            mass ("mass", "Mass (kg)"): String = Rule::Measure => Mass,
            hair_color ("hair_color", "Hair Color"): String = Rule::Text { min: 2, max: 30 } => HairColor,
            skin_color ("skin_color", "Skin Color"): String = Rule::Text { min: 2, max: 30 } => SkinColor,
            eye_color ("eye_color", "Eye Color"): String = Rule::Text { min: 2, max: 30 } => EyeColor,
            birth_year ("birth_year", "Birth Year"): String = Rule::BirthYear => BirthYear,
            gender ("gender", "Gender"): String = Rule::OneOf(GENDERS) => Gender,
        }
        links {
            homeworld: String,
            films: Vec<String>,
            species: Vec<String>,
            vehicles: Vec<String>,
            starships: Vec<String>,
        }
    }
}

resource! {
    /// A film
    Film (Films) {
        primary: title,
        fields: FilmField,
        patch: FilmPatch,
        editable {
            title ("title", "Title"): String = Rule::Required => Title,
            episode_id ("episode_id", "Episode ID"): i64 = Rule::PositiveInt => EpisodeId,
            director ("director", "Director"): String = Rule::Required => Director,
            producer ("producer", "Producer"): String = Rule::Required => Producer,
            release_date ("release_date", "Release Date"): String = Rule::Date => ReleaseDate,
            opening_crawl ("opening_crawl", "Opening Crawl"): String = Rule::Optional => OpeningCrawl,
        }
        links {
            characters: Vec<String>,
            planets: Vec<String>,
            starships: Vec<String>,
            vehicles: Vec<String>,
            species: Vec<String>,
        }
    }
}

resource! {
    /// A planet
    Planet (Planets) {
        primary: name,
        fields: PlanetField,
        patch: PlanetPatch,
        editable {
            name ("name", "Name"): String = Rule::Required => Name,
            rotation_period ("rotation_period", "Rotation Period"): String = Rule::Required => RotationPeriod,
            orbital_period ("orbital_period", "Orbital Period"): String = Rule::Required => OrbitalPeriod,
            diameter ("diameter", "Diameter"): String = Rule::Required => Diameter,
            climate ("climate", "Climate"): String = Rule::Required => Climate,
            gravity ("gravity", "Gravity"): String = Rule::Required => Gravity,
            terrain ("terrain", "Terrain"): String = Rule::Required => Terrain,
            surface_water ("surface_water", "Surface Water"): String = Rule::Required => SurfaceWater,
            population ("population", "Population"): String = Rule::Required => Population,
        }
        links {
            residents: Vec<String>,
            films: Vec<String>,
        }
    }
}

resource! {
    /// A starship
    Starship (Starships) {
        primary: name,
        fields: StarshipField,
        patch: StarshipPatch,
        editable {
            name ("name", "Name"): String = Rule::Required => Name,
            model ("model", "Model"): String = Rule::Required => Model,
            manufacturer ("manufacturer", "Manufacturer"): String = Rule::Required => Manufacturer,
            cost_in_credits ("cost_in_credits", "Cost in Credits"): String = Rule::Required => CostInCredits,
            length ("length", "Length"): String = Rule::Required => Length,
            max_atmosphering_speed ("max_atmosphering_speed", "Max Atmosphering Speed"): String = Rule::Required => MaxAtmospheringSpeed,
            crew ("crew", "Crew"): String = Rule::Required => Crew,
            passengers ("passengers", "Passengers"): String = Rule::Required => Passengers,
            cargo_capacity ("cargo_capacity", "Cargo Capacity"): String = Rule::Required => CargoCapacity,
            consumables ("consumables", "Consumables"): String = Rule::Required => Consumables,
            hyperdrive_rating ("hyperdrive_rating", "Hyperdrive Rating"): String = Rule::Required => HyperdriveRating,
            mglt ("MGLT", "MGLT"): String = Rule::Required => Mglt,
            starship_class ("starship_class", "Starship Class"): String = Rule::Required => StarshipClass,
        }
        links {
            pilots: Vec<String>,
            films: Vec<String>,
        }
    }
}

resource! {
    /// A species
    Species (Species) {
        primary: name,
        fields: SpeciesField,
        patch: SpeciesPatch,
        editable {
            name ("name", "Name"): String = Rule::Required => Name,
            classification ("classification", "Classification"): String = Rule::Required => Classification,
            designation ("designation", "Designation"): String = Rule::Required => Designation,
            average_height ("average_height", "Average Height"): String = Rule::Required => AverageHeight,
            skin_colors ("skin_colors", "Skin Colors"): String = Rule::Required => SkinColors,
            hair_colors ("hair_colors", "Hair Colors"): String = Rule::Required => HairColors,
            eye_colors ("eye_colors", "Eye Colors"): String = Rule::Required => EyeColors,
            average_lifespan ("average_lifespan", "Average Lifespan"): String = Rule::Required => AverageLifespan,
            language ("language", "Language"): String = Rule::Required => Language,
        }
        links {
            homeworld: Option<String>,
            people: Vec<String>,
            films: Vec<String>,
        }
    }
}

resource! {
    /// A vehicle
    Vehicle (Vehicles) {
        primary: name,
        fields: VehicleField,
        patch: VehiclePatch,
        editable {
            name ("name", "Name"): String = Rule::Required => Name,
            model ("model", "Model"): String = Rule::Required => Model,
            manufacturer ("manufacturer", "Manufacturer"): String = Rule::Required => Manufacturer,
            cost_in_credits ("cost_in_credits", "Cost in Credits"): String = Rule::Required => CostInCredits,
            length ("length", "Length"): String = Rule::Required => Length,
            max_atmosphering_speed ("max_atmosphering_speed", "Max Atmosphering Speed"): String = Rule::Required => MaxAtmospheringSpeed,
            crew ("crew", "Crew"): String = Rule::Required => Crew,
            passengers ("passengers", "Passengers"): String = Rule::Required => Passengers,
            cargo_capacity ("cargo_capacity", "Cargo Capacity"): String = Rule::Required => CargoCapacity,
            consumables ("consumables", "Consumables"): String = Rule::Required => Consumables,
            vehicle_class ("vehicle_class", "Vehicle Class"): String = Rule::Required => VehicleClass,
        }
        links {
            pilots: Vec<String>,
            films: Vec<String>,
        }
    }
}

/// Run `$body` with `$r` bound to the resource type of `$kind`
#[macro_export]
macro_rules! with_resource {
    ($kind:expr, $r:ident => $body:expr) => {
        match $kind {
            $crate::resource::EntityKind::Characters => {
                type $r = $crate::resource::Character;
                $body
            }
            $crate::resource::EntityKind::Films => {
                type $r = $crate::resource::Film;
                $body
            }
            $crate::resource::EntityKind::Planets => {
                type $r = $crate::resource::Planet;
                $body
            }
            $crate::resource::EntityKind::Starships => {
                type $r = $crate::resource::Starship;
                $body
            }
            $crate::resource::EntityKind::Species => {
                type $r = $crate::resource::Species;
                $body
            }
            $crate::resource::EntityKind::Vehicles => {
                type $r = $crate::resource::Vehicle;
                $body
            }
        }
    };
}
