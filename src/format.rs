// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Display formatting of attribute values

use crate::resource::EntityKind;

/// `n/a` and `unknown` read as "Unknown"; blank reads as "-"
#[must_use]
pub fn format_attribute(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "-".to_string();
    }
    match trimmed.to_lowercase().as_str() {
        "n/a" | "unknown" => "Unknown".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Unit suffix for a field, if it has one
#[must_use]
pub fn unit_for(kind: EntityKind, key: &str) -> Option<&'static str> {
    match (kind, key) {
        (EntityKind::Characters, "height") => Some("cm"),
        (EntityKind::Characters, "mass") => Some("kg"),
        (EntityKind::Planets, "rotation_period") => Some("hours"),
        (EntityKind::Planets, "orbital_period") => Some("days"),
        (EntityKind::Planets, "diameter") => Some("km"),
        (EntityKind::Planets, "surface_water") => Some("%"),
        (EntityKind::Starships | EntityKind::Vehicles, "length") => Some("m"),
        _ => None,
    }
}

/// Attribute with its unit, unless it is unknown
#[must_use]
pub fn format_field(kind: EntityKind, key: &str, value: &str) -> String {
    let formatted = format_attribute(value);
    match unit_for(kind, key) {
        Some(unit) if formatted != "Unknown" && formatted != "-" => format!("{formatted} {unit}"),
        _ => formatted,
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_attribute() {
        assert_eq!(format_attribute("n/a"), "Unknown");
        assert_eq!(format_attribute("unknown"), "Unknown");
        assert_eq!(format_attribute("blue"), "blue");
        assert_eq!(format_attribute(" "), "-");
    }

    #[test]
    fn test_format_field_units() {
        assert_eq!(format_field(EntityKind::Characters, "height", "172"), "172 cm");
        assert_eq!(format_field(EntityKind::Characters, "mass", "unknown"), "Unknown");
        assert_eq!(format_field(EntityKind::Films, "director", "George Lucas"), "George Lucas");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("It is a period\r\nof civil war.", 8), "It is a...");
    }
}
