// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit form validation

use crate::resource::{FieldTag, Patch, Resource};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Constraint on one editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Anything, including empty
    Optional,
    /// Non-empty
    Required,
    /// Non-empty with a character count in `min..=max`
    Text {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },
    /// A number (digits, optional thousands separators and decimals), `unknown` or `n/a`
    Measure,
    /// `<digits>BBY`, `<digits>ABY`, `unknown` or `n/a`
    BirthYear,
    /// One of a fixed set of lowercase options
    OneOf(&'static [&'static str]),
    /// ISO calendar date `YYYY-MM-DD`
    Date,
    /// Integer >= 1
    PositiveInt,
}

impl Rule {
    /// Check a rendered value, returning a user-facing message on failure
    pub fn check(self, label: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return match self {
                Self::Optional => Ok(()),
                _ => Err(format!("{label} is required")),
            };
        }

        match self {
            Self::Optional | Self::Required => Ok(()),
            Self::Text { min, max } => {
                let len = value.chars().count();
                if (min..=max).contains(&len) {
                    Ok(())
                } else {
                    Err(format!("{label} must be between {min} and {max} characters"))
                }
            }
            Self::Measure => {
                if is_unknown(value) || is_number(value) {
                    Ok(())
                } else {
                    Err(format!("{label} must be a number, \"unknown\", or \"n/a\""))
                }
            }
            Self::BirthYear => {
                let era = value
                    .strip_suffix("BBY")
                    .or_else(|| value.strip_suffix("ABY"));
                let valid = is_unknown(value)
                    || era.is_some_and(|digits| {
                        is_number(digits) && !digits.contains(',')
                    });
                if valid {
                    Ok(())
                } else {
                    Err(format!(
                        "{label} format: \"19BBY\", \"112ABY\", \"unknown\", or \"n/a\""
                    ))
                }
            }
            Self::OneOf(options) => {
                if options.contains(&value.to_lowercase().as_str()) {
                    Ok(())
                } else {
                    Err(format!("{label} must be one of: {}", options.join(", ")))
                }
            }
            Self::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| format!("{label} must be a date (YYYY-MM-DD)")),
            Self::PositiveInt => match value.parse::<i64>() {
                Ok(n) if n >= 1 => Ok(()),
                _ => Err(format!("{label} must be a positive whole number")),
            },
        }
    }
}

fn is_unknown(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "unknown" | "n/a")
}

fn is_number(value: &str) -> bool {
    let mut parts = value.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit() || c == ',')
        && whole.starts_with(|c: char| c.is_ascii_digit())
        && fraction.map_or(true, |f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
}

/// One failed field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Field key
    pub field: &'static str,
    /// What is wrong
    pub message: String,
}

/// Every failed field of a patch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "invalid edit: {}", messages.join("; "))
    }
}

/// Validate every field a patch sets
pub fn validate<R: Resource>(patch: &R::Patch) -> Result<(), ValidationErrors> {
    let errors: Vec<ValidationError> = R::Field::ALL
        .iter()
        .filter_map(|field| {
            let value = patch.get(*field)?;
            field
                .rule()
                .check(field.label(), &value)
                .err()
                .map(|message| ValidationError {
                    field: field.key(),
                    message,
                })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Character, CharacterField, CharacterPatch, Film, FilmPatch};

    #[test]
    fn test_measure() {
        assert!(Rule::Measure.check("Height", "172").is_ok());
        assert!(Rule::Measure.check("Mass", "1,358").is_ok());
        assert!(Rule::Measure.check("Mass", "78.2").is_ok());
        assert!(Rule::Measure.check("Height", "unknown").is_ok());
        assert!(Rule::Measure.check("Height", "tall").is_err());
        assert!(Rule::Measure.check("Height", "1.").is_err());
    }

    #[test]
    fn test_birth_year() {
        assert!(Rule::BirthYear.check("Birth Year", "19BBY").is_ok());
        assert!(Rule::BirthYear.check("Birth Year", "112ABY").is_ok());
        assert!(Rule::BirthYear.check("Birth Year", "n/a").is_ok());
        assert!(Rule::BirthYear.check("Birth Year", "BBY").is_err());
        assert!(Rule::BirthYear.check("Birth Year", "1999").is_err());
    }

    #[test]
    fn test_required_and_optional() {
        assert_eq!(
            Rule::Required.check("Title", "  "),
            Err("Title is required".to_string())
        );
        assert!(Rule::Optional.check("Opening Crawl", "").is_ok());
    }

    #[test]
    fn test_date_and_int() {
        assert!(Rule::Date.check("Release Date", "1977-05-25").is_ok());
        assert!(Rule::Date.check("Release Date", "1977-13-25").is_err());
        assert!(Rule::PositiveInt.check("Episode ID", "4").is_ok());
        assert!(Rule::PositiveInt.check("Episode ID", "0").is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut patch = CharacterPatch::default();
        patch.set(CharacterField::Height, "tall").unwrap();
        patch.set(CharacterField::Gender, "droid").unwrap();
        patch.set(CharacterField::EyeColor, "green").unwrap();

        let errors = validate::<Character>(&patch).unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["height", "gender"]);
    }

    #[test]
    fn test_validate_ignores_unset_fields() {
        assert!(validate::<Film>(&FilmPatch::default()).is_ok());
    }
}
