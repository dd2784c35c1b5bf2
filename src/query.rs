//! Filter extraction from free-text queries.
//!
//! Derives structured filter criteria from a job description by
//! case-insensitive substring matching against fixed keyword lists. For
//! single-valued categories (seniority, academic level, city) the first
//! matching keyword in the category's declared enumeration order wins, even
//! if several keywords are textually present; the matched value itself
//! becomes the filter key with flag 1, matching the one-hot metadata schema.
//! Language mentions set the language field itself to 1; absence leaves the
//! key unset, never an explicit 0.

use crate::metadata::transform::{ACADEMIC_LEVELS, CITIES, LANGUAGE_FIELDS, PROFESSIONAL_LEVELS};
use crate::metadata::{MetadataValue, QueryFilter};

/// Keywords whose presence marks an English-proficiency requirement.
const ENGLISH_KEYWORDS: [&str; 1] = ["ingles"];
/// Keywords whose presence marks a Spanish-proficiency requirement.
const SPANISH_KEYWORDS: [&str; 1] = ["espanhol"];

/// Derive filter criteria from a free-text query.
///
/// Returns an empty mapping when nothing matches; never fails.
pub fn extract_filters(text: &str) -> QueryFilter {
    let lowered = text.to_lowercase();
    let mut filters = QueryFilter::new();

    for category in [
        PROFESSIONAL_LEVELS.as_slice(),
        ACADEMIC_LEVELS.as_slice(),
        CITIES.as_slice(),
    ] {
        if let Some(value) = first_match(&lowered, category) {
            filters.insert(value.to_string(), MetadataValue::Integer(1));
        }
    }

    let languages = [
        (LANGUAGE_FIELDS[0], ENGLISH_KEYWORDS.as_slice()),
        (LANGUAGE_FIELDS[1], SPANISH_KEYWORDS.as_slice()),
    ];
    for (field, keywords) in languages {
        if keywords.iter().any(|kw| lowered.contains(&kw.to_lowercase())) {
            filters.insert(field.to_string(), MetadataValue::Integer(1));
        }
    }

    filters
}

/// First keyword of `category` present in the lowercased text, in declared
/// enumeration order.
fn first_match<'a>(lowered_text: &str, category: &[&'a str]) -> Option<&'a str> {
    category
        .iter()
        .find(|value| lowered_text.contains(&value.to_lowercase()))
        .copied()
}
