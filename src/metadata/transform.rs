//! Metadata normalization.
//!
//! Raw candidate metadata carries free-form categorical fields. `normalize`
//! expands each known categorical field into a one-hot representation over a
//! fixed, closed enumeration of category values, and collapses language
//! proficiency fields to a 1/0 presence flag. The function is pure and
//! idempotent: normalizing already-normalized metadata is a no-op.

use super::value::MetadataValue;
use super::Metadata;

/// Professional seniority levels, in declared enumeration order.
pub const PROFESSIONAL_LEVELS: [&str; 3] = ["Junior", "Pleno", "Senior"];

/// Academic levels, in declared enumeration order.
pub const ACADEMIC_LEVELS: [&str; 5] = [
    "Ensino Médio",
    "Graduação",
    "Pós-Graduação",
    "Mestrado",
    "Doutorado",
];

/// Known cities, in declared enumeration order.
pub const CITIES: [&str; 10] = [
    "São Paulo",
    "Rio de Janeiro",
    "Belo Horizonte",
    "Curitiba",
    "Porto Alegre",
    "Salvador",
    "Brasília",
    "Fortaleza",
    "Recife",
    "Manaus",
];

/// Metadata field holding the professional level.
pub const FIELD_PROFESSIONAL: &str = "nivel_profissional";
/// Metadata field holding the academic level.
pub const FIELD_ACADEMIC: &str = "nivel_academico";
/// Metadata field holding the city.
pub const FIELD_CITY: &str = "cidade";
/// Language proficiency fields collapsed to presence flags.
pub const LANGUAGE_FIELDS: [&str; 2] = ["nivel_ingles", "nivel_espanhol"];

/// Normalize raw metadata into the fixed derived-attribute schema.
///
/// For each categorical field present in the input, one-hot flags are added
/// for every value of the field's closed enumeration (1 for the matching
/// category, 0 for the rest; all 0 for unknown values). The original field
/// is kept as-is so exact-equality filters on it still work. Language fields
/// are replaced with 1 if the original value is present (non-null, non-empty,
/// truthy) else 0. Fields absent from the input are left untouched.
pub fn normalize(metadata: &Metadata) -> Metadata {
    let mut out = metadata.clone();

    expand_one_hot(&mut out, FIELD_PROFESSIONAL, &PROFESSIONAL_LEVELS);
    expand_one_hot(&mut out, FIELD_ACADEMIC, &ACADEMIC_LEVELS);
    expand_one_hot(&mut out, FIELD_CITY, &CITIES);

    for field in LANGUAGE_FIELDS {
        if let Some(value) = out.get(field) {
            let flag = i64::from(value.is_truthy());
            out.insert(field.to_string(), MetadataValue::Integer(flag));
        }
    }

    out
}

fn expand_one_hot(metadata: &mut Metadata, field: &str, categories: &[&str]) {
    let Some(value) = metadata.get(field) else {
        return;
    };

    let current = value.as_str().map(|s| s.to_lowercase());
    for category in categories {
        let hit = current.as_deref() == Some(category.to_lowercase().as_str());
        metadata.insert(category.to_string(), MetadataValue::Integer(i64::from(hit)));
    }
}
