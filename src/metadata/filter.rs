//! Exact-match metadata filters.
//!
//! A filter is a conjunction of field → expected-value equalities. A vector
//! matches only if every listed field is present in its metadata and equal
//! to the expected value. There is no partial or fuzzy matching.

use super::value::MetadataValue;
use super::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Filter criteria derived from a free-text query.
///
/// Keys are either one-hot category names (e.g. `"Senior"`, `"São Paulo"`)
/// or language-flag field names (`"nivel_ingles"`, `"nivel_espanhol"`),
/// mapped to flag values. Transient: recomputed per query, never persisted.
pub type QueryFilter = HashMap<String, MetadataValue>;

/// A conjunction of exact field equalities evaluated against vector metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    criteria: HashMap<String, MetadataValue>,
}

impl MetadataFilter {
    /// Create an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality criterion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.criteria.insert(field.into(), value.into());
        self
    }

    /// Number of criteria in this filter.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// True if the filter has no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Iterate over the (field, expected value) criteria.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.criteria.iter()
    }

    /// Evaluate this filter against a metadata mapping.
    ///
    /// Every criterion must match exactly; a missing field is a non-match.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.criteria
            .iter()
            .all(|(field, expected)| metadata.get(field) == Some(expected))
    }
}

impl From<QueryFilter> for MetadataFilter {
    fn from(criteria: QueryFilter) -> Self {
        Self { criteria }
    }
}

impl From<&QueryFilter> for MetadataFilter {
    fn from(criteria: &QueryFilter) -> Self {
        Self {
            criteria: criteria.clone(),
        }
    }
}

impl FromIterator<(String, MetadataValue)> for MetadataFilter {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Self {
            criteria: iter.into_iter().collect(),
        }
    }
}
