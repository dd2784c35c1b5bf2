//! Metadata side-table with bitmap indices.
//!
//! The table maps vector ids to metadata mappings and can build roaring
//! bitmap indices over low-cardinality fields for efficient equality
//! filtering. Ids in this crate are dense and monotonic, so bitmap positions
//! are the ids themselves.

use super::filter::MetadataFilter;
use super::value::MetadataValue;
use super::Metadata;
use crate::error::{Result, TalentDbError};
use crate::persistence::{self, ArtifactType, Persistable};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Storage for vector metadata with optional bitmap indices.
#[derive(Default, Serialize, Deserialize)]
pub struct MetadataTable {
    /// Metadata for each vector: id -> (field -> value)
    data: HashMap<u64, Metadata>,

    /// Bitmap indices for indexed fields.
    /// Structure: field_name -> (value_hash -> bitmap of matching ids)
    #[serde(skip)]
    indices: HashMap<String, HashMap<u64, RoaringBitmap>>,

    /// Fields that have been indexed.
    #[serde(skip)]
    indexed_fields: Vec<String>,
}

impl MetadataTable {
    /// Create a new empty metadata table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vectors with metadata.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The next id to assign: `max(ids) + 1`, or 0 when empty.
    pub fn next_id(&self) -> u64 {
        self.data.keys().max().map_or(0, |max| max + 1)
    }

    /// Insert all metadata for a vector at once.
    ///
    /// Indexed fields are kept up to date incrementally.
    pub fn insert(&mut self, vector_id: u64, metadata: Metadata) {
        for field in &self.indexed_fields {
            if let Some(value) = metadata.get(field) {
                if let Some(field_index) = self.indices.get_mut(field) {
                    field_index
                        .entry(hash_value(value))
                        .or_default()
                        .insert(bitmap_position(vector_id));
                }
            }
        }
        self.data.insert(vector_id, metadata);
    }

    /// Get metadata for a vector.
    pub fn get(&self, vector_id: u64) -> Option<&Metadata> {
        self.data.get(&vector_id)
    }

    /// Get a specific field value for a vector.
    pub fn get_field(&self, vector_id: u64, field: &str) -> Option<&MetadataValue> {
        self.data.get(&vector_id).and_then(|m| m.get(field))
    }

    /// Build or rebuild the bitmap index for a field.
    ///
    /// This maps each distinct field value to the set of vector ids carrying
    /// it. Only worthwhile for low-cardinality fields.
    pub fn build_index(&mut self, field: &str) {
        let mut value_map: HashMap<u64, RoaringBitmap> = HashMap::new();

        for (&vector_id, metadata) in &self.data {
            if let Some(value) = metadata.get(field) {
                value_map
                    .entry(hash_value(value))
                    .or_default()
                    .insert(bitmap_position(vector_id));
            }
        }

        self.indices.insert(field.to_string(), value_map);

        if !self.indexed_fields.iter().any(|f| f == field) {
            self.indexed_fields.push(field.to_string());
        }
    }

    /// Check if a field has been indexed.
    pub fn is_indexed(&self, field: &str) -> bool {
        self.indices.contains_key(field)
    }

    /// Get the list of indexed fields.
    pub fn indexed_fields(&self) -> &[String] {
        &self.indexed_fields
    }

    /// Check if a vector id matches a filter.
    pub fn matches(&self, vector_id: u64, filter: &MetadataFilter) -> bool {
        self.data
            .get(&vector_id)
            .map(|m| filter.matches(m))
            .unwrap_or(false)
    }

    /// Get the ids matching a filter as a bitmap.
    ///
    /// Uses bitmap indices where available and falls back to scanning the
    /// table for unindexed fields.
    pub fn filter_bitmap(&self, filter: &MetadataFilter) -> RoaringBitmap {
        let mut result: Option<RoaringBitmap> = None;
        let mut unindexed: Vec<(&String, &MetadataValue)> = Vec::new();

        for (field, expected) in filter.iter() {
            match self.indices.get(field) {
                Some(field_index) => {
                    let bitmap = field_index
                        .get(&hash_value(expected))
                        .cloned()
                        .unwrap_or_default();
                    result = Some(match result {
                        Some(r) => r & bitmap,
                        None => bitmap,
                    });
                }
                None => unindexed.push((field, expected)),
            }
        }

        if unindexed.is_empty() {
            return match result {
                Some(r) => r,
                // Empty filter: every id matches.
                None => self.all_ids(),
            };
        }

        // Scan fallback for the unindexed criteria, intersected with any
        // index-derived bitmap.
        let mut scanned = RoaringBitmap::new();
        for (&vector_id, metadata) in &self.data {
            let ok = unindexed
                .iter()
                .all(|(field, expected)| metadata.get(*field) == Some(*expected));
            if ok {
                scanned.insert(bitmap_position(vector_id));
            }
        }

        match result {
            Some(r) => r & scanned,
            None => scanned,
        }
    }

    fn all_ids(&self) -> RoaringBitmap {
        self.data.keys().map(|&id| bitmap_position(id)).collect()
    }
}

impl Persistable for MetadataTable {
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        // JSON rather than bincode: metadata values are untagged variants,
        // which a non-self-describing format cannot round-trip.
        let payload = serde_json::to_vec(self)
            .map_err(|e| TalentDbError::serialization_error(e.to_string()))?;
        persistence::write_with_header(path, ArtifactType::MetadataTable, &payload)
    }

    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let payload = persistence::verify_header(&bytes, ArtifactType::MetadataTable)?;
        serde_json::from_slice(payload)
            .map_err(|e| TalentDbError::serialization_error(e.to_string()))
    }
}

/// Map a vector id to its bitmap position. Ids are assigned monotonically
/// from zero and never reused, so the id itself is the position.
///
/// # Panics
/// Panics if the id exceeds the bitmap's u32 range.
#[inline]
fn bitmap_position(vector_id: u64) -> u32 {
    assert!(
        vector_id <= u64::from(u32::MAX),
        "id {vector_id} exceeds bitmap range"
    );
    vector_id as u32
}

/// Hash a metadata value for bitmap indexing.
fn hash_value(value: &MetadataValue) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
