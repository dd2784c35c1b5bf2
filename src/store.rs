//! Persistent vector store: flat index plus metadata side-table.
//!
//! The store owns the similarity index, the id→metadata mapping, and the
//! monotonically increasing id counter that keeps the two aligned. Every
//! mutation persists both artifacts before returning; a missing or corrupt
//! persisted file is treated as an empty store rather than a fatal error.

use crate::error::Result;
use crate::index::{FlatIpIndex, VectorIndex};
use crate::metadata::{Metadata, MetadataFilter, MetadataTable};
use crate::persistence::Persistable;
use crate::types::VectorId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Locations of the two persisted artifacts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorePaths {
    /// Path of the serialized flat index.
    pub index_path: PathBuf,
    /// Path of the serialized metadata table.
    pub meta_path: PathBuf,
}

impl StorePaths {
    /// Conventional artifact names under a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            index_path: dir.join("vectors.tdb"),
            meta_path: dir.join("metadata.tdb"),
        }
    }
}

/// A search hit: vector id, similarity score, and the attached metadata.
///
/// Transient; hits are ordered by descending score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Id of the matched vector.
    pub id: VectorId,
    /// Inner-product similarity in [-1, 1] (practically [0, 1] for
    /// normalized text embeddings).
    pub score: f32,
    /// Metadata stored with the vector at ingestion time.
    pub metadata: Metadata,
}

/// Persistent store over a flat inner-product index and a metadata table.
pub struct VectorStore {
    index: FlatIpIndex,
    metadata: MetadataTable,
    next_id: u64,
    paths: StorePaths,
    default_k: usize,
}

impl VectorStore {
    /// Create an empty store that will persist to `paths`.
    pub fn new(paths: StorePaths, default_k: usize) -> Self {
        Self {
            index: FlatIpIndex::new(),
            metadata: MetadataTable::new(),
            next_id: 0,
            paths,
            default_k,
        }
    }

    /// Create a store and load any previously persisted state.
    ///
    /// Missing or unreadable artifacts leave the store empty; ingestion is
    /// idempotent from empty.
    pub fn open(paths: StorePaths, default_k: usize) -> Self {
        let mut store = Self::new(paths, default_k);
        store.load();
        store
    }

    /// Number of vectors in the store.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the store holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Dimensionality of stored vectors, once the first vector is added.
    pub fn dimension(&self) -> Option<usize> {
        self.index.dimension()
    }

    /// Metadata stored for a vector id.
    pub fn get_metadata(&self, id: VectorId) -> Option<&Metadata> {
        self.metadata.get(id.as_u64())
    }

    /// Build a bitmap index over a metadata field to speed up filtering.
    pub fn build_metadata_index(&mut self, field: &str) {
        self.metadata.build_index(field);
    }

    /// Add a single vector with its metadata. Returns the assigned id.
    ///
    /// Persists the index and the metadata table before returning.
    pub fn add(&mut self, embedding: &[f32], metadata: Metadata) -> Result<VectorId> {
        let ids = self.add_batch(&[embedding.to_vec()], vec![metadata])?;
        Ok(ids[0])
    }

    /// Add many vectors, one metadata mapping per vector, in input order.
    /// Returns the assigned ids (monotonic, never reused).
    ///
    /// Dimensions are validated against the index before any mutation, so a
    /// mismatch leaves the store unmodified. Persists before returning.
    pub fn add_batch(
        &mut self,
        embeddings: &[Vec<f32>],
        metadata: Vec<Metadata>,
    ) -> Result<Vec<VectorId>> {
        if embeddings.len() != metadata.len() {
            return Err(crate::error::TalentDbError::invalid_parameter(format!(
                "got {} embeddings but {} metadata mappings",
                embeddings.len(),
                metadata.len()
            )));
        }

        self.validate_dimensions(embeddings)?;

        let mut ids = Vec::with_capacity(embeddings.len());
        for (embedding, meta) in embeddings.iter().zip(metadata) {
            let id = self.next_id;
            // Cannot fail: dimensions were validated upfront.
            self.index.add(id, embedding)?;
            self.metadata.insert(id, meta);
            self.next_id += 1;
            ids.push(VectorId::new(id));
        }

        self.persist()?;
        Ok(ids)
    }

    /// Add many vectors sharing one metadata mapping.
    pub fn add_batch_shared(
        &mut self,
        embeddings: &[Vec<f32>],
        metadata: &Metadata,
    ) -> Result<Vec<VectorId>> {
        let per_vector = vec![metadata.clone(); embeddings.len()];
        self.add_batch(embeddings, per_vector)
    }

    fn validate_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        let mut expected = self.index.dimension();
        for embedding in embeddings {
            match expected {
                None => expected = Some(embedding.len()),
                Some(dim) if dim != embedding.len() => {
                    return Err(crate::error::TalentDbError::dimension_mismatch(
                        dim,
                        embedding.len(),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Search for the `k` nearest vectors, unfiltered.
    ///
    /// Returns at most `k` hits in descending score order (ties broken by
    /// ascending id); empty when the store is empty.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        self.index
            .search(query, k)
            .into_iter()
            .map(|r| SearchHit {
                id: r.id,
                score: r.score,
                metadata: self.metadata.get(r.id.as_u64()).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Search with the store's configured default result count.
    pub fn search_default(&self, query: &[f32]) -> Vec<SearchHit> {
        self.search(query, self.default_k)
    }

    /// Search for the `k` nearest vectors, keeping only hits whose metadata
    /// matches every criterion of `filter` exactly.
    ///
    /// Returns however many of the `k` neighbors survive the filter,
    /// possibly zero. The unfiltered retry is a distinct call ([`search`]);
    /// no hidden fallback happens here.
    ///
    /// [`search`]: VectorStore::search
    pub fn search_with_filters(
        &self,
        query: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Vec<SearchHit> {
        if filter.is_empty() {
            return self.search(query, k);
        }

        let matching = self.metadata.filter_bitmap(filter);
        self.index
            .search(query, k)
            .into_iter()
            .filter(|r| matching.contains(r.id.as_u64() as u32))
            .map(|r| SearchHit {
                id: r.id,
                score: r.score,
                metadata: self.metadata.get(r.id.as_u64()).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Persist both artifacts to their configured paths.
    ///
    /// The two files are written sequentially with no write-ahead log: a
    /// crash between the index write and the metadata write can leave them
    /// desynchronized. Callers needing strict durability must verify record
    /// counts externally. A full rewrite of both files happens on every
    /// mutation, which is the dominant scalability bottleneck of this store.
    pub fn persist(&self) -> Result<()> {
        if let Some(dir) = self.paths.index_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        if let Some(dir) = self.paths.meta_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        self.index.save(&self.paths.index_path)?;
        self.metadata.save(&self.paths.meta_path)?;
        debug!(entries = self.len(), "persisted store artifacts");
        Ok(())
    }

    /// Load both artifacts from their configured paths.
    ///
    /// A missing or unreadable file resets the store to the empty state
    /// rather than failing: availability is traded for silent data loss,
    /// and ingestion is expected to be re-runnable from the source data.
    pub fn load(&mut self) {
        let index = FlatIpIndex::load(&self.paths.index_path);
        let metadata = MetadataTable::load(&self.paths.meta_path);

        match (index, metadata) {
            (Ok(index), Ok(metadata)) => {
                self.next_id = metadata.next_id();
                self.index = index;
                self.metadata = metadata;
                debug!(entries = self.len(), "loaded store artifacts");
            }
            (index, metadata) => {
                if let Err(e) = &index {
                    warn!(path = %self.paths.index_path.display(), error = %e,
                        "index artifact unavailable, resetting store to empty");
                }
                if let Err(e) = &metadata {
                    warn!(path = %self.paths.meta_path.display(), error = %e,
                        "metadata artifact unavailable, resetting store to empty");
                }
                self.index = FlatIpIndex::new();
                self.metadata = MetadataTable::new();
                self.next_id = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TalentDbError;
    use crate::metadata::MetadataValue;

    fn temp_store() -> (tempfile::TempDir, VectorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(StorePaths::in_dir(dir.path()), 5);
        (dir, store)
    }

    fn meta(pairs: &[(&str, MetadataValue)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let (_dir, mut store) = temp_store();

        for i in 0..5u64 {
            let id = store
                .add(&[i as f32, 1.0], meta(&[("idx", (i as i64).into())]))
                .unwrap();
            assert_eq!(id.as_u64(), i);
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_search_default_uses_configured_k() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::new(StorePaths::in_dir(dir.path()), 3);

        for i in 0..8u64 {
            store
                .add(&[i as f32 * 0.1, 1.0], meta(&[("idx", (i as i64).into())]))
                .unwrap();
        }

        assert_eq!(store.search_default(&[0.0, 1.0]).len(), 3);
    }

    #[test]
    fn test_add_batch_shared_metadata() {
        let (_dir, mut store) = temp_store();
        let shared = meta(&[("cidade", "Recife".into())]);

        let ids = store
            .add_batch_shared(&[vec![1.0, 0.0], vec![0.0, 1.0]], &shared)
            .unwrap();
        assert_eq!(ids.len(), 2);
        for id in ids {
            assert_eq!(store.get_metadata(id), Some(&shared));
        }
    }

    #[test]
    fn test_empty_store_search_returns_nothing() {
        let (_dir, store) = temp_store();
        assert!(store.search(&[1.0, 0.0], 10).is_empty());
    }

    #[test]
    fn test_dimension_mismatch_leaves_store_unmodified() {
        let (_dir, mut store) = temp_store();
        store.add(&[1.0, 0.0, 0.0], Metadata::new()).unwrap();

        let err = store
            .add_batch(
                &[vec![0.0, 1.0, 0.0], vec![0.5, 0.5]],
                vec![Metadata::new(), Metadata::new()],
            )
            .unwrap_err();
        assert!(matches!(err, TalentDbError::DimensionMismatch { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_search_nearest_first() {
        let (_dir, mut store) = temp_store();
        store
            .add(&[1.0, 0.0], meta(&[("nome", "Alice".into())]))
            .unwrap();
        store
            .add(&[0.0, 1.0], meta(&[("nome", "Bob".into())]))
            .unwrap();

        let hits = store.search(&[0.9, 0.1], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id.as_u64(), 0);
        assert_eq!(
            hits[0].metadata.get("nome"),
            Some(&MetadataValue::String("Alice".into()))
        );
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_filtered_search_excludes_non_matching() {
        let (_dir, mut store) = temp_store();
        store
            .add(&[1.0, 0.0], meta(&[("nivel_profissional", "Senior".into())]))
            .unwrap();
        store
            .add(&[0.99, 0.141], meta(&[("nivel_profissional", "Junior".into())]))
            .unwrap();

        let filter = MetadataFilter::new().with("nivel_profissional", "Senior");
        let hits = store.search_with_filters(&[1.0, 0.0], 2, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_u64(), 0);
    }

    #[test]
    fn test_filtered_search_may_return_empty() {
        let (_dir, mut store) = temp_store();
        store
            .add(&[1.0, 0.0], meta(&[("nivel_profissional", "Junior".into())]))
            .unwrap();

        let filter = MetadataFilter::new().with("nivel_profissional", "Senior");
        assert!(store.search_with_filters(&[1.0, 0.0], 5, &filter).is_empty());
    }

    #[test]
    fn test_reload_roundtrip_reproduces_results() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::in_dir(dir.path());

        let mut store = VectorStore::new(paths.clone(), 5);
        for i in 0..5u64 {
            let angle = i as f32 * 0.3;
            store
                .add(
                    &[angle.cos(), angle.sin()],
                    meta(&[("idx", (i as i64).into())]),
                )
                .unwrap();
        }
        let before = store.search(&[1.0, 0.0], 5);

        let reloaded = VectorStore::open(paths, 5);
        assert_eq!(reloaded.len(), 5);
        let after = reloaded.search(&[1.0, 0.0], 5);

        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.id, a.id);
            assert!((b.score - a.score).abs() < 1e-6);
        }

        // next_id resumes past the highest persisted id.
        let mut reloaded = reloaded;
        let id = reloaded.add(&[0.0, 1.0], Metadata::new()).unwrap();
        assert_eq!(id.as_u64(), 5);
    }

    #[test]
    fn test_corrupt_artifact_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::in_dir(dir.path());

        let mut store = VectorStore::new(paths.clone(), 5);
        store.add(&[1.0, 0.0], Metadata::new()).unwrap();

        std::fs::write(&paths.index_path, b"garbage").unwrap();

        let store = VectorStore::open(paths, 5);
        assert!(store.is_empty());
        assert!(store.search(&[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_missing_artifacts_open_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open(StorePaths::in_dir(dir.path()), 5);
        assert!(store.is_empty());
    }
}
