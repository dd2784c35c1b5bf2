//! Shared application wiring.
//!
//! `AppContext` owns the embedding provider, the vector store, and the
//! candidate table, and is passed explicitly to anything that needs them.
//! The store sits behind a `RwLock` so retrieval can run concurrently while
//! ingestion takes exclusive access.

use crate::config::Config;
use crate::embedding::{build_embedder, EmbeddingProvider};
use crate::error::{Result, TalentDbError};
use crate::ingest;
use crate::metadata::QueryFilter;
use crate::retrieval::{self, CandidateMatch, CandidateTable, RetrievalParams};
use crate::store::{StorePaths, VectorStore};
use parking_lot::RwLock;

/// Explicitly wired dependencies of the retrieval application.
pub struct AppContext {
    embedder: Box<dyn EmbeddingProvider>,
    store: RwLock<VectorStore>,
    candidates: CandidateTable,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire a context from already-built parts.
    pub fn new(
        embedder: Box<dyn EmbeddingProvider>,
        store: VectorStore,
        candidates: CandidateTable,
    ) -> Self {
        Self {
            embedder,
            store: RwLock::new(store),
            candidates,
        }
    }

    /// Wire a context from configuration, opening any persisted store state.
    ///
    /// # Errors
    /// Fails with a configuration error when the model name is unknown, or
    /// when the persisted store holds vectors of a different dimensionality
    /// than the configured embedder produces. Catching the mismatch here
    /// stops a misconfigured deployment at startup instead of at the first
    /// query.
    pub fn from_config(config: &Config, candidates: CandidateTable) -> Result<Self> {
        let embedder = build_embedder(&config.embedding.model)?;
        let store = VectorStore::open(
            StorePaths {
                index_path: config.index.index_path.clone(),
                meta_path: config.index.meta_path.clone(),
            },
            config.index.k,
        );

        if let Some(dim) = store.dimension() {
            if dim != embedder.dimension() {
                return Err(TalentDbError::configuration(format!(
                    "embedding model '{}' produces {}-dim vectors but the persisted store holds {}-dim vectors",
                    config.embedding.model,
                    embedder.dimension(),
                    dim
                )));
            }
        }

        Ok(Self::new(embedder, store, candidates))
    }

    /// The embedding provider.
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// The vector store, behind its lock.
    pub fn store(&self) -> &RwLock<VectorStore> {
        &self.store
    }

    /// The candidate table.
    pub fn candidates(&self) -> &CandidateTable {
        &self.candidates
    }

    /// Ingest the candidate table into the store (exclusive access).
    pub fn ingest(&self) -> Result<usize> {
        let mut store = self.store.write();
        ingest::ingest_candidates(&mut store, self.embedder.as_ref(), &self.candidates)
    }

    /// Filtered retrieval under a read lock.
    ///
    /// See [`retrieval::find_top_applicants`] for the filter semantics.
    pub fn find_top_applicants(
        &self,
        query_text: &str,
        explicit_filters: Option<&QueryFilter>,
        params: RetrievalParams,
    ) -> Result<Vec<CandidateMatch>> {
        let store = self.store.read();
        retrieval::find_top_applicants(
            query_text,
            &store,
            self.embedder.as_ref(),
            &self.candidates,
            explicit_filters,
            params,
        )
    }

    /// Unfiltered retrieval under a read lock.
    pub fn find_top_applicants_unfiltered(
        &self,
        query_text: &str,
        params: RetrievalParams,
    ) -> Result<Vec<CandidateMatch>> {
        let store = self.store.read();
        retrieval::find_top_applicants_unfiltered(
            query_text,
            &store,
            self.embedder.as_ref(),
            &self.candidates,
            params,
        )
    }
}
