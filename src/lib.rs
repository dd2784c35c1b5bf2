//! talent-db: semantic applicant retrieval over a persistent vector store.
//!
//! This crate embeds job descriptions and candidate résumés into a shared
//! vector space, indexes the candidates in a flat inner-product index with a
//! metadata side-table, and retrieves the best-matching applicants for a
//! query, optionally pruned by filters derived from the query text itself.
//!
//! # Features
//!
//! - **Deterministic embeddings**: feature-hashing text embedder, no model
//!   downloads or external runtimes
//! - **Exact search**: brute-force inner-product scan with parallel scaling
//!   via Rayon
//! - **Metadata filtering**: exact-match filters with roaring bitmap indices
//! - **Checksummed persistence**: index and metadata survive restarts and
//!   fail safe to empty on corruption
//! - **Conversational façade**: a chat-style front end that turns a job
//!   description into a ranked applicant list
//!
//! # Example
//!
//! ```
//! use talent_db::{HashEmbedder, StorePaths, VectorStore};
//! use talent_db::embedding::EmbeddingProvider;
//! use talent_db::metadata::Metadata;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = VectorStore::new(StorePaths::in_dir(dir.path()), 5);
//! let embedder = HashEmbedder::new(64).unwrap();
//!
//! let mut meta = Metadata::new();
//! meta.insert("idx".into(), 0.into());
//! let embedding = embedder.embed("senior python engineer").unwrap();
//! store.add(&embedding, meta).unwrap();
//!
//! let query = embedder.embed("python engineer").unwrap();
//! let hits = store.search(&query, 1);
//! assert_eq!(hits[0].id.as_u64(), 0);
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod metadata;
pub mod persistence;
pub mod query;
pub mod recruiter;
pub mod retrieval;
pub mod store;
pub mod types;
pub mod vector;

// Re-export commonly used types at crate root
pub use config::Config;
pub use context::AppContext;
pub use embedding::{build_embedder, EmbeddingProvider, HashEmbedder};
pub use error::{Result, TalentDbError};
pub use index::{FlatIpIndex, SearchResult, VectorIndex};
pub use metadata::{Metadata, MetadataFilter, MetadataValue, QueryFilter};
pub use query::extract_filters;
pub use recruiter::RecruiterBot;
pub use retrieval::{
    find_top_applicants, find_top_applicants_unfiltered, CandidateMatch, CandidateRecord,
    CandidateTable, RetrievalParams,
};
pub use store::{SearchHit, StorePaths, VectorStore};
pub use types::VectorId;
pub use vector::Vector;
