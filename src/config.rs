//! Application configuration.
//!
//! Loaded from a YAML file; every field has a default so a partial file (or
//! no file at all) yields a working setup.

use crate::error::{Result, TalentDbError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
}

/// Embedding provider selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name understood by [`build_embedder`].
    ///
    /// [`build_embedder`]: crate::embedding::build_embedder
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "hash".to_string(),
        }
    }
}

/// Index persistence and query defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Path of the serialized vector index.
    pub index_path: PathBuf,
    /// Path of the serialized metadata table.
    pub meta_path: PathBuf,
    /// Default result count for callers that give no `k`.
    pub k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("data/vectors.tdb"),
            meta_path: PathBuf::from("data/metadata.tdb"),
            k: crate::constants::store::DEFAULT_K,
        }
    }
}

/// Retrieval pipeline defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of results returned.
    pub top_n: usize,
    /// Neighbor pool width fetched before filtering.
    pub search_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: crate::constants::retrieval::DEFAULT_TOP_N,
            search_k: crate::constants::retrieval::DEFAULT_SEARCH_K,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TalentDbError::configuration(format!("invalid config: {e}")))
    }
}
