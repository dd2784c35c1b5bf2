//! Text embedding providers.
//!
//! An embedding provider turns text into fixed-dimension, L2-normalized
//! vectors so that inner product equals cosine similarity. Providers are
//! stateless given their model state: the same text always embeds to the
//! same vector, and batch embedding preserves input order.

use crate::constants::embedding::DEFAULT_DIM;
use crate::error::{Result, TalentDbError};
use crate::vector::l2_normalize;
use rayon::prelude::*;

/// Contract for turning text into unit-normalized embedding vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. The output has length [`dimension`] and unit
    /// Euclidean norm (the degenerate all-zero vector is returned for text
    /// with no tokens).
    ///
    /// [`dimension`]: EmbeddingProvider::dimension
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, one vector per text, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Fixed output dimensionality of this provider.
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hashing embedder.
///
/// Tokenizes on non-alphanumeric boundaries, lowercases, and accumulates a
/// signed FNV-1a hash of each token into one of `dim` buckets (the hashing
/// trick), then L2-normalizes. No model download, no external runtime, and
/// identical text always embeds to the identical vector.
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl HashEmbedder {
    /// Create an embedder with the given output dimensionality.
    ///
    /// # Errors
    /// Fails with `InvalidParameter` if `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(TalentDbError::invalid_parameter(
                "embedding dimension must be positive",
            ));
        }
        Ok(Self { dim })
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut acc = vec![0.0f32; self.dim];

        for token in tokenize(text) {
            let hash = fnv1a_hash(token.as_bytes());
            let bucket = (hash % self.dim as u64) as usize;
            // One hash bit decides the sign so colliding tokens partially
            // cancel instead of always reinforcing.
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            acc[bucket] += sign;
        }

        Ok(l2_normalize(acc))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.par_iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Resolve an embedding model name into a provider.
///
/// Supported names: `hash` (default dimension) and `hash-<dim>`.
///
/// # Errors
/// Fails with a configuration error for unknown model names, so a
/// misconfigured deployment stops at startup rather than at query time.
pub fn build_embedder(name: &str) -> Result<Box<dyn EmbeddingProvider>> {
    if name == "hash" {
        return Ok(Box::new(HashEmbedder::default()));
    }

    if let Some(dim_str) = name.strip_prefix("hash-") {
        let dim: usize = dim_str.parse().map_err(|_| {
            TalentDbError::configuration(format!("invalid embedding dimension in '{name}'"))
        })?;
        return Ok(Box::new(HashEmbedder::new(dim)?));
    }

    Err(TalentDbError::configuration(format!(
        "unknown embedding model '{name}'"
    )))
}

/// Lowercased alphanumeric token runs.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

pub(crate) fn fnv1a_hash(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3_u64);
    }
    hash
}
