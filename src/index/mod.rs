//! Vector index implementations.

mod flat;

pub use flat::FlatIpIndex;

use crate::types::VectorId;

/// A search result containing a vector id and its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// The id of the matched vector.
    pub id: VectorId,
    /// Inner-product similarity to the query (equals cosine similarity for
    /// unit-normalized vectors).
    pub score: f32,
}

impl SearchResult {
    /// Create a new SearchResult.
    #[inline]
    pub fn new(id: impl Into<VectorId>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Common interface for similarity indexes.
///
/// The store is written against this seam so the flat exact index can be
/// swapped for an approximate structure without touching callers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Search must be safe to call from
/// multiple threads; mutation requires external exclusion.
pub trait VectorIndex: Send + Sync {
    /// Search for the k most similar vectors to the query.
    ///
    /// Returns results in descending score order, ties broken by ascending
    /// id (first inserted wins).
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchResult>;

    /// Return the number of vectors in the index.
    fn len(&self) -> usize;

    /// Return true if the index contains no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the dimensionality of vectors in this index, if initialized.
    fn dimension(&self) -> Option<usize>;
}
