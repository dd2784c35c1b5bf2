//! Flat inner-product index for exact nearest-neighbor search.
//!
//! Computes the inner product against every stored vector and returns the k
//! highest-scoring entries. With unit-normalized embeddings this ranks by
//! cosine similarity. Exact by construction: 100% recall at O(n) search
//! cost, which is the reference behavior for this store.

use super::{SearchResult, VectorIndex};
use crate::constants::index::{PARALLEL_THRESHOLD, SCAN_CHUNK_SIZE};
use crate::distance::dot_product;
use crate::error::{Result, TalentDbError};
use crate::persistence::{self, ArtifactType, Persistable};
use crate::vector::Vector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

/// A vector id with its computed score, used for heap operations.
#[derive(Clone, Copy)]
struct ScoredVector {
    id: u64,
    score: f32,
}

impl PartialEq for ScoredVector {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredVector {}

impl PartialOrd for ScoredVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredVector {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; ordering is inverted so peek() gives the
        // worst retained hit: lowest score first, and among equal scores the
        // largest id, so the earliest insertion survives eviction.
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Exact inner-product flat index.
///
/// Dimensionality is fixed lazily by the first vector added; subsequent
/// vectors of a different length are rejected.
#[derive(Default)]
pub struct FlatIpIndex {
    entries: Vec<Vector>,
    dim: Option<usize>,
}

/// Serialized form of [`FlatIpIndex`].
#[derive(Serialize, Deserialize)]
struct FlatIndexData {
    dim: Option<usize>,
    ids: Vec<u64>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vector to the index.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the vector's length differs from the
    /// index dimension; the index is left unmodified.
    pub fn add(&mut self, id: u64, data: &[f32]) -> Result<()> {
        match self.dim {
            None => self.dim = Some(data.len()),
            Some(dim) if dim != data.len() => {
                return Err(TalentDbError::dimension_mismatch(dim, data.len()));
            }
            Some(_) => {}
        }

        self.entries.push(Vector::new(id, data.to_vec()));
        Ok(())
    }

    /// Search for the k highest-scoring vectors using a sequential scan.
    fn search_sequential(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let mut heap: BinaryHeap<ScoredVector> = BinaryHeap::with_capacity(k);

        for vector in &self.entries {
            let candidate = ScoredVector {
                id: vector.id,
                score: dot_product(query, &vector.data),
            };
            push_candidate(&mut heap, candidate, k);
        }

        into_sorted_results(heap)
    }

    /// Parallel scan for larger indexes: chunked heaps merged pairwise.
    fn search_parallel(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let final_heap = self
            .entries
            .par_chunks(SCAN_CHUNK_SIZE)
            .map(|chunk| {
                let mut local_heap: BinaryHeap<ScoredVector> = BinaryHeap::with_capacity(k);
                for vector in chunk {
                    let candidate = ScoredVector {
                        id: vector.id,
                        score: dot_product(query, &vector.data),
                    };
                    push_candidate(&mut local_heap, candidate, k);
                }
                local_heap
            })
            .reduce(
                || BinaryHeap::with_capacity(k),
                |mut a, b| {
                    for item in b {
                        push_candidate(&mut a, item, k);
                    }
                    a
                },
            );

        into_sorted_results(final_heap)
    }
}

fn push_candidate(heap: &mut BinaryHeap<ScoredVector>, candidate: ScoredVector, k: usize) {
    if heap.len() < k {
        heap.push(candidate);
    } else if let Some(&worst) = heap.peek() {
        if candidate.cmp(&worst) == Ordering::Less {
            heap.pop();
            heap.push(candidate);
        }
    }
}

fn into_sorted_results(heap: BinaryHeap<ScoredVector>) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = heap
        .into_iter()
        .map(|sv| SearchResult::new(sv.id, sv.score))
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    results
}

impl VectorIndex for FlatIpIndex {
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        if self.entries.len() >= PARALLEL_THRESHOLD {
            self.search_parallel(query, k)
        } else {
            self.search_sequential(query, k)
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dim
    }
}

impl Persistable for FlatIpIndex {
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = FlatIndexData {
            dim: self.dim,
            ids: self.entries.iter().map(|v| v.id).collect(),
            vectors: self.entries.iter().map(|v| v.data.to_vec()).collect(),
        };
        let payload = bincode::serialize(&data)?;
        persistence::write_with_header(path, ArtifactType::FlatIndex, &payload)
    }

    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let payload = persistence::verify_header(&bytes, ArtifactType::FlatIndex)?;
        let data: FlatIndexData = bincode::deserialize(payload)?;

        let entries = data
            .ids
            .into_iter()
            .zip(data.vectors)
            .map(|(id, v)| Vector::new(id, v))
            .collect();

        Ok(Self {
            entries,
            dim: data.dim,
        })
    }
}
