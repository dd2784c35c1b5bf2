//! Scalar distance and similarity kernels.
//!
//! Embeddings in this crate are unit-normalized, so the inner product of two
//! embeddings equals their cosine similarity. The flat index ranks neighbors
//! by inner product descending.

/// Compute the dot product of two vectors.
///
/// Returns sum(a[i] * b[i])
///
/// # Panics
/// Panics if the vectors have different dimensions.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
