use rand::Rng;
use std::sync::Arc;

/// A vector with an id and floating-point data.
/// The data is stored in an Arc for cheap cloning.
#[derive(Clone, Debug)]
pub struct Vector {
    pub id: u64,
    pub data: Arc<[f32]>,
}

impl Vector {
    /// Create a new vector with the given id and data.
    pub fn new(id: u64, data: Vec<f32>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    /// Create a random unit-normalized vector. Used by tests and fixtures.
    pub fn random(id: u64, dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let data: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self::new(id, l2_normalize(data))
    }

    /// Return the dimensionality of this vector.
    pub fn dim(&self) -> usize {
        self.data.len()
    }
}

/// Compute the Euclidean (L2) norm of a vector.
#[inline]
pub fn l2_norm(data: &[f32]) -> f32 {
    data.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit Euclidean norm.
///
/// The all-zero vector is returned unchanged (its direction is undefined).
pub fn l2_normalize(mut data: Vec<f32>) -> Vec<f32> {
    let norm = l2_norm(&data);
    if norm > 0.0 {
        for x in &mut data {
            *x /= norm;
        }
    }
    data
}
