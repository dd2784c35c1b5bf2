//! Core newtypes for type-safe store operations.
//!
//! These types provide compile-time guarantees that prevent mixing up
//! related but semantically different values (e.g., vector ids vs row
//! positions in the candidate table).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a vector in the store.
///
/// Ids are assigned monotonically at insertion time (0, 1, 2, ...) and are
/// never reused, which keeps the index and the metadata side-table aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VectorId(pub u64);

impl VectorId {
    /// Create a new VectorId.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VectorId({})", self.0)
    }
}

impl From<u64> for VectorId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<VectorId> for u64 {
    #[inline]
    fn from(id: VectorId) -> Self {
        id.0
    }
}
