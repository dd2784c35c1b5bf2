//! Metadata attached to indexed vectors.
//!
//! This module provides the metadata value type, the exact-match filter,
//! the id-keyed side-table with bitmap indices, and the normalization
//! transform that expands categorical fields into one-hot attributes.
//!
//! # Example
//!
//! ```
//! use talent_db::metadata::{Metadata, MetadataFilter, MetadataValue, transform};
//!
//! let mut raw = Metadata::new();
//! raw.insert("nivel_profissional".into(), "Senior".into());
//! let normalized = transform::normalize(&raw);
//!
//! let filter = MetadataFilter::new().with("Senior", 1);
//! assert!(filter.matches(&normalized));
//! ```

mod filter;
mod table;
pub mod transform;
mod value;

pub use filter::{MetadataFilter, QueryFilter};
pub use table::MetadataTable;
pub use value::MetadataValue;

use std::collections::HashMap;

/// Metadata mapping attached to a single vector.
pub type Metadata = HashMap<String, MetadataValue>;
