//! Named constants for configuration values.
//!
//! This module centralizes magic numbers and default values used throughout
//! the codebase, making them easier to find, document, and tune.

/// Constants for retrieval defaults.
pub mod retrieval {
    /// Default number of results returned by the direct retrieval path.
    pub const DEFAULT_TOP_N: usize = 10;

    /// Default candidate pool width fetched from the index before filtering.
    /// Wider than `top_n` so post-filtering still leaves enough survivors.
    pub const DEFAULT_SEARCH_K: usize = 100;

    /// Default number of results in a conversational reply.
    pub const BOT_TOP_N: usize = 5;

    /// Candidate pool width used by the conversational wrapper.
    pub const BOT_SEARCH_K: usize = 200;
}

/// Constants for the vector store.
pub mod store {
    /// Default `k` for store-level queries when the caller gives none.
    pub const DEFAULT_K: usize = 5;
}

/// Constants for the flat index scan.
pub mod index {
    /// Entry count above which the scan is parallelized.
    /// Small indexes are scanned sequentially to avoid thread overhead.
    pub const PARALLEL_THRESHOLD: usize = 4096;

    /// Chunk size for the parallel scan.
    /// Sized to fit multiple vectors in L2 cache.
    pub const SCAN_CHUNK_SIZE: usize = 1000;
}

/// Constants for the embedding layer.
pub mod embedding {
    /// Default dimensionality of the hash embedder.
    pub const DEFAULT_DIM: usize = 384;
}
