//! Error types for talent-db operations.
//!
//! This module provides error handling for all talent-db operations,
//! including embedding, indexing, searching, persistence, and configuration.

use std::io;
use thiserror::Error;

/// Result type alias using [`TalentDbError`].
pub type Result<T> = std::result::Result<T, TalentDbError>;

/// Errors that can occur during talent-db operations.
#[derive(Error, Debug)]
pub enum TalentDbError {
    /// Configuration is invalid or references an unresolvable resource
    /// (e.g. an unknown embedding model name).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Vector dimensions do not match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector dimension.
        expected: usize,
        /// Actual vector dimension provided.
        actual: usize,
    },

    /// Invalid parameter value provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Checksum verification failed during file loading.
    #[error("checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    /// Persisted file has an invalid or unrecognized format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}

impl TalentDbError {
    /// Creates a new `Configuration` error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a new `InvalidParameter` error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a new `SerializationError`.
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new `InvalidFormat` error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<bincode::Error> for TalentDbError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
