//! Persistence layer for talent-db artifacts.
//!
//! This module frames serialized payloads with a magic/version/checksum
//! header so corrupted or foreign files are detected at load time.
//!
//! # File Format
//!
//! ```text
//! [MAGIC 8B "TLNTDB\0\0"][VERSION u32][ARTIFACT_TYPE u32][CHECKSUM u32]
//! [PAYLOAD bytes... (artifact-specific)]
//! ```

mod format;

pub use format::{ArtifactType, FileHeader, FORMAT_VERSION, MAGIC};

use crate::error::{Result, TalentDbError};
use std::path::Path;

/// Trait for artifacts that can be persisted to disk.
pub trait Persistable: Sized {
    /// Save the artifact to a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or serialization fails.
    fn save(&self, path: impl AsRef<Path>) -> Result<()>;

    /// Load an artifact from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is corrupted, or has an
    /// incompatible format.
    fn load(path: impl AsRef<Path>) -> Result<Self>;
}

/// Verify file header and return the payload section.
pub(crate) fn verify_header(data: &[u8], expected_type: ArtifactType) -> Result<&[u8]> {
    if data.len() < FileHeader::SIZE {
        return Err(TalentDbError::invalid_format("file too small for header"));
    }

    let header = FileHeader::from_bytes(&data[..FileHeader::SIZE])?;
    header.verify(expected_type)?;

    let payload = &data[FileHeader::SIZE..];
    let computed_checksum = crc32fast::hash(payload);

    if computed_checksum != header.checksum {
        return Err(TalentDbError::ChecksumMismatch);
    }

    Ok(payload)
}

/// Write header and payload to file.
pub(crate) fn write_with_header(
    path: impl AsRef<Path>,
    artifact_type: ArtifactType,
    payload: &[u8],
) -> Result<()> {
    use std::io::Write;

    let checksum = crc32fast::hash(payload);
    let header = FileHeader::new(artifact_type, checksum);

    let mut file = std::fs::File::create(path)?;
    file.write_all(&header.to_bytes())?;
    file.write_all(payload)?;
    file.sync_all()?;

    Ok(())
}
