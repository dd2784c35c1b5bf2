//! File format definitions for talent-db persistence.

use crate::error::{Result, TalentDbError};

/// Magic bytes identifying a talent-db file: "TLNTDB\0\0"
pub const MAGIC: [u8; 8] = *b"TLNTDB\0\0";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Persisted artifact type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ArtifactType {
    /// Flat inner-product index
    FlatIndex = 1,
    /// Metadata side-table
    MetadataTable = 2,
}

impl ArtifactType {
    /// Convert from u32.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::FlatIndex),
            2 => Some(Self::MetadataTable),
            _ => None,
        }
    }
}

/// File header structure.
///
/// Total size: 20 bytes
/// ```text
/// [MAGIC 8B][VERSION u32][ARTIFACT_TYPE u32][CHECKSUM u32]
/// ```
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Magic bytes (must be MAGIC)
    pub magic: [u8; 8],
    /// Format version
    pub version: u32,
    /// Artifact type
    pub artifact_type: ArtifactType,
    /// CRC32 checksum of the data section (everything after header)
    pub checksum: u32,
}

impl FileHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 20;

    /// Create a new header.
    pub fn new(artifact_type: ArtifactType, checksum: u32) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            artifact_type,
            checksum,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..12].copy_from_slice(&self.version.to_le_bytes());
        bytes[12..16].copy_from_slice(&(self.artifact_type as u32).to_le_bytes());
        bytes[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(TalentDbError::invalid_format("header too small"));
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);

        if magic != MAGIC {
            return Err(TalentDbError::invalid_format("invalid magic bytes"));
        }

        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let artifact_raw = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        let checksum = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

        let artifact_type = ArtifactType::from_u32(artifact_raw)
            .ok_or_else(|| TalentDbError::invalid_format("unknown artifact type"))?;

        Ok(Self {
            magic,
            version,
            artifact_type,
            checksum,
        })
    }

    /// Verify the header is valid and matches the expected artifact type.
    pub fn verify(&self, expected_type: ArtifactType) -> Result<()> {
        if self.magic != MAGIC {
            return Err(TalentDbError::invalid_format("invalid magic bytes"));
        }

        if self.version > FORMAT_VERSION {
            return Err(TalentDbError::invalid_format(format!(
                "unsupported version {} (max supported: {})",
                self.version, FORMAT_VERSION
            )));
        }

        if self.artifact_type != expected_type {
            return Err(TalentDbError::invalid_format(format!(
                "artifact type mismatch: expected {:?}, got {:?}",
                expected_type, self.artifact_type
            )));
        }

        Ok(())
    }
}
