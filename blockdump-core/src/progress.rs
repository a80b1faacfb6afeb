//! Persisted dump progress
//!
//! With the per-boot advance policy each power cycle shows one chunk. The
//! index of the next chunk survives the reboot in a small record on
//! writable storage:
//!
//! ```text
//! postcard(DumpProgress) | crc32 (4 bytes LE)
//! ```
//!
//! The record also carries the length and CRC of the source it belongs
//! to and the payload size of the frames it counted, so a changed source
//! or geometry restarts the dump from chunk 0.

use serde::{Deserialize, Serialize};

use blockdump_hal::{StorageDevice, StorageError};
use blockdump_protocol::crc32;

/// Magic number identifying a progress record ("BLKD")
pub const PROGRESS_MAGIC: u32 = 0x424C_4B44;

/// Current record layout version
pub const PROGRESS_VERSION: u8 = 2;

/// Largest encoded record including the CRC trailer
pub const MAX_PROGRESS_SIZE: usize = 32;

const TRAILER_LEN: usize = 4;

/// Progress persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgressError {
    /// Serialization failed
    Encode,
    /// Deserialization failed
    Decode,
    /// CRC trailer or magic did not match
    Corrupted,
    /// Record written by an incompatible layout
    VersionMismatch { found: u8 },
    /// Storage operation failed
    Storage(StorageError),
}

impl From<StorageError> for ProgressError {
    fn from(e: StorageError) -> Self {
        ProgressError::Storage(e)
    }
}

/// Where the dump resumes on the next boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DumpProgress {
    pub magic: u32,
    pub version: u8,
    /// Length of the source this record belongs to
    pub source_len: u32,
    /// CRC-32 of the whole source
    pub source_crc: u32,
    /// Payload bytes per frame; chunk indices are only valid for this size
    pub framedata: u32,
    /// Chunk to render on the next boot
    pub next_chunk: u32,
}

impl DumpProgress {
    pub const fn new(source_len: u32, source_crc: u32, framedata: u32, next_chunk: u32) -> Self {
        Self {
            magic: PROGRESS_MAGIC,
            version: PROGRESS_VERSION,
            source_len,
            source_crc,
            framedata,
            next_chunk,
        }
    }

    /// Whether this record was written for the given source and frame size
    pub fn matches(&self, source_len: u32, source_crc: u32, framedata: u32) -> bool {
        self.source_len == source_len
            && self.source_crc == source_crc
            && self.framedata == framedata
    }

    /// Serialize into `buf`, returning the used prefix
    pub fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b [u8], ProgressError> {
        let body_len = postcard::to_slice(self, buf)
            .map_err(|_| ProgressError::Encode)?
            .len();
        let total = body_len + TRAILER_LEN;
        if buf.len() < total {
            return Err(ProgressError::Encode);
        }
        let crc = crc32(&buf[..body_len]);
        buf[body_len..total].copy_from_slice(&crc.to_le_bytes());
        Ok(&buf[..total])
    }

    /// Parse and validate an encoded record
    pub fn decode(bytes: &[u8]) -> Result<Self, ProgressError> {
        if bytes.len() < TRAILER_LEN {
            return Err(ProgressError::Corrupted);
        }
        let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
        let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        if crc32(body) != stored {
            return Err(ProgressError::Corrupted);
        }

        let record: Self = postcard::from_bytes(body).map_err(|_| ProgressError::Decode)?;
        if record.magic != PROGRESS_MAGIC {
            return Err(ProgressError::Corrupted);
        }
        if record.version != PROGRESS_VERSION {
            return Err(ProgressError::VersionMismatch {
                found: record.version,
            });
        }
        Ok(record)
    }

    /// Load the record at `path`
    ///
    /// A file that cannot be opened means no record has been written yet.
    pub fn load<S: StorageDevice + ?Sized>(
        storage: &mut S,
        path: &str,
    ) -> Result<Option<Self>, ProgressError> {
        let mut buf = [0u8; MAX_PROGRESS_SIZE];
        let len = match storage.read_file(path, &mut buf) {
            Ok(len) => len,
            Err(StorageError::Open) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::decode(&buf[..len]).map(Some)
    }

    /// Replace the record at `path`
    pub fn store<S: StorageDevice + ?Sized>(
        &self,
        storage: &mut S,
        path: &str,
    ) -> Result<(), ProgressError> {
        let mut buf = [0u8; MAX_PROGRESS_SIZE];
        let bytes = self.encode(&mut buf)?;
        storage.write_file(path, bytes)?;
        Ok(())
    }
}
