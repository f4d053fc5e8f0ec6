//! Byte source contract and the two bundled implementations.
//!
//! The storage collaborator supplies the real transports (local disk, HTTP
//! range requests); this module defines the trait they implement plus a
//! file-backed source for the desktop path and an in-memory source for
//! tests and clipboard payloads.

use crate::error::DataResult;
use bytes::Bytes;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access byte reads over a file of known total length.
///
/// `read_range` uses half-open `[start, end)` bounds. Callers are expected
/// to pass pre-clamped bounds; implementations may treat out-of-range
/// requests as errors.
pub trait ByteSource: Send + Sync {
    /// Total length in bytes, known up front.
    fn byte_length(&self) -> u64;

    /// Read the bytes in `[start, end)`.
    fn read_range(&self, start: u64, end: u64) -> DataResult<Bytes>;
}

/// Byte source over a local file.
pub struct FileSource {
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> DataResult<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl ByteSource for FileSource {
    fn byte_length(&self) -> u64 {
        self.len
    }

    fn read_range(&self, start: u64, end: u64) -> DataResult<Bytes> {
        let mut buf = vec![0u8; (end.saturating_sub(start)) as usize];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Byte source over bytes already in memory.
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    fn byte_length(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, start: u64, end: u64) -> DataResult<Bytes> {
        let start = (start as usize).min(self.data.len());
        let end = (end as usize).clamp(start, self.data.len());
        Ok(self.data.slice(start..end))
    }
}
