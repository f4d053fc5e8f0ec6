//! Byte-range buffer with bounded caching.
//!
//! Columnar formats read a file in scattered pieces (footer first, then
//! individual row groups), and over a remote transport each piece is a
//! separate request. `RangeReadBuffer` fetches arbitrary ranges on demand
//! and keeps recently fetched ranges in a bounded cache so re-reads during
//! scrolling don't touch the transport again.
//!
//! Ranges are cached under the exact `"<start>-<end>"` pair requested;
//! overlapping-but-different ranges are treated as misses. That keeps the
//! cache a plain map at the cost of occasionally re-fetching overlapping
//! bytes.

use crate::constants::MAX_CACHED_RANGES;
use crate::error::DataResult;
use crate::source::ByteSource;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

struct RangeCache {
    entries: HashMap<String, Bytes>,
    /// Insertion order for eviction. Bounding memory is what matters here,
    /// not strict LRU order.
    order: VecDeque<String>,
}

/// On-demand byte-range reader with a bounded range cache.
pub struct RangeReadBuffer {
    source: Arc<dyn ByteSource>,
    byte_length: u64,
    max_entries: usize,
    cache: Mutex<RangeCache>,
}

impl RangeReadBuffer {
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self::with_capacity(source, MAX_CACHED_RANGES)
    }

    pub fn with_capacity(source: Arc<dyn ByteSource>, max_entries: usize) -> Self {
        let byte_length = source.byte_length();
        Self {
            source,
            byte_length,
            max_entries,
            cache: Mutex::new(RangeCache {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Total file length in bytes, fixed at construction.
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// Read the bytes in `[start, end)`, clamped to the file bounds.
    ///
    /// `end = None` reads through the end of the file. A clamped
    /// zero-length request returns an empty buffer without any I/O.
    pub fn slice(&self, start: u64, end: Option<u64>) -> DataResult<Bytes> {
        let start = start.min(self.byte_length);
        let end = end.unwrap_or(self.byte_length).clamp(start, self.byte_length);
        if start == end {
            return Ok(Bytes::new());
        }

        let key = format!("{}-{}", start, end);
        if let Some(hit) = self.cache.lock().entries.get(&key) {
            return Ok(hit.clone());
        }

        let full_read = start == 0 && end == self.byte_length;
        debug!(
            start,
            end,
            full_read,
            "range miss, fetching {} bytes",
            end - start
        );
        let bytes = self.source.read_range(start, end)?;

        let mut cache = self.cache.lock();
        if !cache.entries.contains_key(&key) {
            while cache.entries.len() >= self.max_entries {
                match cache.order.pop_front() {
                    Some(oldest) => {
                        cache.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            cache.entries.insert(key.clone(), bytes.clone());
            cache.order.push_back(key);
        }

        Ok(bytes)
    }

    /// Drop every cached range.
    ///
    /// Safe to call at any time; a read already in flight completes
    /// normally and may repopulate the cache afterwards.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.entries.clear();
        cache.order.clear();
    }

    /// Number of ranges currently cached.
    pub fn cached_ranges(&self) -> usize {
        self.cache.lock().entries.len()
    }
}
