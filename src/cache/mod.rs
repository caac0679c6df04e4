//! Chunked cache of series items.
//!
//! The cache is an ordered set of [`CacheChunk`]s. Chunks never overlap nor
//! touch: inserting a chunk adjacent to or overlapping existing ones merges
//! them into a single contiguous run, so a window is available exactly when one
//! chunk covers it.

pub mod chunk;

pub use chunk::{CacheChunk, ChunkError};

use crate::data_types::{Resolution, SeriesItem, TimeRange};
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct SeriesCache<T> {
    chunks: Vec<CacheChunk<T>>,
}

impl<T> Default for SeriesCache<T> {
    fn default() -> Self {
        Self { chunks: Vec::new() }
    }
}

impl<T: SeriesItem> SeriesCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[CacheChunk<T>] {
        &self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn item_count(&self) -> usize {
        self.chunks.iter().map(CacheChunk::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Hull of every cached range.
    pub fn bounds(&self) -> Option<TimeRange> {
        let first = self.chunks.first()?;
        let last = self.chunks.last()?;
        Some(first.range().union(&last.range()))
    }

    /// Inserts `chunk`, merging it with every chunk it touches or overlaps.
    pub fn insert(&mut self, chunk: CacheChunk<T>) {
        let range = chunk.range();
        let first = self
            .chunks
            .partition_point(|c| c.range().end() < range.start());
        let last = self
            .chunks
            .partition_point(|c| c.range().start() <= range.end());

        if first >= last {
            self.chunks.insert(first, chunk);
            return;
        }

        // Every drained chunk touches `chunk`, so folding them into it keeps
        // the accumulator contiguous. Drained chunks never overlap each other,
        // so only `chunk`'s items can shadow cached ones.
        let merged = self
            .chunks
            .drain(first..last)
            .fold(chunk, |acc, existing| existing.merge_touching(acc));
        debug!(
            merged_range = %merged.range(),
            absorbed = last - first,
            "merged chunk into cache"
        );
        self.chunks.insert(first, merged);
    }

    /// Chunk fully covering `range`, if any.
    pub fn covering_chunk(&self, range: &TimeRange) -> Option<&CacheChunk<T>> {
        let idx = self
            .chunks
            .partition_point(|c| c.range().start() <= range.start());
        let candidate = self.chunks.get(idx.checked_sub(1)?)?;
        candidate.range().covers(range).then_some(candidate)
    }

    /// Cached items of `range`, or `None` if `range` is not fully cached.
    pub fn get_items(&self, range: &TimeRange) -> Option<&[T]> {
        if range.is_empty() {
            return Some(&[]);
        }
        self.covering_chunk(range).map(|c| c.slice(range))
    }

    pub fn is_covered(&self, range: &TimeRange) -> bool {
        range.is_empty() || self.covering_chunk(range).is_some()
    }

    /// Sub-ranges of `range` not covered by any chunk, in order.
    pub fn missing(&self, range: &TimeRange) -> Vec<TimeRange> {
        let mut gaps = Vec::new();
        let mut cursor = range.start();
        for chunk in &self.chunks {
            let r = chunk.range();
            if r.end() <= cursor {
                continue;
            }
            if r.start() >= range.end() {
                break;
            }
            if r.start() > cursor {
                if let Ok(gap) = TimeRange::new(cursor, r.start()) {
                    gaps.push(gap);
                }
            }
            cursor = cursor.max(r.end());
        }
        if cursor < range.end() {
            if let Ok(gap) = TimeRange::new(cursor, range.end()) {
                gaps.push(gap);
            }
        }
        gaps
    }

    /// Latest cached item at or before `t`.
    pub fn item_at_or_before(&self, t: DateTime<Utc>) -> Option<&T> {
        let idx = self.chunks.partition_point(|c| c.range().start() <= t);
        let chunk = self.chunks.get(idx.checked_sub(1)?)?;
        if t >= chunk.range().end() {
            return None;
        }
        chunk.item_at_or_before(t)
    }

    /// Applies a streaming update to the newest chunk.
    ///
    /// The item is accepted when its slot lies inside the last chunk or starts
    /// right at its end; the chunk is then stretched to cover the slot.
    /// Returns false when the item would open a hole in the cache.
    pub fn upsert_live(&mut self, item: T, resolution: Resolution) -> bool {
        let slot_start = resolution.align(item.timestamp());
        let slot_end = slot_start + resolution.duration();
        let Some(last) = self.chunks.last_mut() else {
            return false;
        };
        let range = last.range();
        if slot_start < range.start() || slot_start > range.end() {
            return false;
        }
        last.upsert_tail(item, slot_end);
        true
    }
}
