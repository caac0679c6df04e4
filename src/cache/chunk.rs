use crate::data_types::{RangeError, SeriesItem, TimeRange};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("item at {time} lies outside chunk range {range}")]
    OutOfRange {
        time: DateTime<Utc>,
        range: TimeRange,
    },
    #[error("items are not strictly ordered at index {index}")]
    Unordered { index: usize },
    #[error("chunk {left} and chunk {right} are disjoint")]
    Disjoint { left: TimeRange, right: TimeRange },
}

/// A contiguous run of cached items covering `range`.
///
/// Covering means the chunk knows every item of `range`: a slot without an
/// item inside a chunk is a real hole in the series, not a cache miss.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheChunk<T> {
    range: TimeRange,
    items: Vec<T>,
}

impl<T: SeriesItem> CacheChunk<T> {
    /// Checked constructor: items must be strictly increasing and inside `range`.
    pub fn new(range: TimeRange, items: Vec<T>) -> Result<Self, ChunkError> {
        for (index, pair) in items.windows(2).enumerate() {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(ChunkError::Unordered { index: index + 1 });
            }
        }
        if let Some(item) = items.iter().find(|i| !range.contains(i.timestamp())) {
            return Err(ChunkError::OutOfRange {
                time: item.timestamp(),
                range,
            });
        }
        Ok(Self { range, items })
    }

    /// Trusts the caller on ordering and containment.
    pub fn new_unchecked(range: TimeRange, items: Vec<T>) -> Self {
        Self { range, items }
    }

    /// Normalizes raw loader output into a valid chunk.
    ///
    /// Items are sorted, those outside `range` are dropped and duplicate
    /// timestamps keep the last occurrence.
    pub fn from_loaded(range: TimeRange, mut items: Vec<T>) -> Self {
        let before = items.len();
        items.retain(|i| range.contains(i.timestamp()));
        let dropped = before - items.len();
        if dropped > 0 {
            warn!(dropped, %range, "discarding loaded items outside the requested range");
        }

        // Stable sort keeps arrival order among equal timestamps.
        items.sort_by_key(SeriesItem::timestamp);
        let mut deduped: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            match deduped.last_mut() {
                Some(last) if last.timestamp() == item.timestamp() => *last = item,
                _ => deduped.push(item),
            }
        }
        Self {
            range,
            items: deduped,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose timestamps fall inside `range`.
    pub fn slice(&self, range: &TimeRange) -> &[T] {
        let start = self
            .items
            .partition_point(|i| i.timestamp() < range.start());
        let end = self.items.partition_point(|i| i.timestamp() < range.end());
        &self.items[start..end.max(start)]
    }

    /// Last item at or before `t`.
    pub fn item_at_or_before(&self, t: DateTime<Utc>) -> Option<&T> {
        let idx = self.items.partition_point(|i| i.timestamp() <= t);
        idx.checked_sub(1).map(|i| &self.items[i])
    }

    /// Merges `newer` into `self`; `newer` wins wherever the ranges overlap.
    pub fn merge(self, newer: CacheChunk<T>) -> Result<Self, ChunkError> {
        if !self.range.touches_or_overlaps(&newer.range) {
            return Err(ChunkError::Disjoint {
                left: self.range,
                right: newer.range,
            });
        }
        Ok(self.merge_touching(newer))
    }

    /// `newer` is authoritative over its whole range: older items inside it
    /// are replaced even where `newer` has no item.
    pub(crate) fn merge_touching(self, newer: CacheChunk<T>) -> Self {
        let range = self.range.union(&newer.range);
        let mut items = self.items;
        let tail_start = items.partition_point(|i| i.timestamp() < newer.range.end());
        let tail = items.split_off(tail_start);
        let head_end = items.partition_point(|i| i.timestamp() < newer.range.start());
        items.truncate(head_end);
        items.extend(newer.items);
        items.extend(tail);
        Self { range, items }
    }

    /// Replaces the item with the same timestamp or appends a newer one,
    /// stretching the range end to `end`.
    pub(crate) fn upsert_tail(&mut self, item: T, end: DateTime<Utc>) {
        let t = item.timestamp();
        match self.items.binary_search_by_key(&t, SeriesItem::timestamp) {
            Ok(idx) => self.items[idx] = item,
            Err(idx) => self.items.insert(idx, item),
        }
        if end > self.range.end() {
            if let Ok(range) = TimeRange::new(self.range.start(), end) {
                self.range = range;
            }
        }
    }
}
