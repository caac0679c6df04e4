//! Per-series cache plus loader.
//!
//! A [`SeriesSource`] answers windowed queries from its [`SeriesCache`] and
//! plans prefetches from its [`ZoneConfig`]. Loads are handed back to the
//! caller as futures so the host decides where they run; at most one load is
//! in flight per source.

use crate::cache::{CacheChunk, SeriesCache};
use crate::data_types::{Resolution, SeriesItem, TimeRange, ZoneConfig};
use crate::loader::{LoadRequest, SeriesLoader};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub symbol: String,
    pub resolution: Resolution,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.resolution)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("load of {range} for {key} failed: {message}")]
    Load {
        key: SeriesKey,
        range: TimeRange,
        message: String,
    },
    #[error("load of {range} for {key} was discarded after an invalidation")]
    Stale { key: SeriesKey, range: TimeRange },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedWindow {
    pub range: TimeRange,
    pub item_count: usize,
}

pub type LoadOutcome = Result<LoadedWindow, SourceError>;

/// Future performing one load; spawn it on the host executor.
pub type LoadTask = BoxFuture<'static, LoadOutcome>;

/// Answer to a visible-window query.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowQuery<T> {
    /// Items of the window, or `None` if it is not fully cached.
    pub items: Option<Vec<T>>,
    /// Range to fetch, set when the window nears or leaves the cached bounds.
    pub load: Option<TimeRange>,
}

struct SourceState<T> {
    cache: SeriesCache<T>,
    in_flight: Option<TimeRange>,
    generation: u64,
    horizon: Option<DateTime<Utc>>,
}

pub struct SeriesSource<T: SeriesItem> {
    key: SeriesKey,
    zones: ZoneConfig,
    loader: Arc<dyn SeriesLoader<T>>,
    state: Arc<Mutex<SourceState<T>>>,
}

impl<T: SeriesItem> Clone for SeriesSource<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            zones: self.zones,
            loader: Arc::clone(&self.loader),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: SeriesItem> SeriesSource<T> {
    pub fn new(key: SeriesKey, zones: ZoneConfig, loader: Arc<dyn SeriesLoader<T>>) -> Self {
        Self {
            key,
            zones,
            loader,
            state: Arc::new(Mutex::new(SourceState {
                cache: SeriesCache::new(),
                in_flight: None,
                generation: 0,
                horizon: None,
            })),
        }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn resolution(&self) -> Resolution {
        self.key.resolution
    }

    pub fn zones(&self) -> ZoneConfig {
        self.zones
    }

    /// Latest instant data can exist for. Windows are clipped to the slot
    /// containing it so that future slots never count as cached.
    pub fn set_horizon(&self, horizon: Option<DateTime<Utc>>) {
        self.state.lock().horizon = horizon;
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<TimeRange> {
        self.state.lock().in_flight
    }

    pub fn cached_bounds(&self) -> Option<TimeRange> {
        self.state.lock().cache.bounds()
    }

    pub fn chunk_count(&self) -> usize {
        self.state.lock().cache.chunk_count()
    }

    pub fn cached_item_count(&self) -> usize {
        self.state.lock().cache.item_count()
    }

    /// Cached items of `[start, end)`, or `None` if that range is not fully
    /// cached (or inverted).
    pub fn get_items(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Vec<T>> {
        let range = TimeRange::new(start, end).ok()?;
        let state = self.state.lock();
        let range = clip(&range, state.horizon, self.key.resolution);
        state.cache.get_items(&range).map(<[T]>::to_vec)
    }

    /// Latest cached item at or before `t`.
    pub fn item_at_or_before(&self, t: DateTime<Utc>) -> Option<T> {
        self.state.lock().cache.item_at_or_before(t).cloned()
    }

    /// Looks up `visible` and decides whether a prefetch is due.
    ///
    /// A load is planned when the window widened by the buffer zone is not
    /// fully cached. The planned range is the window widened by the load zone,
    /// trimmed to the hull of what is still missing.
    pub fn query(&self, visible: &TimeRange) -> WindowQuery<T> {
        let resolution = self.key.resolution;
        let state = self.state.lock();
        let visible = clip(visible, state.horizon, resolution);
        let items = state.cache.get_items(&visible).map(<[T]>::to_vec);

        let buffer = resolution.slots(i64::from(self.zones.buffer_zone));
        let required = clip(
            &resolution.align_range(&visible.expand(buffer, buffer)),
            state.horizon,
            resolution,
        );
        if state.cache.is_covered(&required) {
            debug!(key = %self.key, window = %visible, hit = items.is_some(), "window within buffer zone");
            return WindowQuery { items, load: None };
        }

        let margin = resolution.slots(i64::from(self.zones.load_zone));
        let wanted = clip(
            &resolution.align_range(&visible.expand(margin, margin)),
            state.horizon,
            resolution,
        );
        let missing = state.cache.missing(&wanted);
        let load = match (missing.first(), missing.last()) {
            (Some(first), Some(last)) => Some(first.union(last)),
            _ => None,
        };
        debug!(
            key = %self.key,
            window = %visible,
            hit = items.is_some(),
            load = ?load.map(|r| r.to_string()),
            "window near cache edge"
        );
        WindowQuery { items, load }
    }

    /// Starts loading `range` unless a load is already in flight.
    ///
    /// The returned task merges the fetched chunk into the cache and then
    /// calls `on_loaded` exactly once. Dropping the task before completion
    /// releases the in-flight slot without calling back.
    pub fn load_items<F>(&self, range: TimeRange, on_loaded: F) -> Option<LoadTask>
    where
        F: FnOnce(&LoadOutcome) + Send + 'static,
    {
        let generation = {
            let mut state = self.state.lock();
            if let Some(current) = state.in_flight {
                debug!(key = %self.key, requested = %range, in_flight = %current, "load already in flight");
                return None;
            }
            state.in_flight = Some(range);
            state.generation
        };

        let request = LoadRequest {
            symbol: self.key.symbol.clone(),
            resolution: self.key.resolution,
            range,
        };
        let key = self.key.clone();
        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);
        let guard = InFlightGuard {
            state: Arc::clone(&state),
            generation,
        };

        Some(Box::pin(async move {
            let result = loader.load(&request).await;

            let outcome = match result {
                Ok(items) => {
                    let chunk = CacheChunk::from_loaded(range, items);
                    let item_count = chunk.len();
                    let mut state = state.lock();
                    if state.generation == generation {
                        state.cache.insert(chunk);
                        info!(key = %key, range = %range, item_count, "series window loaded");
                        Ok(LoadedWindow { range, item_count })
                    } else {
                        warn!(key = %key, range = %range, "discarding load finished after invalidation");
                        Err(SourceError::Stale { key, range })
                    }
                }
                Err(err) => {
                    warn!(key = %key, range = %range, error = %err, "series load failed");
                    Err(SourceError::Load {
                        key,
                        range,
                        message: format!("{err:#}"),
                    })
                }
            };

            drop(guard);
            on_loaded(&outcome);
            outcome
        }))
    }

    /// Drops every cached chunk. Loads started earlier are discarded when
    /// they land.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.cache.clear();
        state.in_flight = None;
        state.generation += 1;
        debug!(key = %self.key, generation = state.generation, "series cache invalidated");
    }

    /// Applies a streaming update; see [`SeriesCache::upsert_live`].
    pub fn push_live(&self, item: T) -> bool {
        let mut state = self.state.lock();
        let t = item.timestamp();
        let accepted = state.cache.upsert_live(item, self.key.resolution);
        if accepted && state.horizon.is_some_and(|h| h < t) {
            state.horizon = Some(t);
        }
        accepted
    }
}

struct InFlightGuard<T> {
    state: Arc<Mutex<SourceState<T>>>,
    generation: u64,
}

impl<T> Drop for InFlightGuard<T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.generation == self.generation {
            state.in_flight = None;
        }
    }
}

fn clip(range: &TimeRange, horizon: Option<DateTime<Utc>>, resolution: Resolution) -> TimeRange {
    let Some(horizon) = horizon else {
        return *range;
    };
    let limit = resolution.next_slot(horizon);
    if range.end() <= limit {
        return *range;
    }
    let start = range.start().min(limit);
    TimeRange::new(start, limit).unwrap_or(*range)
}
