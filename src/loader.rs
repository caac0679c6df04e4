//! Asynchronous item loaders feeding series sources.

use crate::data_types::{Resolution, SeriesItem, TimeRange};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// What a source asks its loader for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub symbol: String,
    pub resolution: Resolution,
    pub range: TimeRange,
}

/// Fetches the items of a range. Items may come back unsorted or spill
/// outside the range; the source normalizes them.
#[async_trait]
pub trait SeriesLoader<T: SeriesItem>: Send + Sync {
    async fn load(&self, request: &LoadRequest) -> eyre::Result<Vec<T>>;
}

/// Loader serving a fixed, in-memory series.
pub struct MemoryLoader<T> {
    data: Vec<T>,
    delay: Option<Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
    requests: Mutex<Vec<LoadRequest>>,
}

impl<T: SeriesItem> MemoryLoader<T> {
    pub fn new(mut data: Vec<T>) -> Self {
        data.sort_by_key(SeriesItem::timestamp);
        Self {
            data,
            delay: None,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps for `delay` before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl<T: SeriesItem> SeriesLoader<T> for MemoryLoader<T> {
    async fn load(&self, request: &LoadRequest) -> eyre::Result<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            eyre::bail!("memory loader for {} is failing", request.symbol);
        }

        let start = self
            .data
            .partition_point(|i| i.timestamp() < request.range.start());
        let end = self
            .data
            .partition_point(|i| i.timestamp() < request.range.end());
        Ok(self.data[start..end.max(start)].to_vec())
    }
}
