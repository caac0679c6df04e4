use crate::data_types::{OptionsError, Resolution, SeriesItem, SeriesSourceOptions};
use crate::loader::SeriesLoader;
use crate::series_source::{SeriesKey, SeriesSource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Creates and memoizes one [`SeriesSource`] per symbol and resolution.
///
/// Switching zoom levels back and forth therefore reuses the caches built at
/// each resolution.
pub struct SeriesSourceFactory<T: SeriesItem> {
    loader: Arc<dyn SeriesLoader<T>>,
    options: SeriesSourceOptions,
    sources: Mutex<HashMap<SeriesKey, SeriesSource<T>>>,
}

impl<T: SeriesItem> SeriesSourceFactory<T> {
    pub fn new(
        loader: Arc<dyn SeriesLoader<T>>,
        options: SeriesSourceOptions,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self {
            loader,
            options,
            sources: Mutex::new(HashMap::new()),
        })
    }

    pub fn options(&self) -> &SeriesSourceOptions {
        &self.options
    }

    pub fn source(&self, symbol: &str, resolution: Resolution) -> SeriesSource<T> {
        let key = SeriesKey::new(symbol, resolution);
        let mut sources = self.sources.lock();
        sources
            .entry(key)
            .or_insert_with_key(|key| {
                debug!(key = %key, "creating series source");
                SeriesSource::new(
                    key.clone(),
                    self.options.zones_for(resolution),
                    Arc::clone(&self.loader),
                )
            })
            .clone()
    }

    pub fn source_count(&self) -> usize {
        self.sources.lock().len()
    }

    pub fn invalidate_all(&self) {
        for source in self.sources.lock().values() {
            source.invalidate();
        }
    }
}
