use super::redraw::RedrawHandle;
use crate::crosshair::{SeriesReading, SeriesValue};
use crate::data_types::{value_bounds_of, Resolution, SeriesItem, TimeRange};
use crate::plot_types::PlotRenderer;
use crate::rendering::Canvas;
use crate::series_source::{LoadTask, SeriesSource};
use crate::source_factory::SeriesSourceFactory;
use crate::transform::PlotTransform;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::trace;

/// Object-safe view of a series so one pane can mix item types.
pub trait SeriesView: Send + Sync {
    fn id(&self) -> &str;

    /// Pulls the items of `visible` at `resolution` and returns the load to
    /// spawn, if the window needs one.
    fn refresh(
        &mut self,
        visible: &TimeRange,
        resolution: Resolution,
        redraw: &RedrawHandle,
    ) -> Option<LoadTask>;

    fn value_bounds(&self, visible: &TimeRange) -> Option<(f64, f64)>;

    fn render(&self, transform: &PlotTransform, canvas: &mut dyn Canvas);

    /// Item whose slot starts at `slot`.
    fn lookup(&self, slot: DateTime<Utc>) -> Option<SeriesReading>;

    fn is_loading(&self) -> bool;

    fn item_count(&self) -> usize;
}

/// Binds a series source family to a plot renderer.
pub struct SeriesContext<T: SeriesItem> {
    id: String,
    symbol: String,
    factory: Arc<SeriesSourceFactory<T>>,
    plot: Box<dyn PlotRenderer<T>>,
    source: Option<SeriesSource<T>>,
    /// Last available window; kept while a newer one is loading.
    items: Vec<T>,
}

impl<T: SeriesItem> SeriesContext<T> {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        factory: Arc<SeriesSourceFactory<T>>,
        plot: impl PlotRenderer<T> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            factory,
            plot: Box::new(plot),
            source: None,
            items: Vec::new(),
        }
    }

    pub fn source(&self) -> Option<&SeriesSource<T>> {
        self.source.as_ref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    fn source_for(&mut self, resolution: Resolution) -> SeriesSource<T> {
        match &self.source {
            Some(source) if source.resolution() == resolution => source.clone(),
            _ => {
                let source = self.factory.source(&self.symbol, resolution);
                // Items of another resolution must not be drawn on this grid.
                self.items.clear();
                self.source = Some(source.clone());
                source
            }
        }
    }
}

impl<T> SeriesView for SeriesContext<T>
where
    T: SeriesItem + Into<SeriesValue>,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn refresh(
        &mut self,
        visible: &TimeRange,
        resolution: Resolution,
        redraw: &RedrawHandle,
    ) -> Option<LoadTask> {
        let source = self.source_for(resolution);
        let query = source.query(visible);
        if let Some(items) = query.items {
            trace!(series = %self.id, count = items.len(), "window available");
            self.items = items;
        }
        let range = query.load?;
        let redraw = redraw.clone();
        source.load_items(range, move |outcome| {
            if outcome.is_ok() {
                redraw.request();
            }
        })
    }

    fn value_bounds(&self, visible: &TimeRange) -> Option<(f64, f64)> {
        let start = self
            .items
            .partition_point(|i| i.timestamp() < visible.start());
        let end = self
            .items
            .partition_point(|i| i.timestamp() < visible.end());
        value_bounds_of(&self.items[start..end.max(start)])
    }

    fn render(&self, transform: &PlotTransform, canvas: &mut dyn Canvas) {
        self.plot.render(&self.items, transform, canvas);
    }

    fn lookup(&self, slot: DateTime<Utc>) -> Option<SeriesReading> {
        let resolution = self.source.as_ref()?.resolution();
        let slot_end = slot + resolution.duration();
        let idx = self.items.partition_point(|i| i.timestamp() < slot);
        let item = self.items.get(idx).filter(|i| i.timestamp() < slot_end)?;
        Some(SeriesReading {
            series_id: self.id.clone(),
            time: item.timestamp(),
            value: item.clone().into(),
        })
    }

    fn is_loading(&self) -> bool {
        self.source.as_ref().is_some_and(SeriesSource::is_loading)
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}
