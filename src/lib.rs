//! series_chart: windowed time-series caching and chart contexts
//!
//! Series sources keep merged chunks of items per symbol and resolution and
//! prefetch around the visible window; the context tree (chart → panes →
//! series and value sides) maps that window onto pixels and draws it on a
//! host-provided [`Canvas`].

pub mod cache;
pub mod config;
pub mod context;
pub mod crosshair;
pub mod data_types;
pub mod gutter_manager;
pub mod loader;
pub mod plot_types;
pub mod rendering;
pub mod rest;
pub mod scales;
pub mod series_source;
pub mod source_factory;
pub mod theme;
pub mod transform;
pub mod utils;
pub mod view_controller;

pub use cache::{CacheChunk, SeriesCache};
pub use config::ChartConfig;
pub use context::{ChartContext, PaneContext, SeriesContext, SideContext, ZoomLevel};
pub use data_types::{Candle, RangePoint, Resolution, SeriesItem, TimeRange, ValuePoint};
pub use loader::{LoadRequest, MemoryLoader, SeriesLoader};
pub use plot_types::{CandlestickPlot, LinePlot, PlotRenderer, RangePlot};
pub use rendering::{Canvas, RecordingCanvas};
pub use rest::RestCandleLoader;
pub use series_source::{SeriesKey, SeriesSource, SourceError};
pub use source_factory::SeriesSourceFactory;
