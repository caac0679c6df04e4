// Plot types module

pub mod candlestick;
pub mod line;
pub mod range;

pub use candlestick::CandlestickPlot;
pub use line::LinePlot;
pub use range::RangePlot;

use crate::data_types::SeriesItem;
use crate::rendering::Canvas;
use crate::transform::PlotTransform;

/// Turns the visible items of a series into drawing primitives.
pub trait PlotRenderer<T: SeriesItem>: Send + Sync {
    fn render(&self, items: &[T], transform: &PlotTransform, canvas: &mut dyn Canvas);
}
