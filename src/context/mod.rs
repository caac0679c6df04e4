//! Context tree: chart → panes → series and sides.

pub mod chart;
pub mod pane;
pub mod redraw;
pub mod series;
pub mod side;

pub use chart::{ChartContext, TimeTick, ZoomLevel};
pub use pane::PaneContext;
pub use redraw::{RedrawHandle, RedrawScheduler};
pub use series::{SeriesContext, SeriesView};
pub use side::{AxisTick, SideContext, SideEdge};
