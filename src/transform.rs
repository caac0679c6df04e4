//! Transform helpers for coordinate projection

use crate::data_types::{Resolution, TimeRange};
use crate::rendering::{Point, Rect};
use crate::scales::ChartScale;
use chrono::{DateTime, Duration, Utc};

/// Time ↔ x mapping of the plot area, anchored on its right edge.
///
/// x is measured from the left of the plot area; `right_edge` sits at
/// `plot_width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeAxisMapping {
    pub right_edge: DateTime<Utc>,
    pub plot_width: f32,
    pub resolution: Resolution,
    /// Pixels taken by one slot.
    pub item_width: f32,
}

impl TimeAxisMapping {
    pub fn ms_per_px(&self) -> f64 {
        self.resolution.as_millis() as f64 / self.item_width.max(f32::EPSILON) as f64
    }

    pub fn instant_to_x(&self, t: DateTime<Utc>) -> f32 {
        let dt = (self.right_edge - t).num_milliseconds() as f64;
        (self.plot_width as f64 - dt / self.ms_per_px()) as f32
    }

    pub fn x_to_instant(&self, x: f32) -> DateTime<Utc> {
        let dt = ((self.plot_width - x) as f64 * self.ms_per_px()).round() as i64;
        self.right_edge - Duration::milliseconds(dt)
    }

    /// Start of the slot under `x`.
    pub fn slot_at_x(&self, x: f32) -> DateTime<Utc> {
        self.resolution.align(self.x_to_instant(x))
    }

    /// Horizontal center of the slot starting at `t`.
    pub fn slot_center_x(&self, t: DateTime<Utc>) -> f32 {
        self.instant_to_x(t) + self.item_width / 2.0
    }

    pub fn visible_range(&self) -> TimeRange {
        TimeRange::ordered(self.x_to_instant(0.0), self.right_edge)
    }
}

/// Full projection of a pane: time on x, pane scale on y, offset by the
/// pane origin.
#[derive(Clone, Debug)]
pub struct PlotTransform {
    pub time: TimeAxisMapping,
    pub y_scale: ChartScale,
    pub bounds: Rect,
}

impl PlotTransform {
    pub fn new(time: TimeAxisMapping, y_scale: ChartScale, bounds: Rect) -> Self {
        Self {
            time,
            y_scale,
            bounds,
        }
    }

    pub fn data_to_screen(&self, t: DateTime<Utc>, value: f64) -> Point {
        Point::new(self.x_data_to_screen(t), self.y_data_to_screen(value))
    }

    pub fn screen_to_data(&self, point: Point) -> (DateTime<Utc>, f64) {
        (
            self.time.x_to_instant(point.x - self.bounds.origin.x),
            self.y_scale.invert(point.y - self.bounds.origin.y),
        )
    }

    pub fn x_data_to_screen(&self, t: DateTime<Utc>) -> f32 {
        self.bounds.origin.x + self.time.instant_to_x(t)
    }

    /// Screen x of the center of the slot starting at `t`.
    pub fn slot_center_to_screen(&self, t: DateTime<Utc>) -> f32 {
        self.bounds.origin.x + self.time.slot_center_x(t)
    }

    pub fn y_data_to_screen(&self, value: f64) -> f32 {
        self.bounds.origin.y + self.y_scale.map(value)
    }
}
