use super::series::SeriesView;
use super::side::{SideContext, SideEdge};
use crate::data_types::{AxisRange, TimeRange};
use crate::rendering::{Canvas, Rect};
use crate::scales::{ChartScale, ScaleKind};
use crate::transform::{PlotTransform, TimeAxisMapping};
use crate::view_controller::ViewController;

/// A horizontal band of the chart with its own value axis.
pub struct PaneContext {
    id: String,
    pub weight: f32,
    bounds: Rect,
    value_axis: AxisRange,
    scale: ChartScale,
    pub autoscale: bool,
    /// Fraction of the value span added above and below on autoscale.
    pub margin_pct: f64,
    series: Vec<Box<dyn SeriesView>>,
    sides: Vec<SideContext>,
}

impl PaneContext {
    pub fn new(id: impl Into<String>, weight: f32) -> Self {
        let value_axis = AxisRange::new(0.0, 100.0);
        Self {
            id: id.into(),
            weight,
            bounds: Rect::default(),
            scale: ChartScale::new_linear((value_axis.min, value_axis.max), (0.0, 0.0)),
            value_axis,
            autoscale: true,
            margin_pct: 0.05,
            series: Vec::new(),
            sides: vec![SideContext::new(SideEdge::Right, 60.0)],
        }
    }

    pub fn with_scale(mut self, kind: ScaleKind) -> Self {
        self.scale = ChartScale::new(kind, self.scale.domain(), self.scale.range());
        self.sync_scale();
        self
    }

    pub fn with_sides(mut self, sides: Vec<SideContext>) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_series(mut self, series: impl SeriesView + 'static) -> Self {
        self.add_series(series);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn scale(&self) -> &ChartScale {
        &self.scale
    }

    pub fn value_axis(&self) -> &AxisRange {
        &self.value_axis
    }

    pub fn sides(&self) -> &[SideContext] {
        &self.sides
    }

    pub fn series(&self) -> &[Box<dyn SeriesView>] {
        &self.series
    }

    pub(crate) fn series_mut(&mut self) -> &mut [Box<dyn SeriesView>] {
        &mut self.series
    }

    pub fn add_series(&mut self, series: impl SeriesView + 'static) {
        self.series.push(Box::new(series));
    }

    pub fn remove_series(&mut self, id: &str) -> bool {
        let before = self.series.len();
        self.series.retain(|s| s.id() != id);
        self.series.len() != before
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.sync_scale();
    }

    fn sync_scale(&mut self) {
        self.scale.sync(&self.value_axis);
        self.scale.update_range(self.bounds.height, 0.0);
    }

    /// Screen y of `value`.
    pub fn value_to_y(&self, value: f64) -> f32 {
        self.bounds.origin.y + self.scale.map(value)
    }

    pub fn y_to_value(&self, y: f32) -> f64 {
        self.scale.invert(y - self.bounds.origin.y)
    }

    pub fn set_value_range(&mut self, min: f64, max: f64) {
        self.value_axis.min = min;
        self.value_axis.max = max;
        self.value_axis.clamp();
        self.sync_scale();
    }

    /// Fits the value axis to what the series show in `visible`.
    /// Returns false when no series has data there.
    pub fn autoscale(&mut self, visible: &TimeRange) -> bool {
        let bounds = self
            .series
            .iter()
            .filter_map(|s| s.value_bounds(visible))
            .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            });
        let Some((lo, hi)) = bounds else {
            return false;
        };
        ViewController::auto_fit_axis(&mut self.value_axis, lo, hi, self.margin_pct);
        self.sync_scale();
        true
    }

    /// Manual vertical pan; disables autoscale.
    pub fn pan_values(&mut self, delta_pixels: f32) {
        self.autoscale = false;
        ViewController::pan_axis(&mut self.value_axis, delta_pixels, self.bounds.height);
        self.sync_scale();
    }

    /// Manual vertical zoom around screen y `pivot_y`; disables autoscale.
    pub fn zoom_values(&mut self, pivot_y: f32, factor: f64) {
        if self.bounds.height <= 0.0 {
            return;
        }
        self.autoscale = false;
        let pivot_pct = 1.0 - ((pivot_y - self.bounds.origin.y) / self.bounds.height).clamp(0.0, 1.0) as f64;
        ViewController::zoom_axis_at(&mut self.value_axis, pivot_pct, factor);
        self.sync_scale();
    }

    pub fn transform(&self, time: TimeAxisMapping) -> PlotTransform {
        PlotTransform::new(time, self.scale.clone(), self.bounds)
    }

    pub fn render(&self, time: TimeAxisMapping, canvas: &mut dyn Canvas) {
        let transform = self.transform(time);
        for series in &self.series {
            series.render(&transform, canvas);
        }
    }
}
