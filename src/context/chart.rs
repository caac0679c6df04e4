//! Chart context
//!
//! The root of the context tree. It owns the time axis (zoom level and the
//! instant pinned to the right edge of the plot area), the vertical stack of
//! panes and the redraw channel. Every viewport change requests a redraw; the
//! host answers a redraw by calling [`ChartContext::refresh`], spawning the
//! returned loads, and then [`ChartContext::render`].

use super::pane::PaneContext;
use super::redraw::RedrawScheduler;
use super::side::{SideContext, SideEdge};
use crate::config::ChartConfig;
use crate::crosshair::CrosshairInfo;
use crate::data_types::{Resolution, TimeRange};
use crate::gutter_manager::{GutterManager, Gutters};
use crate::rendering::{Canvas, Point, Rect, TextAlign};
use crate::series_source::LoadTask;
use crate::theme::ChartTheme;
use crate::transform::TimeAxisMapping;
use crate::utils::date_formatter::{determine_date_format, format_instant};
use crate::view_controller::ViewController;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_TIME_LABEL_SPACING: f64 = 80.0;
const DRAG_ZOOM_SENSITIVITY: f32 = 100.0;

const TIME_TICK_STEPS_MS: [i64; 15] = [
    60_000,
    5 * 60_000,
    15 * 60_000,
    30 * 60_000,
    3_600_000,
    2 * 3_600_000,
    4 * 3_600_000,
    6 * 3_600_000,
    12 * 3_600_000,
    86_400_000,
    2 * 86_400_000,
    7 * 86_400_000,
    30 * 86_400_000,
    90 * 86_400_000,
    365 * 86_400_000,
];

/// One step of the zoom ladder: which series resolution is shown and how
/// wide each slot is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomLevel {
    pub resolution: Resolution,
    pub item_width: f32,
}

impl ZoomLevel {
    pub const fn new(resolution: Resolution, item_width: f32) -> Self {
        Self {
            resolution,
            item_width,
        }
    }

    pub fn ms_per_px(&self) -> f64 {
        self.resolution.as_millis() as f64 / self.item_width as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeTick {
    pub time: DateTime<Utc>,
    pub x: f32,
    pub label: String,
}

pub struct ChartContext {
    width: f32,
    height: f32,
    time_axis_height: f32,
    side_width: f32,
    zoom_levels: Vec<ZoomLevel>,
    zoom_index: usize,
    right_edge: DateTime<Utc>,
    timezone: Tz,
    theme: ChartTheme,
    panes: Vec<PaneContext>,
    gutters: Gutters,
    pointer: Option<Point>,
    redraw: RedrawScheduler,
}

impl ChartContext {
    /// `config` is expected to be validated (see [`ChartConfig::validate`]).
    pub fn new(config: &ChartConfig, right_edge: DateTime<Utc>) -> Self {
        let zoom_levels = if config.zoom_levels.is_empty() {
            ChartConfig::default().zoom_levels
        } else {
            config.zoom_levels.clone()
        };
        let zoom_index = config.initial_zoom.min(zoom_levels.len().saturating_sub(1));
        Self {
            width: 0.0,
            height: 0.0,
            time_axis_height: config.time_axis_height,
            side_width: config.side_width,
            zoom_levels,
            zoom_index,
            right_edge,
            timezone: config.timezone,
            theme: config.theme.clone(),
            panes: Vec::new(),
            gutters: Gutters::default(),
            pointer: None,
            redraw: RedrawScheduler::new(),
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.resize(width, height);
        self
    }

    pub fn with_pane(mut self, pane: PaneContext) -> Self {
        self.add_pane(pane);
        self
    }

    pub fn redraw(&self) -> &RedrawScheduler {
        &self.redraw
    }

    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    pub fn gutters(&self) -> Gutters {
        self.gutters
    }

    pub fn panes(&self) -> &[PaneContext] {
        &self.panes
    }

    pub fn pane(&self, id: &str) -> Option<&PaneContext> {
        self.panes.iter().find(|p| p.id() == id)
    }

    pub fn pane_mut(&mut self, id: &str) -> Option<&mut PaneContext> {
        self.panes.iter_mut().find(|p| p.id() == id)
    }

    /// Empty pane with a right value axis of the configured width.
    pub fn new_pane(&self, id: impl Into<String>, weight: f32) -> PaneContext {
        PaneContext::new(id, weight).with_sides(vec![SideContext::new(SideEdge::Right, self.side_width)])
    }

    pub fn add_pane(&mut self, pane: PaneContext) {
        self.panes.push(pane);
        self.relayout();
        self.redraw.request();
    }

    pub fn remove_pane(&mut self, id: &str) -> bool {
        let before = self.panes.len();
        self.panes.retain(|p| p.id() != id);
        let removed = self.panes.len() != before;
        if removed {
            self.relayout();
            self.redraw.request();
        }
        removed
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.relayout();
        self.redraw.request();
    }

    /// Moves the splitter below pane `index` by `delta_pixels`.
    pub fn resize_panes(&mut self, index: usize, delta_pixels: f32) {
        let mut weights: Vec<f32> = self.panes.iter().map(|p| p.weight).collect();
        ViewController::resize_panes(&mut weights, index, delta_pixels, self.plot_rect().height);
        for (pane, weight) in self.panes.iter_mut().zip(weights) {
            pane.weight = weight;
        }
        self.relayout();
        self.redraw.request();
    }

    fn relayout(&mut self) {
        self.gutters = GutterManager::calculate(&self.panes, self.time_axis_height);
        let plot = self.plot_rect();
        let total_weight: f32 = self.panes.iter().map(|p| p.weight.max(0.0)).sum();
        let count = self.panes.len().max(1) as f32;

        let mut y = plot.origin.y;
        for pane in &mut self.panes {
            let share = if total_weight > 0.0 {
                pane.weight.max(0.0) / total_weight
            } else {
                1.0 / count
            };
            let h = plot.height * share;
            pane.set_bounds(Rect::new(plot.origin.x, y, plot.width, h));
            y += h;
        }
    }

    /// Area shared by all panes, in chart coordinates.
    pub fn plot_rect(&self) -> Rect {
        let g = self.gutters;
        Rect::new(
            g.left,
            g.top,
            (self.width - g.left - g.right).max(0.0),
            (self.height - g.top - g.bottom).max(0.0),
        )
    }

    pub fn zoom_levels(&self) -> &[ZoomLevel] {
        &self.zoom_levels
    }

    pub fn zoom_index(&self) -> usize {
        self.zoom_index
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        self.zoom_levels[self.zoom_index]
    }

    pub fn resolution(&self) -> Resolution {
        self.zoom_level().resolution
    }

    pub fn right_edge(&self) -> DateTime<Utc> {
        self.right_edge
    }

    pub fn mapping(&self) -> TimeAxisMapping {
        let level = self.zoom_level();
        TimeAxisMapping {
            right_edge: self.right_edge,
            plot_width: self.plot_rect().width,
            resolution: level.resolution,
            item_width: level.item_width,
        }
    }

    /// Chart x of `t`.
    pub fn instant_to_x(&self, t: DateTime<Utc>) -> f32 {
        self.gutters.left + self.mapping().instant_to_x(t)
    }

    pub fn x_to_instant(&self, x: f32) -> DateTime<Utc> {
        self.mapping().x_to_instant(x - self.gutters.left)
    }

    pub fn visible_range(&self) -> TimeRange {
        self.mapping().visible_range()
    }

    /// Moves `steps` levels along the zoom ladder (negative zooms in),
    /// keeping the instant under chart x `x` in place.
    pub fn zoom_at(&mut self, x: f32, steps: i32) -> bool {
        let target = ViewController::step_zoom_index(self.zoom_index, steps, self.zoom_levels.len());
        if target == self.zoom_index {
            return false;
        }
        let plot = self.plot_rect();
        let pivot_x = (x - plot.origin.x).clamp(0.0, plot.width);
        let pivot = self.mapping().x_to_instant(pivot_x);

        self.zoom_index = target;
        self.right_edge = ViewController::anchor_right_edge(
            pivot,
            pivot_x,
            plot.width,
            self.zoom_level().ms_per_px(),
        );
        debug!(
            zoom_index = target,
            resolution = %self.resolution(),
            right_edge = %self.right_edge,
            "zoom changed"
        );
        self.redraw.request();
        true
    }

    /// Zooms keeping the right edge pinned.
    pub fn zoom_to(&mut self, index: usize) -> bool {
        let right = self.plot_rect().right();
        let steps = index as i64 - self.zoom_index as i64;
        self.zoom_at(right, steps.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Drags the time axis; positive `dx` reveals older data.
    pub fn pan_by_pixels(&mut self, dx: f32) {
        if dx == 0.0 {
            return;
        }
        self.right_edge = ViewController::pan_time(self.right_edge, dx, self.zoom_level().ms_per_px());
        self.redraw.request();
    }

    /// Pins `t` to the right edge of the plot area.
    pub fn scroll_to(&mut self, t: DateTime<Utc>) {
        self.right_edge = t;
        self.redraw.request();
    }

    /// Middle-button drag over a pane: positive `dy` zooms its value axis
    /// in around `y`. Returns false when no pane is under the pointer.
    pub fn drag_zoom_values(&mut self, x: f32, y: f32, dy: f32) -> bool {
        let point = Point::new(x, y);
        let Some(pane) = self.panes.iter_mut().find(|p| p.bounds().contains(point)) else {
            return false;
        };
        let factor = ViewController::compute_zoom_factor(dy, DRAG_ZOOM_SENSITIVITY);
        pane.zoom_values(y, factor);
        self.redraw.request();
        true
    }

    /// Pulls the visible window into every series and returns the loads the
    /// host has to spawn. Panes with autoscale on are refit afterwards.
    pub fn refresh(&mut self) -> Vec<LoadTask> {
        let resolution = self.resolution();
        // Whole slots, so one cut by the left edge is still drawn.
        let visible = resolution.align_range(&self.visible_range());
        let handle = self.redraw.handle();

        let mut tasks = Vec::new();
        for pane in &mut self.panes {
            for series in pane.series_mut() {
                if let Some(task) = series.refresh(&visible, resolution, &handle) {
                    tasks.push(task);
                }
            }
            if pane.autoscale {
                pane.autoscale(&visible);
            }
        }
        debug!(window = %visible, loads = tasks.len(), "chart refreshed");
        tasks
    }

    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        if self.pointer != pointer {
            self.pointer = pointer;
            self.redraw.request();
        }
    }

    /// Crosshair at the current pointer position.
    pub fn crosshair(&self) -> Option<CrosshairInfo> {
        let p = self.pointer?;
        self.crosshair_at(p.x, p.y)
    }

    /// Looks up the slot, pane, value and per-series items under (x, y).
    pub fn crosshair_at(&self, x: f32, y: f32) -> Option<CrosshairInfo> {
        let point = Point::new(x, y);
        let pane = self.panes.iter().find(|p| p.bounds().contains(point))?;
        let mapping = self.mapping();
        let slot = mapping.slot_at_x(x - self.gutters.left);
        let readings = pane
            .series()
            .iter()
            .filter_map(|s| s.lookup(slot))
            .collect();
        Some(CrosshairInfo {
            x: self.gutters.left + mapping.slot_center_x(slot),
            y,
            slot,
            pane_id: pane.id().to_string(),
            value: pane.y_to_value(y),
            readings,
        })
    }

    /// Labelled instants along the time axis, spaced for readability.
    pub fn time_ticks(&self) -> Vec<TimeTick> {
        let mapping = self.mapping();
        let min_step = mapping.ms_per_px() * MIN_TIME_LABEL_SPACING;
        let step = TIME_TICK_STEPS_MS
            .iter()
            .copied()
            .find(|s| *s as f64 >= min_step)
            .unwrap_or(TIME_TICK_STEPS_MS[TIME_TICK_STEPS_MS.len() - 1]);

        let visible = mapping.visible_range();
        let format = determine_date_format(visible.duration().num_seconds() as f64);
        // Steps are counted on the wall clock of the configured zone.
        let local_ms = |t: DateTime<Utc>| {
            t.with_timezone(&self.timezone)
                .naive_local()
                .and_utc()
                .timestamp_millis()
        };
        let start_ms = local_ms(visible.start());
        let end_ms = local_ms(visible.end());

        let mut ticks = Vec::new();
        let mut ms = start_ms.div_euclid(step) * step;
        if ms < start_ms {
            ms += step;
        }
        while ms < end_ms {
            let time = DateTime::from_timestamp_millis(ms)
                .and_then(|wall| self.timezone.from_local_datetime(&wall.naive_utc()).earliest())
                .map(|local| local.with_timezone(&Utc))
                .filter(|time| visible.contains(*time));
            if let Some(time) = time {
                ticks.push(TimeTick {
                    time,
                    x: self.instant_to_x(time),
                    label: format_instant(time, format, self.timezone),
                });
            }
            ms += step;
        }
        ticks
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.fill_rect(Rect::new(0.0, 0.0, self.width, self.height), self.theme.background);
        let mapping = self.mapping();
        let plot = self.plot_rect();

        for pane in &self.panes {
            let bounds = pane.bounds();
            let mut left_x = bounds.origin.x;
            let mut right_x = bounds.right();
            for side in pane.sides() {
                for tick in side.ticks(pane) {
                    canvas.stroke_line(
                        Point::new(bounds.origin.x, tick.y),
                        Point::new(bounds.right(), tick.y),
                        self.theme.grid_line,
                        1.0,
                    );
                }
                match side.edge {
                    SideEdge::Left => {
                        left_x -= side.width;
                        side.render(pane, left_x, &self.theme, canvas);
                    }
                    SideEdge::Right => {
                        side.render(pane, right_x, &self.theme, canvas);
                        right_x += side.width;
                    }
                }
            }
            pane.render(mapping, canvas);
        }

        let label_y = plot.bottom() + self.time_axis_height / 2.0;
        for tick in self.time_ticks() {
            canvas.text(
                Point::new(tick.x, label_y),
                &tick.label,
                self.theme.axis_label,
                TextAlign::Center,
            );
        }

        if let Some(info) = self.crosshair() {
            let color = self.theme.crosshair_line;
            canvas.stroke_line(
                Point::new(info.x, plot.origin.y),
                Point::new(info.x, plot.bottom()),
                color,
                1.0,
            );
            if let Some(pane) = self.pane(&info.pane_id) {
                let b = pane.bounds();
                canvas.stroke_line(Point::new(b.origin.x, info.y), Point::new(b.right(), info.y), color, 1.0);
                canvas.text(
                    Point::new(b.right() + 4.0, info.y),
                    &pane.scale().format_tick(info.value),
                    self.theme.axis_label,
                    TextAlign::Left,
                );
            }
        }
    }
}
