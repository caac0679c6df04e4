use crate::data_types::AxisRange;
use chrono::{DateTime, Duration, Utc};

/// ViewController holds the interaction math (zoom, pan, resize) as pure
/// functions, independent of the context tree, to facilitate testing.
pub struct ViewController;

impl ViewController {
    /// Pans a value axis by a pixel delta. Positive deltas (downwards) raise
    /// the visible values.
    pub fn pan_axis(range: &mut AxisRange, delta_pixels: f32, total_pixels: f32) {
        if total_pixels <= 0.0 {
            return;
        }
        let ratio = range.span() / total_pixels as f64;
        range.pan(delta_pixels as f64 * ratio);
        range.clamp();
    }

    /// Zooms on an axis at a pivot expressed as a fraction of the domain.
    pub fn zoom_axis_at(range: &mut AxisRange, pivot_pct: f64, factor: f64) {
        let mut new_factor = factor;
        const MIN_SPAN: f64 = 1e-9;

        if range.span() * factor < MIN_SPAN {
            new_factor = MIN_SPAN / range.span();
        }

        let pivot_data = range.min + range.span() * pivot_pct;
        range.zoom_at(pivot_data, pivot_pct, new_factor);
        range.clamp();
    }

    /// Moves the right edge of the time axis by a pixel delta. Dragging to the
    /// right reveals older data.
    pub fn pan_time(right_edge: DateTime<Utc>, delta_pixels: f32, ms_per_px: f64) -> DateTime<Utc> {
        let delta_ms = (delta_pixels as f64 * ms_per_px).round() as i64;
        right_edge - Duration::milliseconds(delta_ms)
    }

    /// Right edge placing `pivot` at `pivot_x` for the given density.
    pub fn anchor_right_edge(
        pivot: DateTime<Utc>,
        pivot_x: f32,
        plot_width: f32,
        ms_per_px: f64,
    ) -> DateTime<Utc> {
        let delta_ms = ((plot_width - pivot_x) as f64 * ms_per_px).round() as i64;
        pivot + Duration::milliseconds(delta_ms)
    }

    /// Zoom index after moving `steps` levels, clamped to the available ones.
    pub fn step_zoom_index(current: usize, steps: i32, level_count: usize) -> usize {
        if level_count == 0 {
            return 0;
        }
        let target = current as i64 + steps as i64;
        target.clamp(0, level_count as i64 - 1) as usize
    }

    /// Resizes two adjacent panes by adjusting their respective weights.
    /// Guarantees that a pane does not disappear completely (minimum weight).
    pub fn resize_panes(weights: &mut [f32], index: usize, delta_pixels: f32, total_height: f32) {
        if index + 1 >= weights.len() || total_height <= 0.0 {
            return;
        }

        let total_weight: f32 = weights.iter().sum();
        let dw = (delta_pixels / total_height) * total_weight;

        const MIN_WEIGHT: f32 = 0.05;
        let w1 = weights[index];
        let w2 = weights[index + 1];

        let actual_dw = if dw > 0.0 {
            dw.min(w2 - MIN_WEIGHT).max(0.0)
        } else {
            dw.max(-(w1 - MIN_WEIGHT)).min(0.0)
        };

        weights[index] = w1 + actual_dw;
        weights[index + 1] = w2 - actual_dw;
    }

    /// Calculates the new bounds for an auto-fit with an optional margin.
    pub fn compute_auto_fit(min: f64, max: f64, margin_pct: f64) -> (f64, f64) {
        if min == f64::INFINITY || max == f64::NEG_INFINITY {
            return (0.0, 100.0);
        }

        let span = if (max - min).abs() < f64::EPSILON {
            1.0
        } else {
            max - min
        };

        (min - span * margin_pct, max + span * margin_pct)
    }

    /// Applies an auto-fit on a given axis.
    pub fn auto_fit_axis(range: &mut AxisRange, data_min: f64, data_max: f64, margin_pct: f64) {
        let (new_min, new_max) = Self::compute_auto_fit(data_min, data_max, margin_pct);
        range.min = new_min;
        range.max = new_max;
        range.clamp();
    }

    /// Calculates a zoom factor based on a wheel delta.
    pub fn compute_zoom_factor(delta: f32, sensitivity: f32) -> f64 {
        let factor = 1.0 + (delta.abs() / sensitivity) as f64;
        if delta > 0.0 {
            1.0 / factor
        } else {
            factor
        }
    }
}
