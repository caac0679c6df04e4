use super::pane::PaneContext;
use crate::rendering::{Canvas, Point, TextAlign};
use crate::theme::ChartTheme;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEdge {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub y: f32,
    pub label: String,
}

/// Value-axis gutter on one edge of a pane.
#[derive(Clone, Debug, PartialEq)]
pub struct SideContext {
    pub edge: SideEdge,
    pub width: f32,
    /// Minimum vertical distance between two labels.
    pub min_label_spacing: f32,
    /// Fixed number of decimals; the scale picks one when unset.
    pub precision: Option<usize>,
}

impl SideContext {
    pub fn new(edge: SideEdge, width: f32) -> Self {
        Self {
            edge,
            width,
            min_label_spacing: 30.0,
            precision: None,
        }
    }

    pub fn with_precision(mut self, decimals: usize) -> Self {
        self.precision = Some(decimals);
        self
    }

    pub fn format(&self, pane: &PaneContext, value: f64) -> String {
        match self.precision {
            Some(decimals) => format!("{value:.decimals$}"),
            None => pane.scale().format_tick(value),
        }
    }

    pub fn ticks(&self, pane: &PaneContext) -> Vec<AxisTick> {
        let bounds = pane.bounds();
        let count = (bounds.height / self.min_label_spacing.max(1.0)).floor() as usize;
        if count == 0 {
            return Vec::new();
        }
        pane.scale()
            .ticks(count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                y: pane.value_to_y(value),
                label: self.format(pane, value),
            })
            .filter(|t| t.y >= bounds.origin.y && t.y <= bounds.bottom())
            .collect()
    }

    /// Draws the labels; `x` is the left edge of this gutter.
    pub fn render(&self, pane: &PaneContext, x: f32, theme: &ChartTheme, canvas: &mut dyn Canvas) {
        let (label_x, align) = match self.edge {
            SideEdge::Left => (x + self.width - 4.0, TextAlign::Right),
            SideEdge::Right => (x + 4.0, TextAlign::Left),
        };
        for tick in self.ticks(pane) {
            canvas.text(Point::new(label_x, tick.y), &tick.label, theme.axis_label, align);
        }
    }
}
