use super::PlotRenderer;
use crate::data_types::{LinePlotConfig, ValuePoint};
use crate::rendering::{Canvas, Point};
use crate::transform::PlotTransform;

/// Line plot type
#[derive(Clone, Debug, Default)]
pub struct LinePlot {
    pub config: LinePlotConfig,
}

impl LinePlot {
    pub fn new(config: LinePlotConfig) -> Self {
        Self { config }
    }
}

impl PlotRenderer<ValuePoint> for LinePlot {
    fn render(&self, items: &[ValuePoint], transform: &PlotTransform, canvas: &mut dyn Canvas) {
        let mut points: Vec<Point> = Vec::with_capacity(items.len());
        for item in items {
            if !item.value.is_finite() {
                // Missing values break the line.
                if points.len() > 1 {
                    canvas.stroke_polyline(&points, self.config.color, self.config.line_width);
                }
                points.clear();
                continue;
            }
            let p = Point::new(
                transform.slot_center_to_screen(item.time),
                transform.y_data_to_screen(item.value),
            );
            // Skip points landing on the previous pixel.
            if let Some(last) = points.last() {
                if (p.x - last.x).abs() < 0.5 && (p.y - last.y).abs() < 1.0 {
                    continue;
                }
            }
            points.push(p);
        }
        if points.len() > 1 {
            canvas.stroke_polyline(&points, self.config.color, self.config.line_width);
        }
    }
}
