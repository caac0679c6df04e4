use super::PlotRenderer;
use crate::data_types::{RangePlotConfig, RangePoint};
use crate::rendering::{Canvas, Point};
use crate::transform::PlotTransform;

/// Filled band between the low and high values of each item.
#[derive(Clone, Debug, Default)]
pub struct RangePlot {
    pub config: RangePlotConfig,
}

impl RangePlot {
    pub fn new(config: RangePlotConfig) -> Self {
        Self { config }
    }
}

impl PlotRenderer<RangePoint> for RangePlot {
    fn render(&self, items: &[RangePoint], transform: &PlotTransform, canvas: &mut dyn Canvas) {
        if items.len() < 2 {
            return;
        }
        let highs: Vec<Point> = items
            .iter()
            .map(|i| {
                Point::new(
                    transform.slot_center_to_screen(i.time),
                    transform.y_data_to_screen(i.high),
                )
            })
            .collect();
        let lows: Vec<Point> = items
            .iter()
            .map(|i| {
                Point::new(
                    transform.slot_center_to_screen(i.time),
                    transform.y_data_to_screen(i.low),
                )
            })
            .collect();

        let mut outline = highs.clone();
        outline.extend(lows.iter().rev().copied());
        canvas.fill_polygon(&outline, self.config.fill);
        canvas.stroke_polyline(&highs, self.config.edge, self.config.edge_width);
        canvas.stroke_polyline(&lows, self.config.edge, self.config.edge_width);
    }
}
