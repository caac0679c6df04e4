use super::PlotRenderer;
use crate::data_types::{Candle, CandlestickConfig};
use crate::rendering::{Canvas, Point, Rect};
use crate::transform::PlotTransform;

/// Candlestick plot type
#[derive(Clone, Debug, Default)]
pub struct CandlestickPlot {
    pub config: CandlestickConfig,
}

impl CandlestickPlot {
    pub fn new(config: CandlestickConfig) -> Self {
        Self { config }
    }

    /// Body width in pixels for a slot of `item_width` pixels.
    pub fn body_width(&self, item_width: f32) -> f32 {
        (item_width * self.config.body_width_pct).floor().max(1.0)
    }
}

impl PlotRenderer<Candle> for CandlestickPlot {
    fn render(&self, items: &[Candle], transform: &PlotTransform, canvas: &mut dyn Canvas) {
        let body_w = self.body_width(transform.time.item_width);
        let left = transform.bounds.origin.x;
        let right = transform.bounds.right();

        for candle in items {
            let x_center = transform.slot_center_to_screen(candle.time).round();
            if x_center + body_w < left || x_center - body_w > right {
                continue;
            }
            let color = if candle.is_up() {
                self.config.up_color
            } else {
                self.config.down_color
            };

            let y_high = transform.y_data_to_screen(candle.high);
            let y_low = transform.y_data_to_screen(candle.low);
            canvas.stroke_line(
                Point::new(x_center, y_high),
                Point::new(x_center, y_low),
                color,
                self.config.wick_width,
            );

            let (top, bottom) = candle.body();
            let y_top = transform.y_data_to_screen(top);
            let y_bottom = transform.y_data_to_screen(bottom);
            let (y0, y1) = if y_top <= y_bottom {
                (y_top, y_bottom)
            } else {
                (y_bottom, y_top)
            };
            // Doji candles still get a visible body.
            let height = (y1 - y0).max(1.0);
            canvas.fill_rect(Rect::new(x_center - body_w / 2.0, y0, body_w, height), color);
        }
    }
}
