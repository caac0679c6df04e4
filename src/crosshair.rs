use crate::data_types::{Candle, RangePoint, ValuePoint};
use chrono::{DateTime, Utc};

/// What a series shows at the crosshair slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesValue {
    Candle(Candle),
    Value(f64),
    Range { low: f64, high: f64 },
}

impl From<Candle> for SeriesValue {
    fn from(c: Candle) -> Self {
        Self::Candle(c)
    }
}

impl From<ValuePoint> for SeriesValue {
    fn from(p: ValuePoint) -> Self {
        Self::Value(p.value)
    }
}

impl From<RangePoint> for SeriesValue {
    fn from(p: RangePoint) -> Self {
        Self::Range {
            low: p.low,
            high: p.high,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesReading {
    pub series_id: String,
    pub time: DateTime<Utc>,
    pub value: SeriesValue,
}

/// Result of a crosshair lookup at a pixel position.
#[derive(Clone, Debug, PartialEq)]
pub struct CrosshairInfo {
    /// Pointer position snapped to the slot center horizontally.
    pub x: f32,
    pub y: f32,
    /// Start of the slot under the pointer.
    pub slot: DateTime<Utc>,
    pub pane_id: String,
    /// Value of the pane axis at `y`.
    pub value: f64,
    pub readings: Vec<SeriesReading>,
}

impl CrosshairInfo {
    pub fn reading(&self, series_id: &str) -> Option<&SeriesReading> {
        self.readings.iter().find(|r| r.series_id == series_id)
    }
}
