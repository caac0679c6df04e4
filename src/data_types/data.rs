use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, time-stamped element of a series.
///
/// Items are ordered by `timestamp()`; a series never holds two items with the
/// same timestamp.
pub trait SeriesItem: Clone + Send + Sync + 'static {
    fn timestamp(&self) -> DateTime<Utc>;

    /// (min, max) of the values this item contributes to the value axis.
    fn value_bounds(&self) -> Option<(f64, f64)>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Body edges as (top, bottom) in value space.
    pub fn body(&self) -> (f64, f64) {
        if self.is_up() {
            (self.close, self.open)
        } else {
            (self.open, self.close)
        }
    }
}

impl SeriesItem for Candle {
    fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }

    fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.low.is_finite() && self.high.is_finite() {
            Some((self.low, self.high))
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl SeriesItem for ValuePoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }

    fn value_bounds(&self) -> Option<(f64, f64)> {
        self.value.is_finite().then_some((self.value, self.value))
    }
}

/// A band between two values, e.g. a Bollinger envelope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub time: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
}

impl SeriesItem for RangePoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }

    fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.low.is_finite() && self.high.is_finite() {
            Some((self.low.min(self.high), self.low.max(self.high)))
        } else {
            None
        }
    }
}

/// Union of the value bounds of `items`.
pub fn value_bounds_of<T: SeriesItem>(items: &[T]) -> Option<(f64, f64)> {
    items
        .iter()
        .filter_map(SeriesItem::value_bounds)
        .fold(None, |acc, (lo, hi)| match acc {
            None => Some((lo, hi)),
            Some((a, b)) => Some((a.min(lo), b.max(hi))),
        })
}
