use crate::data_types::AxisRange;
use d3rs::scale::{LinearScale, LogScale, Scale as D3Scale};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Log,
}

#[derive(Clone)]
enum Inner {
    Linear(LinearScale),
    Log(LogScale),
}

/// Maps a value domain onto a pixel range (range may be inverted, e.g. for
/// a y axis growing downwards).
#[derive(Clone)]
pub struct ChartScale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f32, f32),
    inner: Inner,
}

impl fmt::Debug for ChartScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartScale")
            .field("kind", &self.kind)
            .field("domain", &self.domain)
            .field("range", &self.range)
            .finish()
    }
}

fn build(kind: ScaleKind, domain: (f64, f64), range: (f32, f32)) -> Inner {
    match kind {
        ScaleKind::Linear => Inner::Linear(
            LinearScale::new()
                .domain(domain.0, domain.1)
                .range(range.0 as f64, range.1 as f64),
        ),
        ScaleKind::Log => Inner::Log(
            LogScale::new()
                .domain(domain.0, domain.1)
                .range(range.0 as f64, range.1 as f64),
        ),
    }
}

fn widen(kind: ScaleKind, min: f64, max: f64) -> (f64, f64) {
    match kind {
        ScaleKind::Log => {
            let d_min = min.max(f64::MIN_POSITIVE);
            let d_max = if max <= d_min { d_min * 10.0 } else { max };
            (d_min, d_max)
        }
        ScaleKind::Linear if (max - min).abs() < f64::EPSILON => (min - 0.5, max + 0.5),
        ScaleKind::Linear => (min, max),
    }
}

impl ChartScale {
    pub fn new_linear(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self::new(ScaleKind::Linear, domain, range)
    }

    pub fn new(kind: ScaleKind, domain: (f64, f64), range: (f32, f32)) -> Self {
        let domain = widen(kind, domain.0, domain.1);
        Self {
            kind,
            domain,
            range,
            inner: build(kind, domain, range),
        }
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn map(&self, value: f64) -> f32 {
        let res = match &self.inner {
            Inner::Linear(s) => s.scale(value) as f32,
            Inner::Log(s) => s.scale(value) as f32,
        };
        if res.is_nan() || res.is_infinite() {
            0.0
        } else {
            res
        }
    }

    pub fn invert(&self, pixel: f32) -> f64 {
        if (self.range.1 - self.range.0).abs() < f32::EPSILON {
            return self.domain.0;
        }
        match &self.inner {
            Inner::Linear(s) => s.invert(pixel as f64).unwrap_or(self.domain.0),
            Inner::Log(s) => s.invert(pixel as f64).unwrap_or(self.domain.0),
        }
    }

    pub fn update_domain(&mut self, min: f64, max: f64) {
        self.domain = widen(self.kind, min, max);
        self.inner = build(self.kind, self.domain, self.range);
    }

    pub fn update_range(&mut self, min: f32, max: f32) {
        self.range = (min, max);
        self.inner = build(self.kind, self.domain, self.range);
    }

    pub fn sync(&mut self, axis: &AxisRange) {
        let (min, max) = axis.clamped_bounds();
        self.update_domain(min, max);
    }

    /// Nicely rounded values spanning the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match &self.inner {
            Inner::Linear(s) => s.ticks(count),
            Inner::Log(s) => s.ticks(count),
        }
    }

    pub fn format_tick(&self, value: f64) -> String {
        if value == 0.0 {
            "0".to_string()
        } else if value.abs() < 0.001 {
            format!("{:.6}", value)
        } else if value.abs() < 1.0 {
            format!("{:.4}", value)
        } else if value.abs() > 1000.0 {
            format!("{:.0}", value)
        } else {
            format!("{:.2}", value)
        }
    }
}
