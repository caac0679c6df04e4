use crate::theme::{ChartTheme, Color};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinePlotConfig {
    pub color: Color,
    pub line_width: f32,
}

impl LinePlotConfig {
    pub fn from_theme(theme: &ChartTheme) -> Self {
        Self {
            color: theme.line,
            line_width: 2.0,
        }
    }
}

impl Default for LinePlotConfig {
    fn default() -> Self {
        Self::from_theme(&ChartTheme::default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandlestickConfig {
    pub up_color: Color,
    pub down_color: Color,
    /// Body width as a fraction of the slot width.
    pub body_width_pct: f32,
    pub wick_width: f32,
}

impl CandlestickConfig {
    pub fn from_theme(theme: &ChartTheme) -> Self {
        Self {
            up_color: theme.up,
            down_color: theme.down,
            body_width_pct: 0.8,
            wick_width: 1.0,
        }
    }
}

impl Default for CandlestickConfig {
    fn default() -> Self {
        Self::from_theme(&ChartTheme::default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangePlotConfig {
    pub fill: Color,
    pub edge: Color,
    pub edge_width: f32,
}

impl RangePlotConfig {
    pub fn from_theme(theme: &ChartTheme) -> Self {
        Self {
            fill: theme.range_fill,
            edge: theme.range_edge,
            edge_width: 1.0,
        }
    }
}

impl Default for RangePlotConfig {
    fn default() -> Self {
        Self::from_theme(&ChartTheme::default())
    }
}
