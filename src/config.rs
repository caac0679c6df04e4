//! Chart configuration loaded from JSON.

use crate::context::ZoomLevel;
use crate::data_types::{Resolution, SeriesSourceOptions};
use crate::rest::RestEndpointConfig;
use crate::theme::ChartTheme;
use chrono_tz::Tz;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub source: SeriesSourceOptions,
    /// Ordered from the most zoomed in to the most zoomed out.
    pub zoom_levels: Vec<ZoomLevel>,
    pub initial_zoom: usize,
    pub timezone: Tz,
    pub time_axis_height: f32,
    pub side_width: f32,
    pub theme: ChartTheme,
    pub endpoint: Option<RestEndpointConfig>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            source: SeriesSourceOptions::default(),
            zoom_levels: vec![
                ZoomLevel::new(Resolution::Minute1, 12.0),
                ZoomLevel::new(Resolution::Minute1, 6.0),
                ZoomLevel::new(Resolution::Minute5, 8.0),
                ZoomLevel::new(Resolution::Minute15, 8.0),
                ZoomLevel::new(Resolution::Hour1, 8.0),
                ZoomLevel::new(Resolution::Hour4, 8.0),
                ZoomLevel::new(Resolution::Day1, 8.0),
                ZoomLevel::new(Resolution::Week1, 8.0),
            ],
            initial_zoom: 2,
            timezone: Tz::UTC,
            time_axis_height: 24.0,
            side_width: 60.0,
            theme: ChartTheme::default(),
            endpoint: None,
        }
    }
}

impl ChartConfig {
    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(json).wrap_err("failed to parse chart config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read chart config {}", path.display()))?;
        Self::from_json_str(&json).wrap_err_with(|| format!("invalid chart config {}", path.display()))
    }

    pub fn validate(&self) -> eyre::Result<()> {
        self.source.validate().wrap_err("invalid source options")?;
        eyre::ensure!(!self.zoom_levels.is_empty(), "at least one zoom level is required");
        if let Some(bad) = self
            .zoom_levels
            .iter()
            .find(|l| !(l.item_width.is_finite() && l.item_width > 0.0))
        {
            eyre::bail!("zoom level {} has a non-positive item width {}", bad.resolution, bad.item_width);
        }
        eyre::ensure!(
            self.initial_zoom < self.zoom_levels.len(),
            "initial zoom {} is past the last zoom level {}",
            self.initial_zoom,
            self.zoom_levels.len() - 1
        );
        eyre::ensure!(
            self.time_axis_height >= 0.0 && self.side_width >= 0.0,
            "gutter sizes must not be negative"
        );
        if let Some(endpoint) = &self.endpoint {
            eyre::ensure!(endpoint.page_limit > 0, "endpoint page_limit must be positive");
        }
        Ok(())
    }
}
