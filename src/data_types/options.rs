use super::resolution::Resolution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Prefetch margins of a source, counted in slots of its resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Slots that must already be cached beyond each visible edge.
    pub buffer_zone: u32,
    /// Slots beyond each visible edge requested once a load is triggered.
    pub load_zone: u32,
}

impl ZoneConfig {
    pub const fn new(buffer_zone: u32, load_zone: u32) -> Self {
        Self {
            buffer_zone,
            load_zone,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::new(50, 200)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("buffer zone for {0} must be positive")]
    ZeroBufferZone(String),
    #[error("load zone for {0} must be positive")]
    ZeroLoadZone(String),
    #[error("load zone ({load}) for {resolution} is smaller than its buffer zone ({buffer})")]
    LoadZoneTooSmall {
        resolution: String,
        buffer: u32,
        load: u32,
    },
}

/// Resolution-dependent buffer/load zones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesSourceOptions {
    #[serde(default)]
    pub default: ZoneConfig,
    #[serde(default)]
    pub zones: BTreeMap<Resolution, ZoneConfig>,
}

impl Default for SeriesSourceOptions {
    fn default() -> Self {
        let mut zones = BTreeMap::new();
        // Coarse series are short; fetching them in big batches wastes requests.
        zones.insert(Resolution::Day1, ZoneConfig::new(20, 100));
        zones.insert(Resolution::Week1, ZoneConfig::new(10, 50));
        Self {
            default: ZoneConfig::default(),
            zones,
        }
    }
}

impl SeriesSourceOptions {
    pub fn uniform(zone: ZoneConfig) -> Self {
        Self {
            default: zone,
            zones: BTreeMap::new(),
        }
    }

    pub fn with_zone(mut self, resolution: Resolution, zone: ZoneConfig) -> Self {
        self.zones.insert(resolution, zone);
        self
    }

    pub fn zones_for(&self, resolution: Resolution) -> ZoneConfig {
        self.zones.get(&resolution).copied().unwrap_or(self.default)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        check_zone("default", &self.default)?;
        for (resolution, zone) in &self.zones {
            check_zone(resolution.as_str(), zone)?;
        }
        Ok(())
    }
}

fn check_zone(name: &str, zone: &ZoneConfig) -> Result<(), OptionsError> {
    if zone.buffer_zone == 0 {
        return Err(OptionsError::ZeroBufferZone(name.to_string()));
    }
    if zone.load_zone == 0 {
        return Err(OptionsError::ZeroLoadZone(name.to_string()));
    }
    if zone.load_zone < zone.buffer_zone {
        return Err(OptionsError::LoadZoneTooSmall {
            resolution: name.to_string(),
            buffer: zone.buffer_zone,
            load: zone.load_zone,
        });
    }
    Ok(())
}
