use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid hex color: {0:?}")]
pub struct ColorParseError(pub String);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if hex.len() == 8 { byte(6)? } else { 255 },
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    pub background: Color,
    pub grid_line: Color,
    pub axis_label: Color,
    pub crosshair_line: Color,
    pub up: Color,
    pub down: Color,
    pub line: Color,
    pub range_fill: Color,
    pub range_edge: Color,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x13, 0x17, 0x22),
            grid_line: Color::rgb(0xff, 0xff, 0xff).with_alpha(0x1a),
            axis_label: Color::rgb(0xff, 0xff, 0xff).with_alpha(0xcc),
            crosshair_line: Color::rgb(0xff, 0xff, 0xff).with_alpha(0x4d),
            up: Color::rgb(0x26, 0xa6, 0x9a),
            down: Color::rgb(0xef, 0x53, 0x50),
            line: Color::rgb(0x29, 0x62, 0xff),
            range_fill: Color::rgb(0x29, 0x62, 0xff).with_alpha(0x33),
            range_edge: Color::rgb(0x29, 0x62, 0xff).with_alpha(0x99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_keeps_alpha() {
        let c: Color = "#2962ff33".parse().unwrap();
        assert_eq!(c, Color::rgb(0x29, 0x62, 0xff).with_alpha(0x33));
        assert_eq!(c.to_string(), "#2962ff33");
        assert!("2962ff".parse::<Color>().is_err());
        assert!("#29g2ff".parse::<Color>().is_err());
    }
}
