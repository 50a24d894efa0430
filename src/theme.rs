//! Plot styles
//!
//! A style is a plain value handed to the renderer; nothing here touches global state.
//! Presets follow the familiar seaborn names:
//! ```text
//! darkgrid   gray panel, white grid lines
//! whitegrid  white panel, light gray grid lines
//! dark       gray panel, no grid
//! white      white panel, no grid
//! ```

use anyhow::{anyhow, Result};
use plotters::style::RGBColor;
use serde::Deserialize;

/// Named style preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleName {
    #[default]
    Darkgrid,
    Whitegrid,
    Dark,
    White,
}

/// Fully resolved style ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub figure_background: RGBColor,
    pub panel_background: RGBColor,
    /// `None` hides grid lines
    pub grid: Option<RGBColor>,
    pub text: RGBColor,
    pub bar_fill: RGBColor,
    pub font_family: String,
    pub diverging: DivergingPalette,
}

impl Style {
    pub fn resolve(name: StyleName, bar_color: Option<&str>) -> Result<Self> {
        let gray_panel = RGBColor(234, 234, 242);
        let (panel_background, grid) = match name {
            StyleName::Darkgrid => (gray_panel, Some(RGBColor(255, 255, 255))),
            StyleName::Whitegrid => (RGBColor(255, 255, 255), Some(RGBColor(204, 204, 204))),
            StyleName::Dark => (gray_panel, None),
            StyleName::White => (RGBColor(255, 255, 255), None),
        };

        let bar_fill = match bar_color {
            Some(c) => parse_color(c).ok_or_else(|| anyhow!("Unknown color '{}'", c))?,
            None => RGBColor(76, 114, 176),
        };

        Ok(Style {
            figure_background: RGBColor(255, 255, 255),
            panel_background,
            grid,
            text: RGBColor(38, 38, 38),
            bar_fill,
            font_family: "sans-serif".to_string(),
            diverging: DivergingPalette::default(),
        })
    }
}

impl Default for Style {
    fn default() -> Self {
        Style {
            figure_background: RGBColor(255, 255, 255),
            panel_background: RGBColor(234, 234, 242),
            grid: Some(RGBColor(255, 255, 255)),
            text: RGBColor(38, 38, 38),
            bar_fill: RGBColor(76, 114, 176),
            font_family: "sans-serif".to_string(),
            diverging: DivergingPalette::default(),
        }
    }
}

/// Blue to light gray to red
#[derive(Debug, Clone, PartialEq)]
pub struct DivergingPalette {
    pub low: RGBColor,
    pub mid: RGBColor,
    pub high: RGBColor,
}

impl Default for DivergingPalette {
    fn default() -> Self {
        DivergingPalette {
            low: RGBColor(58, 108, 180),
            mid: RGBColor(242, 242, 242),
            high: RGBColor(194, 64, 58),
        }
    }
}

impl DivergingPalette {
    /// Color for `value` on a scale spanning `center ± limit`; values outside are clamped
    pub fn color(&self, value: f64, center: f64, limit: f64) -> RGBColor {
        if limit <= 0.0 || value.is_nan() {
            return self.mid;
        }
        let t = ((value - center) / limit).clamp(-1.0, 1.0);
        if t < 0.0 {
            lerp(self.mid, self.low, -t)
        } else {
            lerp(self.mid, self.high, t)
        }
    }
}

fn lerp(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

// === Color Parsing ===

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(139, 69, 19)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
        "steelblue" => Some(RGBColor(70, 130, 180)),
        s if s.starts_with("gray") || s.starts_with("grey") => {
            // gray0 = black, gray100 = white
            let n = s[4..].parse::<u8>().ok().filter(|n| *n <= 100)?;
            let v = (n as f64 * 2.55).round() as u8;
            Some(RGBColor(v, v, v))
        }
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}
