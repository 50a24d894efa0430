// Library exports for edaview

pub mod config;
pub mod csv_reader;
pub mod data;
pub mod explorer;
pub mod graph;
pub mod ir;
pub mod layout;
pub mod plan;
pub mod scale;
pub mod sink;
pub mod stats;
pub mod table;
pub mod theme;
pub mod visualizer;

pub use config::VisualizerConfig;
pub use data::{Column, ColumnData, ColumnKind, DataType, Dataset};
pub use explorer::Explorer;
pub use sink::{DirectorySink, FigureSink, RenderedFigure};
pub use visualizer::Visualizer;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RenderOptions {
    /// Pixels per figure unit
    #[serde(default = "default_pixels_per_unit")]
    pub pixels_per_unit: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_pixels_per_unit() -> u32 { 100 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixels_per_unit: 100,
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Pixel size of a figure measured in figure units
    pub fn pixel_size(&self, width_units: f64, height_units: f64) -> (u32, u32) {
        let ppu = self.pixels_per_unit as f64;
        (
            ((width_units * ppu).round() as u32).max(1),
            ((height_units * ppu).round() as u32).max(1),
        )
    }
}
