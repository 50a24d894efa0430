use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::theme::{Style, StyleName};
use crate::RenderOptions;

/// Tunables for the visualizer, fixed at construction time
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VisualizerConfig {
    /// Plots drawn per column bucket before truncating
    #[serde(default = "default_max_plots")]
    pub max_plots: usize,
    #[serde(default = "default_columns_per_row")]
    pub columns_per_row: usize,
    /// Base edge length of one grid cell, in figure units
    #[serde(default = "default_figure_size")]
    pub figure_size: u32,
    /// Distinct categories shown before switching to a top-K plot
    #[serde(default = "default_max_unique_labels")]
    pub max_unique_labels: usize,
    /// Category labels longer than this rotate the x tick labels
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,
    #[serde(default)]
    pub style: StyleName,
    /// Bar fill color (named or hex); the style's default when unset
    #[serde(default)]
    pub bar_color: Option<String>,
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_max_plots() -> usize { 30 }
fn default_columns_per_row() -> usize { 3 }
fn default_figure_size() -> u32 { 5 }
fn default_max_unique_labels() -> usize { 10 }
fn default_max_label_length() -> usize { 8 }

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            max_plots: default_max_plots(),
            columns_per_row: default_columns_per_row(),
            figure_size: default_figure_size(),
            max_unique_labels: default_max_unique_labels(),
            max_label_length: default_max_label_length(),
            style: StyleName::default(),
            bar_color: None,
            render: RenderOptions::default(),
        }
    }
}

impl VisualizerConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("max_plots", self.max_plots),
            ("columns_per_row", self.columns_per_row),
            ("figure_size", self.figure_size as usize),
            ("max_unique_labels", self.max_unique_labels),
            ("pixels_per_unit", self.render.pixels_per_unit as usize),
        ];
        for (name, value) in checks {
            if value == 0 {
                anyhow::bail!("Config value '{}' must be at least 1", name);
            }
        }
        self.resolve_style()?;
        Ok(())
    }

    /// The concrete style this config describes
    pub fn resolve_style(&self) -> Result<Style> {
        Style::resolve(self.style, self.bar_color.as_deref())
    }
}
