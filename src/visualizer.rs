use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info, warn};

use crate::config::VisualizerConfig;
use crate::data::{ColumnKind, Dataset};
use crate::graph::render_figure;
use crate::ir::FigurePlan;
use crate::plan::{plan_correlation, plan_distributions};
use crate::sink::{FigureSink, RenderedFigure};
use crate::theme::Style;

/// Draws distribution figures per column kind and a correlation heatmap
#[derive(Debug, Clone)]
pub struct Visualizer {
    config: VisualizerConfig,
    style: Style,
}

impl Visualizer {
    /// Validate the config and resolve its style once
    pub fn new(config: VisualizerConfig) -> Result<Self> {
        config.validate().context("Invalid visualizer config")?;
        let style = config.resolve_style()?;
        Ok(Visualizer { config, style })
    }

    /// Numeric, categorical and temporal distribution passes, then the correlation pass.
    /// Datetime columns are truncated to dates in place before the temporal pass.
    pub fn visualize(
        &self,
        dataset: &mut Dataset,
        out: &mut dyn Write,
        sink: &mut dyn FigureSink,
    ) -> Result<()> {
        for kind in ColumnKind::ALL {
            if kind == ColumnKind::Temporal {
                let normalized = dataset.normalize_temporal_to_dates();
                if normalized > 0 {
                    debug!("Truncated {} datetime column(s) to dates", normalized);
                }
            }
            self.plot_distributions(kind, dataset, out, sink)?;
        }

        self.plot_correlation(dataset, sink)?;
        Ok(())
    }

    /// One grid figure for every column of `kind`. Returns `false` when the bucket is empty.
    pub fn plot_distributions(
        &self,
        kind: ColumnKind,
        dataset: &Dataset,
        out: &mut dyn Write,
        sink: &mut dyn FigureSink,
    ) -> Result<bool> {
        let columns = dataset.columns_of_kind(kind);
        let Some(plan) = plan_distributions(kind, &columns, &self.config) else {
            debug!("No {} columns, skipping", kind.name());
            return Ok(false);
        };

        if plan.truncated {
            let message = format!(
                "Too many columns to plot. Showing the first {} plots.",
                self.config.max_plots
            );
            warn!("{}", message);
            writeln!(out, "{}", message).context("Failed to write report")?;
        }

        self.emit(&plan.figure, sink)?;
        Ok(true)
    }

    /// Lower-triangle heatmap of numeric correlations. Returns `false` when skipped.
    pub fn plot_correlation(&self, dataset: &Dataset, sink: &mut dyn FigureSink) -> Result<bool> {
        match plan_correlation(dataset, &self.config) {
            Some(figure) => {
                self.emit(&figure, sink)?;
                Ok(true)
            }
            None => {
                debug!("Fewer than two rows or numeric columns, skipping correlation");
                Ok(false)
            }
        }
    }

    fn emit(&self, figure: &FigurePlan, sink: &mut dyn FigureSink) -> Result<()> {
        let name = figure.kind.name();
        let bytes = render_figure(figure, &self.style, &self.config.render)
            .with_context(|| format!("Failed to render {}", name))?;
        info!(
            "Rendered {} ({} panels, {}x{} grid)",
            name,
            figure.panels().count(),
            figure.grid.rows,
            figure.grid.columns
        );
        sink.emit(RenderedFigure {
            name,
            format: self.config.render.format,
            bytes,
        })
    }
}
