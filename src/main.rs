use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use edaview::csv_reader;
use edaview::theme::StyleName;
use edaview::{Dataset, DirectorySink, Explorer, OutputFormat, Visualizer, VisualizerConfig};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI-compatible style preset
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStyle {
    /// Gray panels with white grid lines
    Darkgrid,
    /// White panels with gray grid lines
    Whitegrid,
    /// Gray panels, no grid
    Dark,
    /// White panels, no grid
    White,
}

impl From<CliStyle> for StyleName {
    fn from(cli: CliStyle) -> Self {
        match cli {
            CliStyle::Darkgrid => StyleName::Darkgrid,
            CliStyle::Whitegrid => StyleName::Whitegrid,
            CliStyle::Dark => StyleName::Dark,
            CliStyle::White => StyleName::White,
        }
    }
}

/// CLI-compatible image format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Png,
    Svg,
}

impl From<CliFormat> for OutputFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Png => OutputFormat::Png,
            CliFormat::Svg => OutputFormat::Svg,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "edaview")]
#[command(about = "Summarize a CSV dataset and plot its column distributions", long_about = None)]
struct Args {
    /// CSV file, or JSON array of records (`.json`), to explore. Reads CSV from stdin when omitted
    input: Option<PathBuf>,

    /// JSON file with visualizer settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the rendered figures
    #[arg(short, long, default_value = "figures")]
    out_dir: PathBuf,

    /// Image format of the figures
    #[arg(short, long, value_enum)]
    format: Option<CliFormat>,

    /// Plots per figure before truncating
    #[arg(long)]
    max_plots: Option<usize>,

    /// Grid columns per figure row
    #[arg(long)]
    columns_per_row: Option<usize>,

    /// Edge length of one grid cell, in figure units
    #[arg(long)]
    figure_size: Option<u32>,

    /// Distinct categories shown before switching to a top-K plot
    #[arg(long)]
    max_unique_labels: Option<usize>,

    /// Label length that triggers rotated tick labels
    #[arg(long)]
    max_label_length: Option<usize>,

    /// Plot style preset
    #[arg(long, value_enum)]
    style: Option<CliStyle>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    fn visualizer_config(&self) -> Result<VisualizerConfig> {
        let mut config = match &self.config {
            Some(path) => VisualizerConfig::from_json_file(path)?,
            None => VisualizerConfig::default(),
        };

        if let Some(format) = self.format {
            config.render.format = format.into();
        }
        if let Some(n) = self.max_plots {
            config.max_plots = n;
        }
        if let Some(n) = self.columns_per_row {
            config.columns_per_row = n;
        }
        if let Some(n) = self.figure_size {
            config.figure_size = n;
        }
        if let Some(n) = self.max_unique_labels {
            config.max_unique_labels = n;
        }
        if let Some(n) = self.max_label_length {
            config.max_label_length = n;
        }
        if let Some(style) = self.style {
            config.style = style.into();
        }
        Ok(config)
    }
}

/// CSV by default; `.json` files hold an array of records
fn load_dataset(input: Option<&Path>) -> Result<Dataset> {
    let Some(path) = input else {
        let csv_data = csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;
        return Dataset::from_csv(csv_data);
    };

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let text = fs::read_to_string(path)
            .with_context(|| format!("File not found or unreadable: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON file {}", path.display()))?;
        Dataset::from_json(&value).with_context(|| format!("Invalid records in {}", path.display()))
    } else {
        Dataset::from_csv(csv_reader::read_csv_file(path)?)
    }
}

/// Logs go to stderr; stdout carries the report
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = args.visualizer_config()?;
    debug!("Using config {:?}", config);
    let explorer = Explorer::new(Visualizer::new(config)?);

    let mut dataset = load_dataset(args.input.as_deref())?;
    info!(
        "Loaded {} rows x {} columns",
        dataset.n_rows(),
        dataset.n_columns()
    );

    let mut sink = DirectorySink::create(&args.out_dir)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    explorer
        .explore(&mut dataset, &mut handle, &mut sink)
        .context("Failed to explore dataset")?;
    handle.flush().context("Failed to flush stdout")?;

    info!(
        "Wrote {} figure(s) to {}",
        sink.written().len(),
        args.out_dir.display()
    );
    Ok(())
}
