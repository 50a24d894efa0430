use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use crate::data::{Column, DataType, Dataset};
use crate::sink::FigureSink;
use crate::stats::{summarize_categorical, summarize_numeric};
use crate::table::{format_stat, format_timestamp, TextTable};
use crate::visualizer::Visualizer;

/// Prints a text report about a dataset, then hands it to the visualizer
#[derive(Debug, Clone)]
pub struct Explorer {
    visualizer: Visualizer,
}

impl Explorer {
    pub fn new(visualizer: Visualizer) -> Self {
        Explorer { visualizer }
    }

    /// Shape, missing values, duplicates and per-type summaries, followed by all figures
    pub fn explore(
        &self,
        dataset: &mut Dataset,
        out: &mut dyn Write,
        sink: &mut dyn FigureSink,
    ) -> Result<()> {
        self.report(dataset, out)?;
        self.visualizer.visualize(dataset, out, sink)
    }

    /// The text part of `explore`
    pub fn report(&self, dataset: &Dataset, out: &mut dyn Write) -> Result<()> {
        show_shape(dataset, out)?;
        show_missing(dataset, out)?;
        show_duplicates(dataset, out)?;
        show_summaries(dataset, out)?;
        Ok(())
    }
}

/// `There are no ...`, `There is 1 ...`, `There are N ...`
fn count_sentence(count: usize, noun: &str) -> String {
    match count {
        0 => format!("There are no {}s in the dataset.", noun),
        1 => format!("There is 1 {} in the dataset.", noun),
        n => format!("There are {} {}s in the dataset.", n, noun),
    }
}

pub fn show_shape(dataset: &Dataset, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "The dataset has {} rows and {} columns.",
        dataset.n_rows(),
        dataset.n_columns()
    )
    .context("Failed to write report")
}

/// Total missing count, plus a per-column table of the columns that have any
pub fn show_missing(dataset: &Dataset, out: &mut dyn Write) -> Result<()> {
    let counts: Vec<(&str, usize)> = dataset
        .missing_counts()
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();

    writeln!(out, "{}", count_sentence(total, "missing value")).context("Failed to write report")?;
    if total > 0 {
        let mut table = TextTable::new(["count"]);
        for (name, n) in counts {
            table.push_row(name, vec![n.to_string()]);
        }
        write!(out, "{}", table).context("Failed to write report")?;
    }
    Ok(())
}

/// Rows equal to an earlier row, with missing values comparing equal
pub fn show_duplicates(dataset: &Dataset, out: &mut dyn Write) -> Result<()> {
    let duplicated: Vec<usize> = dataset
        .duplicated()
        .into_iter()
        .enumerate()
        .filter_map(|(row, dup)| dup.then_some(row))
        .collect();

    writeln!(out, "{}", count_sentence(duplicated.len(), "duplicate row"))
        .context("Failed to write report")?;
    if !duplicated.is_empty() {
        let mut table = TextTable::new(dataset.columns().iter().map(Column::name));
        for row in duplicated {
            table.push_row(row.to_string(), dataset.row_values(row));
        }
        write!(out, "{}", table).context("Failed to write report")?;
    }
    Ok(())
}

/// One describe table per data type, in order of first appearance
pub fn show_summaries(dataset: &Dataset, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Variable types and summary statistics:").context("Failed to write report")?;
    for data_type in dataset.data_types() {
        let columns = dataset.columns_of_type(data_type);
        if columns.is_empty() {
            continue;
        }
        debug!("Describing {} {} column(s)", columns.len(), data_type);
        writeln!(out, "\n{} variables:", data_type).context("Failed to write report")?;
        write!(out, "{}", describe(data_type, &columns)).context("Failed to write report")?;
    }
    Ok(())
}

/// Descriptive statistics for columns sharing one data type
pub fn describe(data_type: DataType, columns: &[&Column]) -> TextTable {
    match data_type {
        DataType::Integer | DataType::Float => {
            let mut table =
                TextTable::new(["count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
            for column in columns {
                let s = summarize_numeric(&column.data().numeric_values());
                let cells = [s.count as f64, s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max]
                    .into_iter()
                    .map(format_stat)
                    .collect();
                table.push_row(column.name(), cells);
            }
            table
        }
        DataType::Text | DataType::Boolean => {
            let mut table = TextTable::new(["count", "unique", "top", "freq"]);
            for column in columns {
                let s = summarize_categorical(column.data());
                table.push_row(
                    column.name(),
                    vec![
                        s.count.to_string(),
                        s.unique.to_string(),
                        s.top.unwrap_or_else(|| "NaN".to_string()),
                        s.freq.map_or_else(|| "NaN".to_string(), |f| f.to_string()),
                    ],
                );
            }
            table
        }
        DataType::DateTime | DataType::Date => {
            let mut table = TextTable::new(["count", "mean", "min", "25%", "50%", "75%", "max"]);
            for column in columns {
                let s = summarize_numeric(&column.data().numeric_values());
                let mut cells = vec![s.count.to_string()];
                cells.extend(
                    [s.mean, s.min, s.q25, s.q50, s.q75, s.max]
                        .into_iter()
                        .map(format_timestamp),
                );
                table.push_row(column.name(), cells);
            }
            table
        }
    }
}
