//! Plain-text tables for the console report.
//!
//! Layout mirrors a data-frame printout: a left-aligned index column followed by
//! right-aligned value columns, each padded to its widest cell.
//! ```text
//!        count
//! price      2
//! color      1
//! ```

use std::fmt;

use crate::data::days_to_datetime;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl TextTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        TextTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells print empty.
    pub fn push_row(&mut self, index: impl Into<String>, cells: Vec<String>) {
        self.rows.push((index.into(), cells));
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self
            .rows
            .iter()
            .map(|(index, _)| index.chars().count())
            .max()
            .unwrap_or(0);

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .filter_map(|(_, cells)| cells.get(col))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:<index_width$}", "")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(f, "  {:>width$}", header)?;
        }
        writeln!(f)?;

        for (index, cells) in &self.rows {
            write!(f, "{:<index_width$}", index)?;
            for (col, width) in widths.iter().enumerate() {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                write!(f, "  {:>width$}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Statistic cell: `NaN` for undefined values, otherwise up to six decimals
/// with at least one kept (`2.0`, `0.333333`)
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{:.6}", value);
    let trimmed = text.trim_end_matches('0');
    let trimmed = if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    };
    if trimmed == "-0.0" {
        "0.0".to_string()
    } else {
        trimmed
    }
}

/// Temporal statistic cell; the time of day is omitted at midnight
pub fn format_timestamp(days: f64) -> String {
    if days.is_nan() {
        return "NaT".to_string();
    }
    match days_to_datetime(days) {
        Some(dt) if dt.time() == chrono::NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "NaT".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let mut table = TextTable::new(["count"]);
        table.push_row("price", vec!["2".to_string()]);
        table.push_row("c", vec!["10".to_string()]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["       count", "price      2", "c         10"]);
    }

    #[test]
    fn test_short_rows_pad_empty() {
        let mut table = TextTable::new(["a", "b"]);
        table.push_row("0", vec!["x".to_string()]);
        assert_eq!(table.to_string().lines().nth(1), Some("0  x   "));
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(2.0), "2.0");
        assert_eq!(format_stat(1.0 / 3.0), "0.333333");
        assert_eq!(format_stat(-0.0), "0.0");
        assert_eq!(format_stat(1234.5), "1234.5");
        assert_eq!(format_stat(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "1970-01-01");
        assert_eq!(format_timestamp(1.5), "1970-01-02 12:00:00");
        assert_eq!(format_timestamp(f64::NAN), "NaT");
    }
}
