use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::csv_reader::CsvData;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Text,
    DateTime,
    Date,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Text => "text",
            DataType::DateTime => "datetime",
            DataType::Date => "date",
        }
    }

    /// Semantic bucket used to pick a visualization
    pub fn kind(&self) -> ColumnKind {
        match self {
            DataType::Integer | DataType::Float => ColumnKind::Numeric,
            DataType::Boolean | DataType::Text => ColumnKind::Categorical,
            DataType::DateTime | DataType::Date => ColumnKind::Temporal,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic column type. Each kind gets its own distribution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Temporal,
}

impl ColumnKind {
    /// Pass order used by the visualizer
    pub const ALL: [ColumnKind; 3] = [
        ColumnKind::Numeric,
        ColumnKind::Categorical,
        ColumnKind::Temporal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Temporal => "temporal",
        }
    }
}

/// Column values. Every cell is nullable.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Date(Vec<Option<NaiveDate>>),
}

/// Hashable view of one cell, used for duplicate-row detection
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Integer(i64),
    Float(u64),
    Boolean(bool),
    Text(&'a str),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Integer(_) => DataType::Integer,
            ColumnData::Float(_) => DataType::Float,
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Text(_) => DataType::Text,
            ColumnData::DateTime(_) => DataType::DateTime,
            ColumnData::Date(_) => DataType::Date,
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::Integer(v) => v[row].is_none(),
            ColumnData::Float(v) => v[row].is_none(),
            ColumnData::Boolean(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
            ColumnData::DateTime(v) => v[row].is_none(),
            ColumnData::Date(v) => v[row].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_null(i)).count()
    }

    /// Numeric view of a cell. Temporal values are elapsed days since the Unix epoch.
    pub fn as_f64(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Integer(v) => v[row].map(|x| x as f64),
            ColumnData::Float(v) => v[row],
            ColumnData::DateTime(v) => v[row].map(datetime_to_days),
            ColumnData::Date(v) => v[row].map(date_to_days),
            ColumnData::Boolean(_) | ColumnData::Text(_) => None,
        }
    }

    /// All non-null values in numeric form (empty for categorical data)
    pub fn numeric_values(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.as_f64(i)).collect()
    }

    /// Label used when counting categories
    pub fn label(&self, row: usize) -> Option<String> {
        if self.is_null(row) {
            None
        } else {
            Some(self.display_value(row))
        }
    }

    /// Text rendering of a cell for tables
    pub fn display_value(&self, row: usize) -> String {
        match self {
            ColumnData::Integer(v) => v[row].map_or_else(|| "NaN".to_string(), |x| x.to_string()),
            ColumnData::Float(v) => v[row].map_or_else(|| "NaN".to_string(), |x| x.to_string()),
            ColumnData::Boolean(v) => v[row].map_or_else(|| "NaN".to_string(), |x| x.to_string()),
            ColumnData::Text(v) => v[row].clone().unwrap_or_else(|| "NaN".to_string()),
            ColumnData::DateTime(v) => v[row].map_or_else(
                || "NaT".to_string(),
                |x| x.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            ColumnData::Date(v) => {
                v[row].map_or_else(|| "NaT".to_string(), |x| x.format("%Y-%m-%d").to_string())
            }
        }
    }

    fn cell_key(&self, row: usize) -> CellKey<'_> {
        match self {
            ColumnData::Integer(v) => v[row].map_or(CellKey::Null, CellKey::Integer),
            ColumnData::Float(v) => v[row].map_or(CellKey::Null, |x| {
                // 0.0 and -0.0 are the same value
                let x = if x == 0.0 { 0.0 } else { x };
                CellKey::Float(x.to_bits())
            }),
            ColumnData::Boolean(v) => v[row].map_or(CellKey::Null, CellKey::Boolean),
            ColumnData::Text(v) => v[row].as_deref().map_or(CellKey::Null, CellKey::Text),
            ColumnData::DateTime(v) => v[row].map_or(CellKey::Null, CellKey::DateTime),
            ColumnData::Date(v) => v[row].map_or(CellKey::Null, CellKey::Date),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.data_type().kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A table of equally long, typed columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(anyhow!(
                    "Column '{}' has {} values but column '{}' has {}",
                    bad.name(),
                    bad.len(),
                    first.name(),
                    expected
                ));
            }
        }
        Ok(Self { columns })
    }

    /// Create a Dataset from an existing CsvData struct, inferring column types
    pub fn from_csv(csv: CsvData) -> Result<Self> {
        Self::from_records(csv.headers, csv.rows)
    }

    /// Build a dataset from string cells, inferring one type per column
    pub fn from_records(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(anyhow!(
                    "Row {} has {} fields, expected {}",
                    idx + 1,
                    row.len(),
                    headers.len()
                ));
            }
        }

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let cells: Vec<&str> = rows.iter().map(|r| r[col_idx].as_str()).collect();
                Column::new(name, infer_column(&cells))
            })
            .collect();

        Self::new(columns)
    }

    /// Build a dataset from a JSON array of records. Columns follow the keys of the
    /// first record; absent keys and `null` are missing values.
    pub fn from_json(value: &Value) -> Result<Self> {
        let records = value
            .as_array()
            .context("Expected a JSON array of records")?;
        let first = records
            .first()
            .context("JSON input has no records")?
            .as_object()
            .context("Record 1 is not an object")?;
        let headers: Vec<String> = first.keys().cloned().collect();

        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let record = record
                    .as_object()
                    .with_context(|| format!("Record {} is not an object", idx + 1))?;
                headers
                    .iter()
                    .map(|name| {
                        json_cell(record.get(name))
                            .with_context(|| format!("Record {} field '{}'", idx + 1, name))
                    })
                    .collect::<Result<Vec<String>>>()
            })
            .collect::<Result<Vec<Vec<String>>>>()?;

        Self::from_records(headers, rows)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Columns in one semantic bucket, in dataset order
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.kind() == kind).collect()
    }

    pub fn columns_of_type(&self, data_type: DataType) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.data_type() == data_type)
            .collect()
    }

    /// Distinct storage types in order of first appearance
    pub fn data_types(&self) -> Vec<DataType> {
        let mut seen = Vec::new();
        for column in &self.columns {
            let dt = column.data_type();
            if !seen.contains(&dt) {
                seen.push(dt);
            }
        }
        seen
    }

    /// Missing-value count for every column, in dataset order
    pub fn missing_counts(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name(), c.data().null_count()))
            .collect()
    }

    /// Flags rows that repeat an earlier row. The first occurrence is not flagged.
    pub fn duplicated(&self) -> Vec<bool> {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(self.n_rows());
        (0..self.n_rows())
            .map(|row| {
                let key: Vec<CellKey<'_>> =
                    self.columns.iter().map(|c| c.data().cell_key(row)).collect();
                !seen.insert(key)
            })
            .collect()
    }

    /// Text cells of one row
    pub fn row_values(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.data().display_value(row))
            .collect()
    }

    /// Truncate datetime columns to calendar dates in place.
    /// Returns the number of columns that changed.
    pub fn normalize_temporal_to_dates(&mut self) -> usize {
        let mut changed = 0;
        for column in &mut self.columns {
            if let ColumnData::DateTime(values) = &column.data {
                let dates = values.iter().map(|v| v.map(|dt| dt.date())).collect();
                column.data = ColumnData::Date(dates);
                changed += 1;
            }
        }
        changed
    }
}

fn datetime_to_days(dt: NaiveDateTime) -> f64 {
    let utc = dt.and_utc();
    utc.timestamp() as f64 / SECONDS_PER_DAY
        + f64::from(utc.timestamp_subsec_nanos()) / (SECONDS_PER_DAY * 1e9)
}

fn date_to_days(date: NaiveDate) -> f64 {
    datetime_to_days(date.and_time(NaiveTime::MIN))
}

/// Convert elapsed days since the Unix epoch back to a date
pub fn days_to_date(days: f64) -> Option<NaiveDate> {
    let secs = (days * SECONDS_PER_DAY).round() as i64;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Convert elapsed days since the Unix epoch back to a timestamp
pub fn days_to_datetime(days: f64) -> Option<NaiveDateTime> {
    let secs = (days * SECONDS_PER_DAY).round() as i64;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Text form of a scalar JSON value; nested arrays and objects are rejected
fn json_cell(value: Option<&Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => bail!("Nested value {} cannot be a table cell", other),
    }
}

// =============================================================================
// Type inference
// =============================================================================

const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "nat"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_datetime(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}

/// Pick the narrowest type every non-missing cell parses as.
/// Columns with no values at all become floats.
fn infer_column(cells: &[&str]) -> ColumnData {
    let present: Vec<&str> = cells.iter().copied().filter(|c| !is_missing(c)).collect();

    fn collect<T>(cells: &[&str], parse: impl Fn(&str) -> Option<T>) -> Vec<Option<T>> {
        cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse(c) })
            .collect()
    }

    if present.is_empty() {
        return ColumnData::Float(vec![None; cells.len()]);
    }
    if present.iter().all(|c| c.trim().parse::<i64>().is_ok()) {
        return ColumnData::Integer(collect(cells, |c| c.trim().parse().ok()));
    }
    if present.iter().all(|c| c.trim().parse::<f64>().is_ok()) {
        return ColumnData::Float(collect(cells, |c| c.trim().parse().ok()));
    }
    if present.iter().all(|c| parse_bool(c).is_some()) {
        return ColumnData::Boolean(collect(cells, parse_bool));
    }
    if present.iter().all(|c| parse_datetime(c).is_some()) {
        return ColumnData::DateTime(collect(cells, parse_datetime));
    }
    if present.iter().all(|c| parse_date(c).is_some()) {
        return ColumnData::Date(collect(cells, parse_date));
    }
    ColumnData::Text(collect(cells, |c| Some(c.to_string())))
}
