use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Raw CSV contents: a header row plus string cells, before any type inference
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read CSV data from a file on disk
pub fn read_csv_file(path: &Path) -> Result<CsvData> {
    let bytes = fs::read(path)
        .with_context(|| format!("File not found or unreadable: {}", path.display()))?;
    parse_csv_bytes(&bytes).with_context(|| format!("Failed to parse CSV file {}", path.display()))
}

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv_from_reader(io::stdin().lock())
}

/// Read CSV data from any reader
pub fn read_csv_from_reader<R: Read>(mut reader: R) -> Result<CsvData> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("Failed to read CSV input")?;
    parse_csv_bytes(&bytes)
}

/// Parse CSV bytes, falling back to a lossy UTF-8 decode when the input is not valid UTF-8
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<CsvData> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                "Input is not valid UTF-8 ({}). Using lossy UTF-8 decoding as fallback",
                e
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    };
    parse_csv_str(&text)
}

/// Parse CSV text with a header row
pub fn parse_csv_str(text: &str) -> Result<CsvData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV record {}", idx + 1))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    debug!("Parsed CSV with {} columns and {} rows", headers.len(), rows.len());

    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let csv = parse_csv_str("a,b\n1,x\n2,y\n").unwrap();
        assert_eq!(csv.headers, vec!["a", "b"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[1], vec!["2", "y"]);
    }

    #[test]
    fn test_parse_quoted_and_empty_cells() {
        let csv = parse_csv_str("name,note\n\"Smith, J\",\nLee,\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(csv.rows[0], vec!["Smith, J", ""]);
        assert_eq!(csv.rows[1][1], "said \"hi\"");
    }

    #[test]
    fn test_header_only() {
        let csv = parse_csv_str("x,y\n").unwrap();
        assert_eq!(csv.headers.len(), 2);
        assert!(csv.rows.is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = parse_csv_str("a,b\n1,2,3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_utf8_falls_back() {
        let bytes = b"name\ncaf\xe9\n";
        let csv = parse_csv_bytes(bytes).unwrap();
        assert_eq!(csv.rows.len(), 1);
        assert!(csv.rows[0][0].starts_with("caf"));
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv_file(Path::new("does/not/exist.csv"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("does/not/exist.csv"));
    }
}
