//! Delimited text reader for churn datasets.
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::data_handling::{Column, Frame, RecordKey};

/// Configuration for reading churn CSV files.
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    pub delimiter: u8,
    /// Cell values (after trimming) treated as missing.
    pub missing_values: Vec<String>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_values: vec![
                "".to_string(),
                "NA".to_string(),
                "NaN".to_string(),
                "nan".to_string(),
                "null".to_string(),
            ],
        }
    }
}

/// Read a churn CSV file with the default configuration.
pub fn read_churn_csv<P: AsRef<Path>>(path: P) -> Result<Frame> {
    read_churn_csv_with_config(path, &CsvReaderConfig::default())
}

/// Read a churn CSV file using a custom configuration.
pub fn read_churn_csv_with_config<P: AsRef<Path>>(path: P, config: &CsvReaderConfig) -> Result<Frame> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open churn file: {}", path.as_ref().display()))?;
    let frame = read_churn_records(file, config)
        .with_context(|| format!("Failed to load churn file: {}", path.as_ref().display()))?;
    log::debug!(
        "Loaded {} rows x {} columns from {}",
        frame.nrows(),
        frame.ncols(),
        path.as_ref().display()
    );
    Ok(frame)
}

/// Read header + rows from any reader. Rows are keyed by their ordinal.
///
/// A column whose non-missing cells all parse as numbers (or booleans,
/// stored as 1.0 / 0.0) becomes numeric; every other column is read as
/// categorical text. Date coercion is left to the pipeline.
pub fn read_churn_records<R: Read>(reader: R, config: &CsvReaderConfig) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .clone();
    if headers.is_empty() {
        return Err(anyhow!("Header row has no columns"));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        if record.len() != headers.len() {
            return Err(anyhow!(
                "Row {} has {} fields, header has {}",
                row_idx + 1,
                record.len(),
                headers.len()
            ));
        }
        for (col, value) in record.iter().enumerate() {
            let value = value.trim();
            let cell = if config.missing_values.iter().any(|m| m == value) {
                None
            } else {
                Some(value.to_string())
            };
            cells[col].push(cell);
        }
    }

    let nrows = cells.first().map_or(0, Vec::len);
    let mut frame = Frame::new((0..nrows as RecordKey).collect());
    for (name, values) in headers.iter().zip(cells) {
        if frame.column(name.trim()).is_some() {
            return Err(anyhow!("Duplicate column '{}' in header", name.trim()));
        }
        frame
            .set_column(name.trim(), infer_column(values))
            .with_context(|| format!("Duplicate or malformed column '{}'", name))?;
    }
    Ok(frame)
}

fn infer_column(values: Vec<Option<String>>) -> Column {
    if let Some(numbers) = parse_all(&values, |s| s.parse::<f64>().ok()) {
        return Column::Numeric(numbers);
    }
    if let Some(flags) = parse_all(&values, parse_bool) {
        return Column::Numeric(flags);
    }
    Column::Categorical(values)
}

fn parse_all<F>(values: &[Option<String>], parse: F) -> Option<Vec<Option<f64>>>
where
    F: Fn(&str) -> Option<f64>,
{
    values
        .iter()
        .map(|cell| match cell {
            Some(text) => parse(text).map(Some),
            None => Some(None),
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<f64> {
    if value.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if value.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        None
    }
}
