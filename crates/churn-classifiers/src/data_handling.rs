//! Data structures and helpers for holding and labeling churn datasets.
//!
//! A `Frame` is a small column store: every row carries a `RecordKey` and
//! every column is numeric, categorical or date-valued with explicit missing
//! values. Labels live in a separate keyed `Labels` container and are joined
//! back onto feature rows by key, never by position.
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array1, Array2};

use crate::config::LabelRule;
use crate::error::{ChurnError, Result};

/// Stable per-row identifier (the row ordinal in the source file).
pub type RecordKey = u64;

/// Date layouts accepted when coercing text to dates.
pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
            Column::Date(_) => ColumnKind::Date,
        }
    }

    /// Number of non-missing cells.
    pub fn non_missing(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|x| x.is_some()).count(),
            Column::Categorical(v) => v.iter().filter(|x| x.is_some()).count(),
            Column::Date(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }

    pub fn select_rows(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
            Column::Date(v) => Column::Date(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Render cell `row` as text, the way it would appear in the source file.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v[row].map(|x| x.to_string()),
            Column::Categorical(v) => v[row].clone(),
            Column::Date(v) => v[row].map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// In-memory table of records keyed by `RecordKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    keys: Vec<RecordKey>,
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(keys: Vec<RecordKey>) -> Self {
        Frame {
            keys,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Builder-style `set_column`.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.set_column(name, column)?;
        Ok(self)
    }

    /// Set a column, replacing an existing column of the same name in place
    /// or appending a new one.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        self.check_length(&name, &column)?;
        match self.position(&name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.position(name)?;
        self.names.remove(idx);
        Some(self.columns.remove(idx))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    pub fn nrows(&self) -> usize {
        self.keys.len()
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    /// Restrict to exactly `names`, in that order. A missing name is a
    /// `SchemaMismatch` attributed to `stage`.
    pub fn select_columns(&self, names: &[String], stage: &str) -> Result<Frame> {
        let mut out = Frame::new(self.keys.clone());
        for name in names {
            let column = self.column(name).ok_or_else(|| {
                ChurnError::schema(stage, format!("column '{}' is not present", name))
            })?;
            out.names.push(name.clone());
            out.columns.push(column.clone());
        }
        Ok(out)
    }

    /// Keep only the rows at `indices` (in the given order).
    pub fn select_rows(&self, indices: &[usize]) -> Frame {
        Frame {
            keys: indices.iter().map(|&i| self.keys[i]).collect(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select_rows(indices)).collect(),
        }
    }

    /// Convert an all-numeric, fully populated frame into a row-major matrix.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let (nrows, ncols) = (self.nrows(), self.ncols());
        let mut x = Array2::<f64>::zeros((nrows, ncols));
        for (c, (name, column)) in self.columns().enumerate() {
            let Column::Numeric(values) = column else {
                return Err(ChurnError::schema(
                    "classifier input",
                    format!("column '{}' is {:?}, expected numeric", name, column.kind()),
                ));
            };
            for (r, value) in values.iter().enumerate() {
                x[(r, c)] = value.ok_or_else(|| ChurnError::MissingValue {
                    column: name.to_string(),
                    key: self.keys[r],
                })?;
            }
        }
        Ok(x)
    }

    pub fn log_input_data_summary(&self, labels: &Labels) {
        let positives = labels.positives();
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} records: {} churned (label 1) and {} retained (label 0)",
            self.nrows(),
            positives,
            labels.len() - positives
        );
        log::info!("{} raw columns: {}", self.ncols(), self.names.join(", "));
        log::info!("-------------------------------");
    }

    fn check_length(&self, name: &str, column: &Column) -> Result<()> {
        if column.len() != self.nrows() {
            return Err(ChurnError::schema(
                "frame",
                format!(
                    "column '{}' has {} rows, frame has {}",
                    name,
                    column.len(),
                    self.nrows()
                ),
            ));
        }
        Ok(())
    }
}

/// Binary labels keyed by record.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    keys: Vec<RecordKey>,
    values: Vec<u8>,
    index: HashMap<RecordKey, usize>,
}

impl Labels {
    pub fn new(keys: Vec<RecordKey>, values: Vec<u8>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(ChurnError::LengthMismatch {
                labels: values.len(),
                predictions: keys.len(),
            });
        }
        if let Some(bad) = values.iter().find(|&&v| v > 1) {
            return Err(ChurnError::InvalidConfig(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        let index = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        Ok(Labels {
            keys,
            values,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn get(&self, key: RecordKey) -> Option<u8> {
        self.index.get(&key).map(|&i| self.values[i])
    }

    pub fn positives(&self) -> usize {
        self.values.iter().filter(|&&v| v == 1).count()
    }

    /// Look up the label of every key, in the order given.
    pub fn align(&self, keys: &[RecordKey]) -> Result<Array1<u8>> {
        keys.iter()
            .map(|&k| self.get(k).ok_or(ChurnError::LabelAlignment(k)))
            .collect::<Result<Vec<u8>>>()
            .map(Array1::from)
    }
}

/// Parse `value` with the first matching layout in `formats`.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(value, fmt).ok().map(|dt| dt.date()))
    })
}

/// Derive churn labels: 1 when the rule's date column precedes the cutoff.
///
/// The date column may still be raw text (labels are extracted before the
/// pipeline's type normalization runs) or already typed as dates.
pub fn extract_labels(frame: &Frame, rule: &LabelRule) -> Result<Labels> {
    let column = frame.column(&rule.column).ok_or_else(|| {
        ChurnError::schema(
            "label extraction",
            format!("column '{}' is not present", rule.column),
        )
    })?;

    let mut values = Vec::with_capacity(frame.nrows());
    for (row, &key) in frame.keys().iter().enumerate() {
        let date = match column {
            Column::Date(v) => v[row],
            Column::Categorical(v) => match &v[row] {
                Some(text) => Some(parse_date(text, &rule.date_formats).ok_or_else(|| {
                    ChurnError::ParseError {
                        column: rule.column.clone(),
                        key,
                        value: text.clone(),
                        reason: "is not a recognized date".to_string(),
                    }
                })?),
                None => None,
            },
            Column::Numeric(_) => {
                return Err(ChurnError::schema(
                    "label extraction",
                    format!("column '{}' is numeric, expected a date", rule.column),
                ))
            }
        };
        let date = date.ok_or_else(|| ChurnError::MissingValue {
            column: rule.column.clone(),
            key,
        })?;
        values.push(u8::from(date < rule.cutoff));
    }

    Labels::new(frame.keys().to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut frame = Frame::new(vec![0, 1])
            .with_column("a", Column::Numeric(vec![Some(1.0), Some(2.0)]))
            .unwrap()
            .with_column("b", Column::Numeric(vec![None, Some(3.0)]))
            .unwrap();
        frame
            .set_column("a", Column::Numeric(vec![Some(9.0), Some(9.0)]))
            .unwrap();
        assert_eq!(frame.column_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(
            frame.column("a"),
            Some(&Column::Numeric(vec![Some(9.0), Some(9.0)]))
        );
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut frame = Frame::new(vec![0, 1, 2]);
        let err = frame
            .set_column("a", Column::Numeric(vec![Some(1.0)]))
            .unwrap_err();
        assert!(matches!(err, ChurnError::SchemaMismatch { .. }));
    }

    #[test]
    fn to_matrix_reports_missing_value_with_key() {
        let frame = Frame::new(vec![10, 11])
            .with_column("a", Column::Numeric(vec![Some(1.0), None]))
            .unwrap();
        match frame.to_matrix() {
            Err(ChurnError::MissingValue { column, key }) => {
                assert_eq!(column, "a");
                assert_eq!(key, 11);
            }
            other => panic!("expected MissingValue, got {:?}", other),
        }
    }

    #[test]
    fn to_matrix_rejects_categorical() {
        let frame = Frame::new(vec![0])
            .with_column("city", Column::Categorical(vec![Some("x".into())]))
            .unwrap();
        assert!(matches!(
            frame.to_matrix(),
            Err(ChurnError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn parse_date_accepts_several_layouts() {
        let expected = NaiveDate::from_ymd_opt(2014, 6, 17).unwrap();
        assert_eq!(parse_date("2014-06-17", &formats()), Some(expected));
        assert_eq!(parse_date("06/17/2014", &formats()), Some(expected));
        assert_eq!(parse_date("2014-06-17 08:30:00", &formats()), Some(expected));
        assert_eq!(parse_date("not a date", &formats()), None);
    }

    #[test]
    fn labels_align_by_key_not_position() {
        let labels = Labels::new(vec![5, 6, 7], vec![1, 0, 1]).unwrap();
        let aligned = labels.align(&[7, 5, 6]).unwrap();
        assert_eq!(aligned.to_vec(), vec![1, 1, 0]);
        assert!(matches!(
            labels.align(&[8]),
            Err(ChurnError::LabelAlignment(8))
        ));
    }

    #[test]
    fn labels_reject_non_binary_values() {
        assert!(Labels::new(vec![0], vec![2]).is_err());
    }
}
