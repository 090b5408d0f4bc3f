//! IO utilities for loading churn datasets.

pub mod churn_csv;

pub use churn_csv::{read_churn_csv, read_churn_csv_with_config, read_churn_records, CsvReaderConfig};
