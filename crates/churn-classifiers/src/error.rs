//! Error type shared by every stage of the model-selection run.

use thiserror::Error;

use crate::data_handling::RecordKey;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChurnError>;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Failed to parse column '{column}' at record {key}: '{value}' {reason}")]
    ParseError {
        column: String,
        key: RecordKey,
        value: String,
        reason: String,
    },

    #[error("Schema mismatch in {stage}: {detail}")]
    SchemaMismatch { stage: String, detail: String },

    #[error("No fully populated column found; {ncols} columns inspected over {nrows} rows")]
    EmptySubset { ncols: usize, nrows: usize },

    #[error("Threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("Missing value in column '{column}' at record {key}")]
    MissingValue { column: String, key: RecordKey },

    #[error("Labels and predictions must have equal length ({labels} != {predictions})")]
    LengthMismatch { labels: usize, predictions: usize },

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Predicted probability {value} at position {index} is not a finite value in [0, 1]")]
    InvalidProbability { index: usize, value: f64 },

    #[error("No label found for record {0}")]
    LabelAlignment(RecordKey),

    #[error("{0} used before fit")]
    NotFitted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No search results to select from")]
    NoCandidates,

    #[error("Classifier error: {0}")]
    Model(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChurnError {
    pub(crate) fn schema(stage: &str, detail: impl Into<String>) -> Self {
        ChurnError::SchemaMismatch {
            stage: stage.to_string(),
            detail: detail.into(),
        }
    }
}
