//! churn-classifiers: profit-driven model selection for customer churn.
//!
//! A fixed chain of feature transform stages feeds a binary classifier. The
//! search cross-validates that pipeline for every candidate feature subset,
//! scores the out-of-fold probabilities with a cost/benefit matrix at each
//! decision threshold, and keeps the most profitable subset per threshold.
//! The selector then picks the overall winner.
//!
//! Data handling, CSV loading, evaluation and an HTML report round out the
//! crate; the `churn` binary in `churn-cli` wires them together.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod scoring;
pub mod search;
pub mod selector;
pub mod stats;

pub use error::{ChurnError, Result};
