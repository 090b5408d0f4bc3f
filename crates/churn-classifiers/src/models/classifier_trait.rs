use ndarray::{Array1, Array2};

use crate::error::Result;

/// The black-box classifier at the end of a pipeline. Labels are 0/1 with
/// 1 as the positive (churned) class.
pub trait ClassifierModel: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()>;

    /// Probability of the positive class for every row, in `[0, 1]`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
