use ndarray::ArrayView1;
use serde::Serialize;

use crate::error::{ChurnError, Result};
use crate::scoring::{binarize, CostBenefit, ConfusionMatrix};

/// Hard-prediction metrics at one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub threshold: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    /// Average profit per example under the cost/benefit matrix.
    pub profit: f64,
    pub confusion: ConfusionMatrix,
}

/// Score `probabilities` against `labels` at `threshold`. Precision and
/// recall are 0.0 when their denominator is zero.
pub fn evaluate(
    labels: &[u8],
    probabilities: ArrayView1<f64>,
    threshold: f64,
    cost_benefit: &CostBenefit,
) -> Result<ClassificationReport> {
    if labels.is_empty() {
        return Err(ChurnError::EmptyDataset("cannot evaluate without labeled examples".to_string()));
    }
    let predicted = binarize(probabilities, threshold)?;
    let confusion = ConfusionMatrix::from_predictions(labels, &predicted)?;
    let n = confusion.total() as f64;
    let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    Ok(ClassificationReport {
        threshold,
        accuracy: (confusion.true_positive + confusion.true_negative) as f64 / n,
        precision: ratio(
            confusion.true_positive,
            confusion.true_positive + confusion.false_positive,
        ),
        recall: ratio(
            confusion.true_positive,
            confusion.true_positive + confusion.false_negative,
        ),
        profit: cost_benefit.weigh(&confusion) / n,
        confusion,
    })
}
