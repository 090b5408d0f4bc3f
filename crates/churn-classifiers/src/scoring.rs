//! Profit-based scoring of probabilistic predictions.
//!
//! Predictions are binarized at a decision threshold, tallied into a
//! confusion matrix laid out as `[[TP, FP], [FN, TN]]` (positive class first)
//! and weighted by a cost/benefit matrix with the same layout. The resulting
//! per-example profit is an objective to maximize.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

/// Profit (or loss) per example for each outcome, indexed
/// `[predicted][actual]` with the positive class first:
/// `[[TP, FP], [FN, TN]]`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct CostBenefit {
    pub matrix: [[f64; 2]; 2],
}

impl Default for CostBenefit {
    fn default() -> Self {
        Self {
            matrix: [[10.0, -10.0], [0.0, 0.0]],
        }
    }
}

impl CostBenefit {
    pub fn new(matrix: [[f64; 2]; 2]) -> Self {
        Self { matrix }
    }

    /// Total weighted value of a confusion matrix (not yet averaged).
    pub fn weigh(&self, cm: &ConfusionMatrix) -> f64 {
        let counts = cm.standardized();
        let mut total = 0.0;
        for (row_counts, row_weights) in counts.iter().zip(self.matrix.iter()) {
            for (&count, &weight) in row_counts.iter().zip(row_weights.iter()) {
                total += count as f64 * weight;
            }
        }
        total
    }
}

/// Outcome counts for a binary classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
}

impl ConfusionMatrix {
    /// Tally hard predictions against the true labels (both 0/1).
    pub fn from_predictions(labels: &[u8], predicted: &[u8]) -> Result<Self> {
        check_lengths(labels.len(), predicted.len())?;
        let mut counts = [[0u64; 2]; 2];
        for (&actual, &guess) in labels.iter().zip(predicted.iter()) {
            counts[usize::from(actual == 1)][usize::from(guess == 1)] += 1;
        }
        Ok(Self::from_ascending(counts))
    }

    /// Build from the ascending-class layout `[[TN, FP], [FN, TP]]`
    /// (rows = actual, columns = predicted, class 0 first).
    pub fn from_ascending(counts: [[u64; 2]; 2]) -> Self {
        ConfusionMatrix {
            true_negative: counts[0][0],
            false_positive: counts[0][1],
            false_negative: counts[1][0],
            true_positive: counts[1][1],
        }
    }

    /// Counts in the cost/benefit layout `[[TP, FP], [FN, TN]]`.
    pub fn standardized(&self) -> [[u64; 2]; 2] {
        [
            [self.true_positive, self.false_positive],
            [self.false_negative, self.true_negative],
        ]
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }
}

/// Binarize: 1 when `p >= threshold`.
pub fn binarize(probabilities: ArrayView1<f64>, threshold: f64) -> Result<Vec<u8>> {
    check_threshold(threshold)?;
    probabilities
        .iter()
        .enumerate()
        .map(|(index, &p)| {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(ChurnError::InvalidProbability { index, value: p });
            }
            Ok(u8::from(p >= threshold))
        })
        .collect()
}

/// Average profit per labeled example at `threshold`.
pub fn calculate_profit(
    labels: &[u8],
    probabilities: ArrayView1<f64>,
    threshold: f64,
    cost_benefit: &CostBenefit,
) -> Result<f64> {
    check_lengths(labels.len(), probabilities.len())?;
    if labels.is_empty() {
        return Err(ChurnError::EmptyDataset(
            "cannot compute profit without labeled examples".to_string(),
        ));
    }
    let predicted = binarize(probabilities, threshold)?;
    let cm = ConfusionMatrix::from_predictions(labels, &predicted)?;
    Ok(cost_benefit.weigh(&cm) / labels.len() as f64)
}

/// The cost function bound to one threshold; consumes probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitScorer {
    threshold: f64,
    cost_benefit: CostBenefit,
}

impl ProfitScorer {
    pub fn new(threshold: f64, cost_benefit: CostBenefit) -> Result<Self> {
        check_threshold(threshold)?;
        Ok(Self {
            threshold,
            cost_benefit,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, labels: &[u8], probabilities: ArrayView1<f64>) -> Result<f64> {
        calculate_profit(labels, probabilities, self.threshold, &self.cost_benefit)
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ChurnError::InvalidThreshold(threshold));
    }
    Ok(())
}

fn check_lengths(labels: usize, predictions: usize) -> Result<()> {
    if labels != predictions {
        return Err(ChurnError::LengthMismatch {
            labels,
            predictions,
        });
    }
    Ok(())
}
