use std::sync::Arc;

use crate::error::{ChurnError, Result};
use crate::pipeline::Pipeline;
use crate::search::SearchResult;

/// The overall winner across thresholds.
#[derive(Debug, Clone)]
pub struct BestModel {
    pub threshold: f64,
    pub score: f64,
    pub subset: String,
    pub pipeline: Arc<Pipeline>,
}

/// Pick the result with the maximum score. Among equal scores the lowest
/// threshold wins, regardless of the order of `results`.
pub fn select_best(results: &[SearchResult]) -> Result<BestModel> {
    let best = results
        .iter()
        .reduce(|best, candidate| {
            let better = candidate.best_score > best.best_score
                || (candidate.best_score == best.best_score && candidate.threshold < best.threshold);
            if better {
                candidate
            } else {
                best
            }
        })
        .ok_or(ChurnError::NoCandidates)?;

    log::info!(
        "Selected threshold {:.2} with feature subset '{}' (mean profit {:.4})",
        best.threshold,
        best.best_subset,
        best.best_score
    );
    Ok(BestModel {
        threshold: best.threshold,
        score: best.best_score,
        subset: best.best_subset.clone(),
        pipeline: Arc::clone(&best.pipeline),
    })
}
