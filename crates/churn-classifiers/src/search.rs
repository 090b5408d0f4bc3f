//! Threshold × feature-subset search scored by cross-validated profit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ndarray::Array1;
use rayon::prelude::*;
use statrs::statistics::Statistics;

use crate::config::{ChurnConfig, FeatureSubset, ModelConfig, PipelineConfig, SearchConfig};
use crate::cross_validation::{stratified_folds, Fold};
use crate::data_handling::{Frame, Labels};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::scoring::{CostBenefit, ProfitScorer};

/// Cross-validated profit of one feature subset at one threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub subset: String,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

/// Winner of one threshold: the best subset, its mean CV profit and the
/// pipeline refitted on all training rows.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub threshold: f64,
    pub best_subset: String,
    pub best_score: f64,
    /// Every subset's score at this threshold, in configuration order.
    pub candidates: Vec<CandidateScore>,
    pub pipeline: Arc<Pipeline>,
}

/// Held-out labels and probabilities of one fold.
struct OutOfFold {
    labels: Vec<u8>,
    probabilities: Array1<f64>,
}

pub struct ThresholdSearch {
    pipeline: PipelineConfig,
    model: ModelConfig,
    search: SearchConfig,
    cost_benefit: CostBenefit,
}

impl ThresholdSearch {
    pub fn new(config: &ChurnConfig) -> Self {
        ThresholdSearch {
            pipeline: config.pipeline.clone(),
            model: config.model.clone(),
            search: config.search.clone(),
            cost_benefit: config.cost_benefit,
        }
    }

    /// Run the search over `x` with labels `y`, one result per configured
    /// threshold in configuration order.
    pub fn run(&self, x: &Frame, y: &Labels) -> Result<Vec<SearchResult>> {
        self.search.validate()?;
        let targets = y.align(x.keys())?.to_vec();
        let folds = stratified_folds(&targets, &self.search.cross_validation)?;
        log::info!(
            "Searching {} thresholds x {} feature subsets with {}-fold cross-validation",
            self.search.thresholds.len(),
            self.search.feature_subsets.len(),
            folds.len()
        );

        let out_of_fold: Vec<Vec<OutOfFold>> =
            self.map(&self.search.feature_subsets, |subset| {
                self.cross_validate(subset, x, y, &targets, &folds)
            })?;

        let mut winners = Vec::with_capacity(self.search.thresholds.len());
        for &threshold in &self.search.thresholds {
            let scorer = ProfitScorer::new(threshold, self.cost_benefit)?;
            let candidates = self
                .search
                .feature_subsets
                .iter()
                .zip(&out_of_fold)
                .map(|(subset, folds)| score_candidate(&scorer, subset, folds))
                .collect::<Result<Vec<CandidateScore>>>()?;
            let best = best_candidate(&candidates);
            log::info!(
                "Threshold {:.2}: best subset '{}' with mean profit {:.4}",
                threshold,
                candidates[best].subset,
                candidates[best].mean_score
            );
            winners.push((threshold, best, candidates));
        }

        // Thresholds that pick the same subset share one refitted pipeline.
        let winning: Vec<usize> = winners
            .iter()
            .map(|(_, best, _)| *best)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let refitted: BTreeMap<usize, Arc<Pipeline>> = self
            .map(&winning, |&idx| {
                let mut pipeline = self.build(&self.search.feature_subsets[idx]);
                pipeline.fit(x, y)?;
                Ok((idx, Arc::new(pipeline)))
            })?
            .into_iter()
            .collect();

        Ok(winners
            .into_iter()
            .map(|(threshold, best, candidates)| SearchResult {
                threshold,
                best_subset: candidates[best].subset.clone(),
                best_score: candidates[best].mean_score,
                pipeline: Arc::clone(&refitted[&best]),
                candidates,
            })
            .collect())
    }

    fn build(&self, subset: &FeatureSubset) -> Pipeline {
        Pipeline::new(&self.pipeline, subset.clone(), &self.model)
    }

    /// Out-of-fold probabilities of one subset. They do not depend on the
    /// threshold, so every threshold rescores the same predictions.
    fn cross_validate(
        &self,
        subset: &FeatureSubset,
        x: &Frame,
        y: &Labels,
        targets: &[u8],
        folds: &[Fold],
    ) -> Result<Vec<OutOfFold>> {
        self.map(folds, |fold| {
            let mut pipeline = self.build(subset);
            pipeline.fit(&x.select_rows(&fold.train), y)?;
            let probabilities = pipeline.predict_proba(&x.select_rows(&fold.test))?;
            Ok(OutOfFold {
                labels: fold.test.iter().map(|&i| targets[i]).collect(),
                probabilities,
            })
        })
    }

    /// Order-preserving map, on the rayon pool when `parallel` is set.
    fn map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        if self.search.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

fn score_candidate(
    scorer: &ProfitScorer,
    subset: &FeatureSubset,
    folds: &[OutOfFold],
) -> Result<CandidateScore> {
    let fold_scores = folds
        .iter()
        .map(|fold| scorer.score(&fold.labels, fold.probabilities.view()))
        .collect::<Result<Vec<f64>>>()?;
    let mean_score = fold_scores.iter().mean();
    let std_score = fold_scores.iter().population_std_dev();
    log::debug!(
        "  t = {:.2} subset '{}': fold profits {:?} (mean {:.4}, std {:.4})",
        scorer.threshold(),
        subset.name,
        fold_scores,
        mean_score,
        std_score
    );
    Ok(CandidateScore {
        subset: subset.name.clone(),
        fold_scores,
        mean_score,
        std_score,
    })
}

/// Index of the highest mean score; the earlier candidate wins ties.
fn best_candidate(candidates: &[CandidateScore]) -> usize {
    let mut best = 0;
    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.mean_score > candidates[best].mean_score {
            best = i;
        }
    }
    best
}
