//! Integration tests for the cost function, the evaluator and the selector.

use std::sync::Arc;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use churn_classifiers::config::{FeatureSubset, ModelConfig, PipelineConfig};
use churn_classifiers::error::ChurnError;
use churn_classifiers::pipeline::Pipeline;
use churn_classifiers::scoring::{binarize, calculate_profit, ConfusionMatrix, CostBenefit, ProfitScorer};
use churn_classifiers::search::SearchResult;
use churn_classifiers::selector::select_best;
use churn_classifiers::stats::evaluate;

// ---------------------------------------------------------------------------
// Cost function
// ---------------------------------------------------------------------------

#[test]
fn default_matrix_on_known_confusion_gives_two() {
    // 3 TP, 1 FP, 2 FN, 4 TN
    let labels = [1, 1, 1, 0, 1, 1, 0, 0, 0, 0];
    let probs = Array1::from(vec![0.9, 0.8, 0.7, 0.6, 0.2, 0.1, 0.3, 0.2, 0.1, 0.0]);
    let cm = ConfusionMatrix::from_predictions(&labels, &binarize(probs.view(), 0.5).unwrap()).unwrap();
    assert_eq!(cm.standardized(), [[3, 1], [2, 4]]);
    let profit = calculate_profit(&labels, probs.view(), 0.5, &CostBenefit::default()).unwrap();
    assert!((profit - 2.0).abs() < 1e-12);
}

#[test]
fn threshold_zero_predicts_everyone_positive() {
    let labels = [1, 0, 1, 0];
    let probs = Array1::from(vec![0.0, 0.0, 0.5, 1.0]);
    let predicted = binarize(probs.view(), 0.0).unwrap();
    assert_eq!(predicted, vec![1, 1, 1, 1]);
    let profit = calculate_profit(&labels, probs.view(), 0.0, &CostBenefit::default()).unwrap();
    assert!(profit.is_finite());
    assert_eq!(profit, 0.0);
}

#[test]
fn threshold_one_only_keeps_certain_positives() {
    let labels = [1, 0, 1];
    let probs = Array1::from(vec![1.0, 0.99, 0.2]);
    let profit = calculate_profit(&labels, probs.view(), 1.0, &CostBenefit::default()).unwrap();
    assert!((profit - 10.0 / 3.0).abs() < 1e-12);
}

#[test]
fn profit_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(11);
    let labels: Vec<u8> = (0..200).map(|_| rng.gen_range(0..=1)).collect();
    let probs = Array1::from((0..200).map(|_| rng.gen::<f64>()).collect::<Vec<_>>());
    let scorer = ProfitScorer::new(0.4, CostBenefit::default()).unwrap();
    let a = scorer.score(&labels, probs.view()).unwrap();
    let b = scorer.score(&labels, probs.view()).unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn raising_threshold_never_adds_false_positives() {
    let mut rng = StdRng::seed_from_u64(3);
    let labels: Vec<u8> = (0..300).map(|_| rng.gen_range(0..=1)).collect();
    let probs = Array1::from((0..300).map(|_| rng.gen::<f64>()).collect::<Vec<_>>());

    let mut previous = u64::MAX;
    for step in 0..=20 {
        let t = step as f64 / 20.0;
        let cm = ConfusionMatrix::from_predictions(&labels, &binarize(probs.view(), t).unwrap()).unwrap();
        assert!(cm.false_positive <= previous, "FP rose at t = {}", t);
        previous = cm.false_positive;
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    let cb = CostBenefit::default();
    let probs = Array1::from(vec![0.5, 0.5]);
    assert!(matches!(ProfitScorer::new(1.01, cb), Err(ChurnError::InvalidThreshold(_))));
    assert!(matches!(ProfitScorer::new(f64::NAN, cb), Err(ChurnError::InvalidThreshold(_))));
    assert!(matches!(
        calculate_profit(&[1], probs.view(), 0.5, &cb),
        Err(ChurnError::LengthMismatch { .. })
    ));
    assert!(matches!(
        calculate_profit(&[], Array1::<f64>::zeros(0).view(), 0.5, &cb),
        Err(ChurnError::EmptyDataset(_))
    ));
    let bad = Array1::from(vec![0.5, f64::NAN]);
    assert!(matches!(
        calculate_profit(&[1, 0], bad.view(), 0.5, &cb),
        Err(ChurnError::InvalidProbability { index: 1, .. })
    ));
}

#[test]
fn evaluator_matches_cost_function() {
    let labels = [1, 1, 1, 0, 1, 1, 0, 0, 0, 0];
    let probs = Array1::from(vec![0.9, 0.8, 0.7, 0.6, 0.2, 0.1, 0.3, 0.2, 0.1, 0.0]);
    let report = evaluate(&labels, probs.view(), 0.5, &CostBenefit::default()).unwrap();
    assert!((report.profit - 2.0).abs() < 1e-12);
    assert!((report.accuracy - 0.7).abs() < 1e-12);
    assert!((report.precision - 0.75).abs() < 1e-12);
    assert!((report.recall - 0.6).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

fn result(threshold: f64, score: f64) -> SearchResult {
    let pipeline = Pipeline::new(
        &PipelineConfig::default(),
        FeatureSubset::defaults().remove(0),
        &ModelConfig::default(),
    );
    SearchResult {
        threshold,
        best_subset: "base".to_string(),
        best_score: score,
        candidates: Vec::new(),
        pipeline: Arc::new(pipeline),
    }
}

#[test]
fn selector_picks_the_maximum() {
    let results = vec![result(0.1, -1.0), result(0.2, 3.5), result(0.3, 2.0)];
    let best = select_best(&results).unwrap();
    assert_eq!(best.threshold, 0.2);
    assert_eq!(best.score, 3.5);
}

#[test]
fn selector_breaks_ties_by_lowest_threshold() {
    let results = vec![result(0.5, 2.0), result(0.3, 2.0), result(0.7, 1.0), result(0.4, 2.0)];
    let best = select_best(&results).unwrap();
    assert_eq!(best.threshold, 0.3);
    assert_eq!(best.score, 2.0);
}

#[test]
fn selector_without_results_fails() {
    assert!(matches!(select_best(&[]), Err(ChurnError::NoCandidates)));
}
