//! Integration tests for the run logic behind the `churn` binary.

mod common;

use churn_cli::select::{print_scores, resolve_config, run};

#[test]
fn no_config_path_gives_defaults() {
    let config = resolve_config(None).unwrap();
    assert_eq!(config.train_path.to_str(), Some("data/churn_train.csv"));
    assert_eq!(config.test_path.to_str(), Some("data/churn_test.csv"));
    assert!(config.report_path.is_none());
}

#[test]
fn run_selects_one_of_the_configured_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let config = resolve_config(Some(common::write_run_fixture(dir.path(), false))).unwrap();
    let outcome = run(&config).unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!([0.3, 0.5, 0.7].contains(&outcome.best.threshold));
    assert!(outcome.results.iter().all(|r| r.best_score <= outcome.best.score));
    assert_eq!(outcome.train.threshold, outcome.best.threshold);
    assert_eq!(outcome.test.confusion.total(), 20);
    assert!(!dir.path().join("report.html").exists());

    let mut printed = Vec::new();
    print_scores(&mut printed, &outcome).unwrap();
    let printed = String::from_utf8(printed).unwrap();
    assert_eq!(printed.matches("accuracy_score").count(), 2);
    assert!(printed.contains(&outcome.best.subset));
}

#[test]
fn missing_test_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = resolve_config(Some(common::write_run_fixture(dir.path(), false))).unwrap();
    config.test_path = dir.path().join("nope.csv");
    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.csv"));
}
