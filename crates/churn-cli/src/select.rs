//! Load → label → search → select → evaluate, as one fixed run.
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use churn_classifiers::config::{load_config, ChurnConfig};
use churn_classifiers::data_handling::{extract_labels, Frame, Labels};
use churn_classifiers::io::read_churn_csv;
use churn_classifiers::report::{write_report, RunSummary};
use churn_classifiers::search::{SearchResult, ThresholdSearch};
use churn_classifiers::selector::{select_best, BestModel};
use churn_classifiers::stats::{evaluate, ClassificationReport};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "CHURN_CONFIG";

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<SearchResult>,
    pub best: BestModel,
    pub train: ClassificationReport,
    pub test: ClassificationReport,
}

/// Load the config file at `path`, or fall back to defaults.
pub fn resolve_config(path: Option<PathBuf>) -> Result<ChurnConfig> {
    match path {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            load_config(&path)
        }
        None => {
            log::info!("No {} set; using default config", CONFIG_ENV);
            let config = ChurnConfig::default();
            config.validate().context("Invalid default config")?;
            Ok(config)
        }
    }
}

fn load_labeled(path: &std::path::Path, config: &ChurnConfig) -> Result<(Frame, Labels)> {
    let frame = read_churn_csv(path)?;
    let labels = extract_labels(&frame, &config.label)
        .with_context(|| format!("Failed to derive churn labels for {}", path.display()))?;
    Ok((frame, labels))
}

pub fn run(config: &ChurnConfig) -> Result<RunOutcome> {
    let (train, train_labels) = load_labeled(&config.train_path, config)?;
    let (test, test_labels) = load_labeled(&config.test_path, config)?;
    train.log_input_data_summary(&train_labels);

    let results = ThresholdSearch::new(config)
        .run(&train, &train_labels)
        .context("Model selection failed")?;
    let best = select_best(&results)?;

    let score = |frame: &Frame, labels: &Labels, name: &str| -> Result<ClassificationReport> {
        let probabilities = best
            .pipeline
            .predict_proba(frame)
            .with_context(|| format!("Failed to score {} data", name))?;
        let targets = labels.align(frame.keys())?.to_vec();
        Ok(evaluate(
            &targets,
            probabilities.view(),
            best.threshold,
            &config.cost_benefit,
        )?)
    };
    let train_report = score(&train, &train_labels, "train")?;
    let test_report = score(&test, &test_labels, "test")?;

    if let Some(path) = &config.report_path {
        write_report(
            path,
            &RunSummary {
                config,
                results: &results,
                best: &best,
                train: &train_report,
                test: &test_report,
            },
        )?;
    }

    Ok(RunOutcome {
        results,
        best,
        train: train_report,
        test: test_report,
    })
}

/// Print accuracy, precision and recall for the train and test sets.
pub fn print_scores<W: Write>(out: &mut W, outcome: &RunOutcome) -> Result<()> {
    writeln!(
        out,
        "Best model: threshold {:.2}, feature subset '{}', mean CV profit {:.4}",
        outcome.best.threshold, outcome.best.subset, outcome.best.score
    )?;
    writeln!(out, "Train / Test Score")?;
    for report in [&outcome.train, &outcome.test] {
        writeln!(out, "--")?;
        writeln!(out, "accuracy_score:  {:.4}", report.accuracy)?;
        writeln!(out, "precision_score: {:.4}", report.precision)?;
        writeln!(out, "recall_score:    {:.4}", report.recall)?;
        writeln!(out, "--")?;
    }
    Ok(())
}
