//! HTML summary of a model-selection run.

pub mod plots;
#[allow(clippy::module_inception)]
pub mod report;

use std::path::Path;

use maud::{html, Markup, PreEscaped};

use crate::config::ChurnConfig;
use crate::search::SearchResult;
use crate::selector::BestModel;
use crate::stats::ClassificationReport;

pub use plots::plot_profit_curve;
pub use report::{Report, ReportSection};

/// Everything a run produced that the report shows.
pub struct RunSummary<'a> {
    pub config: &'a ChurnConfig,
    pub results: &'a [SearchResult],
    pub best: &'a BestModel,
    pub train: &'a ClassificationReport,
    pub test: &'a ClassificationReport,
}

pub fn build_run_report(summary: &RunSummary) -> anyhow::Result<Report> {
    let mut report = Report::new(
        "churn",
        env!("CARGO_PKG_VERSION"),
        "Churn Model Selection Report",
    );

    let mut overview = ReportSection::new("Overview");
    overview.add_content(html! {
        p {
            "Selected threshold " strong { (format!("{:.2}", summary.best.threshold)) }
            " with feature subset " strong { (summary.best.subset) }
            ", mean cross-validated profit " (format!("{:.4}", summary.best.score)) " per customer."
        }
        @if let Some(features) = summary.best.pipeline.feature_names() {
            p { "Classifier inputs: " (features.join(", ")) }
        }
    });
    overview.add_plot(plot_profit_curve(summary.results, "Profit Curve"));
    report.add_section(overview);

    let mut search = ReportSection::new("Search");
    search.add_content(search_table(summary.results, summary.best.threshold));
    report.add_section(search);

    let mut evaluation = ReportSection::new("Evaluation");
    evaluation.add_content(evaluation_table(&[("Train", summary.train), ("Test", summary.test)]));
    report.add_section(evaluation);

    let mut config = ReportSection::new("Configuration");
    config.add_content(html! {
        div class="code-container" {
            pre {
                code { (PreEscaped(serde_json::to_string_pretty(summary.config)?)) }
            }
        }
    });
    report.add_section(config);

    Ok(report)
}

/// Render the run report and write it to `path`.
pub fn write_report<P: AsRef<Path>>(path: P, summary: &RunSummary) -> anyhow::Result<()> {
    build_run_report(summary)?.save_to_file(&path)?;
    log::info!("Report written to: {}", path.as_ref().display());
    Ok(())
}

fn search_table(results: &[SearchResult], selected: f64) -> Markup {
    let subsets: Vec<&str> = results
        .first()
        .map(|r| r.candidates.iter().map(|c| c.subset.as_str()).collect())
        .unwrap_or_default();
    html! {
        table {
            tr {
                th { "Threshold" }
                th { "Best subset" }
                th { "Best profit" }
                @for subset in &subsets {
                    th { (subset) " (mean ± σ)" }
                }
            }
            @for r in results {
                tr class=[(r.threshold == selected).then_some("selected")] {
                    td { (format!("{:.2}", r.threshold)) }
                    td { (r.best_subset) }
                    td { (format!("{:.4}", r.best_score)) }
                    @for c in &r.candidates {
                        td { (format!("{:.4} ± {:.4}", c.mean_score, c.std_score)) }
                    }
                }
            }
        }
    }
}

fn evaluation_table(rows: &[(&str, &ClassificationReport)]) -> Markup {
    html! {
        table {
            tr {
                th { "Data" } th { "Accuracy" } th { "Precision" } th { "Recall" } th { "Profit" }
                th { "TP" } th { "FP" } th { "FN" } th { "TN" }
            }
            @for (name, r) in rows {
                tr {
                    td { (name) }
                    td { (format!("{:.4}", r.accuracy)) }
                    td { (format!("{:.4}", r.precision)) }
                    td { (format!("{:.4}", r.recall)) }
                    td { (format!("{:.4}", r.profit)) }
                    td { (r.confusion.true_positive) }
                    td { (r.confusion.false_positive) }
                    td { (r.confusion.false_negative) }
                    td { (r.confusion.true_negative) }
                }
            }
        }
    }
}
