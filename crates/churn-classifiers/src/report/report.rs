use std::path::Path;

use anyhow::Context;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; color: #222; }
h1 { margin-bottom: 0.2em; }
.meta { color: #666; margin-top: 0; }
section { margin-top: 2em; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th { background-color: #f5f5f5; }
tr.selected { background-color: #e8f4e8; }
.code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; white-space: pre-wrap; }
";

/// A titled block of HTML fragments and plots.
#[derive(Debug, Clone)]
pub struct ReportSection {
    title: String,
    blocks: Vec<Markup>,
    n_plots: usize,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
            n_plots: 0,
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.n_plots += 1;
        let id = format!(
            "{}-plot-{}",
            self.title.to_lowercase().replace(' ', "-"),
            self.n_plots
        );
        self.blocks.push(PreEscaped(plot.to_inline_html(Some(&id))));
    }
}

/// Single-page HTML report.
#[derive(Debug, Clone)]
pub struct Report {
    software: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, title: &str) -> Self {
        Report {
            software: software.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_JS) {}
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (self.title) }
                    p class="meta" { (self.software) " v" (self.version) ", generated " (generated) }
                    @for s in &self.sections {
                        section {
                            h2 { (s.title) }
                            @for block in &s.blocks {
                                div { (block) }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render().into_string())
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}
