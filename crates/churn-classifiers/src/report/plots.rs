use plotly::color::{Rgb, Rgba};
use plotly::common::{Fill, Line, Mode};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};

use crate::search::SearchResult;

const PALETTE: [(u8, u8, u8); 6] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
];

/// Mean cross-validated profit per threshold, one line per feature subset
/// with a ±σ band across folds.
pub fn plot_profit_curve(results: &[SearchResult], title: &str) -> Plot {
    let thresholds: Vec<f64> = results.iter().map(|r| r.threshold).collect();
    let subsets: Vec<String> = results
        .first()
        .map(|r| r.candidates.iter().map(|c| c.subset.clone()).collect())
        .unwrap_or_default();

    let mut plot = Plot::new();
    for (i, subset) in subsets.iter().enumerate() {
        let (r, g, b) = PALETTE[i % PALETTE.len()];
        let mean: Vec<f64> = results.iter().map(|res| res.candidates[i].mean_score).collect();
        let std: Vec<f64> = results.iter().map(|res| res.candidates[i].std_score).collect();

        let mut band_x = thresholds.clone();
        band_x.extend(thresholds.iter().rev());
        let mut band_y: Vec<f64> = mean.iter().zip(&std).map(|(m, s)| m + s).collect();
        band_y.extend(mean.iter().zip(&std).rev().map(|(m, s)| m - s));

        plot.add_trace(
            Scatter::new(band_x, band_y)
                .name(&format!("{} ± σ", subset))
                .mode(Mode::Lines)
                .fill(Fill::ToSelf)
                .line(Line::new().width(0.0))
                .fill_color(Rgba::new(r, g, b, 0.15)),
        );
        plot.add_trace(
            Scatter::new(thresholds.clone(), mean)
                .name(subset.as_str())
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(Rgb::new(r, g, b))),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Threshold"))
            .y_axis(Axis::new().title("Mean CV profit per customer")),
    );
    plot
}
