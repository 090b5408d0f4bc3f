//! Per-column mean/std standardization used by the linear classifier.

use ndarray::{Array1, Array2, Axis};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;
}

/// Fit a `Scaler` where rows are samples and columns are features.
/// An empty matrix yields an empty scaler.
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let ncols = x.ncols();
    if x.nrows() == 0 {
        return Scaler {
            mean: Array1::zeros(ncols),
            std: Array1::ones(ncols),
        };
    }
    let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(ncols));
    let std = x
        .var_axis(Axis(0), 0.0)
        .mapv(|v| v.sqrt().max(Scaler::MIN_STD));
    Scaler { mean, std }
}

/// Standardize every row with a fitted `Scaler`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    (x - &sc.mean) / &sc.std
}
