use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::preprocessing::{fit_scaler, transform_all, Scaler};

/// L2-regularized logistic regression fitted by batch gradient descent on
/// standardized features.
pub struct LogisticClassifier {
    params: ModelConfig,
    fitted: Option<FittedLogistic>,
}

#[derive(Debug, Clone)]
struct FittedLogistic {
    scaler: Scaler,
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticClassifier {
            params,
            fitted: None,
        }
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        let ModelType::Logistic {
            max_iter,
            alpha,
            tol,
            fit_intercept,
        } = self.params.model_type
        else {
            return Err(ChurnError::Model(format!(
                "expected ModelType::Logistic params, got {:?}",
                self.params.model_type
            )));
        };
        if x.nrows() != y.len() {
            return Err(ChurnError::LengthMismatch {
                labels: y.len(),
                predictions: x.nrows(),
            });
        }
        if x.nrows() == 0 {
            return Err(ChurnError::EmptyDataset("logistic regression fitted on zero rows".to_string()));
        }

        let n_samples = x.nrows() as f64;
        let lr = self.params.learning_rate;
        let scaler = fit_scaler(x);
        let xs = transform_all(x, &scaler);
        let targets = y.mapv(f64::from);

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut converged_at = None;

        for iter in 0..max_iter {
            let predictions = (xs.dot(&weights) + bias).mapv(Self::sigmoid);
            let errors = &predictions - &targets;
            let dw = xs.t().dot(&errors) / n_samples + alpha * &weights;
            let db = if fit_intercept { errors.sum() / n_samples } else { 0.0 };

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < tol {
                converged_at = Some(iter);
                break;
            }

            weights.scaled_add(-lr, &dw);
            bias -= lr * db;
        }

        match converged_at {
            Some(iter) => log::trace!("Logistic regression converged after {} iterations", iter),
            None => log::trace!("Logistic regression stopped at max_iter = {}", max_iter),
        }

        self.fitted = Some(FittedLogistic {
            scaler,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| ChurnError::NotFitted(self.name().to_string()))?;
        if x.ncols() != fitted.weights.len() {
            return Err(ChurnError::Model(format!(
                "expected {} features, got {}",
                fitted.weights.len(),
                x.ncols()
            )));
        }
        let xs = transform_all(x, &fitted.scaler);
        Ok((xs.dot(&fitted.weights) + fitted.bias).mapv(Self::sigmoid))
    }

    fn name(&self) -> &str {
        "logistic regression"
    }
}
