use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2, ArrayView1};

use crate::config::{ModelConfig, ModelType};
use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Gradient Boosting Decision Tree (GBDT) classifier
pub struct GBDTClassifier {
    model: Option<GBDT>,
    feature_size: usize,
    params: ModelConfig,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            model: None,
            feature_size: 0,
            params,
        }
    }

    fn to_row(row: ArrayView1<f64>) -> Vec<f32> {
        row.iter().map(|&v| v as f32).collect()
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        let ModelType::GBDT {
            max_depth,
            num_boost_round,
            debug,
            training_optimization_level,
            loss_type,
        } = &self.params.model_type
        else {
            return Err(ChurnError::Model(format!(
                "expected ModelType::GBDT params, got {:?}",
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
            return Err(ChurnError::EmptyDataset("GBDT fitted on zero rows".to_string()));
        }

        let feature_size = x.ncols();
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate as f32);
        config.set_max_depth(*max_depth);
        config.set_iterations(*num_boost_round as usize);
        config.set_debug(*debug);
        config.set_training_optimization_level(*training_optimization_level);
        config.set_loss(loss_type);

        // LogLikelyhood expects labels in {-1, 1}.
        let log_likelihood = loss_type == "LogLikelyhood";
        let mut train_x = DataVec::new();
        for (row, &label) in x.rows().into_iter().zip(y.iter()) {
            let target = match (label, log_likelihood) {
                (1, _) => 1.0,
                (_, true) => -1.0,
                (_, false) => 0.0,
            };
            train_x.push(Data::new_training_data(Self::to_row(row), 1.0, target, None));
        }

        let mut gbdt = GBDT::new(&config);
        gbdt.fit(&mut train_x);
        log::trace!("GBDT fitted {} trees on {} rows", num_boost_round, x.nrows());

        self.feature_size = feature_size;
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ChurnError::NotFitted(self.name().to_string()))?;
        if x.ncols() != self.feature_size {
            return Err(ChurnError::Model(format!(
                "expected {} features, got {}",
                self.feature_size,
                x.ncols()
            )));
        }
        let test_x: DataVec = x
            .rows()
            .into_iter()
            .map(|row| Data::new_test_data(Self::to_row(row), None))
            .collect();
        let predictions = model.predict(&test_x);
        Ok(predictions
            .into_iter()
            .map(|p| f64::from(p).clamp(0.0, 1.0))
            .collect())
    }

    fn name(&self) -> &str {
        "GBDT"
    }
}
