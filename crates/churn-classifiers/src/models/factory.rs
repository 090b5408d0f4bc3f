use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GBDTClassifier;
use crate::models::logistic::LogisticClassifier;

/// Build a boxed, unfitted classifier from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Box<dyn ClassifierModel> {
    match params.model_type {
        ModelType::Logistic { .. } => Box::new(LogisticClassifier::new(params.clone())),
        ModelType::GBDT { .. } => Box::new(GBDTClassifier::new(params.clone())),
    }
}
