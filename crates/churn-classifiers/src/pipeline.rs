//! The fixed transform chain plus classifier, fitted and applied as one unit.

use ndarray::Array1;

use crate::config::{FeatureSubset, ModelConfig, PipelineConfig};
use crate::data_handling::{Frame, Labels};
use crate::error::{ChurnError, Result};
use crate::models::{build_model, ClassifierModel};
use crate::preprocessing::{
    CategoricalExpander, FeatureSubsetSelector, RowCompletenessFilter, TransformStage,
    TypeNormalizer, WeekdayFlags,
};
use crate::scoring::binarize;

/// Type normalizer → completeness filter → weekday flags → subset selector →
/// categorical expander → classifier.
pub struct Pipeline {
    subset: FeatureSubset,
    stages: Vec<Box<dyn TransformStage>>,
    classifier: Box<dyn ClassifierModel>,
    feature_names: Option<Vec<String>>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig, subset: FeatureSubset, model: &ModelConfig) -> Self {
        let stages: Vec<Box<dyn TransformStage>> = vec![
            Box::new(TypeNormalizer::new(config.type_normalizer.clone())),
            Box::new(RowCompletenessFilter::new()),
            Box::new(WeekdayFlags::new(config.weekday_flags.clone())),
            Box::new(FeatureSubsetSelector::new(subset.clone())),
            Box::new(
                CategoricalExpander::new(config.categorical.clone())
                    .with_missing_level(config.type_normalizer.missing_level.as_str()),
            ),
        ];
        Pipeline {
            subset,
            stages,
            classifier: build_model(model),
            feature_names: None,
        }
    }

    pub fn subset(&self) -> &FeatureSubset {
        &self.subset
    }

    /// Classifier input columns, known once fitted.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn is_fitted(&self) -> bool {
        self.feature_names.is_some()
    }

    pub fn fit(&mut self, x: &Frame, y: &Labels) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ChurnError::EmptyDataset(format!(
                "pipeline '{}' fitted on zero rows",
                self.subset.name
            )));
        }
        let mut frame = x.clone();
        for stage in self.stages.iter_mut() {
            frame = stage.fit_transform(frame, y)?;
            log::trace!(
                "[{}] after {}: {}",
                self.subset.name,
                stage.name(),
                frame.column_names().join(", ")
            );
        }
        let targets = y.align(frame.keys())?;
        let matrix = frame.to_matrix()?;
        self.classifier.fit(&matrix, &targets)?;
        self.feature_names = Some(frame.column_names().to_vec());
        Ok(())
    }

    /// Transform through every fitted stage and return positive-class
    /// probabilities, one per row of `x`.
    pub fn predict_proba(&self, x: &Frame) -> Result<Array1<f64>> {
        if !self.is_fitted() {
            return Err(ChurnError::NotFitted(format!("pipeline '{}'", self.subset.name)));
        }
        let mut frame = x.clone();
        for stage in &self.stages {
            frame = stage.transform(frame)?;
        }
        self.classifier.predict_proba(&frame.to_matrix()?)
    }

    pub fn predict(&self, x: &Frame, threshold: f64) -> Result<Vec<u8>> {
        binarize(self.predict_proba(x)?.view(), threshold)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("subset", &self.subset.name)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("classifier", &self.classifier.name())
            .field("feature_names", &self.feature_names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::Column;

    fn frame() -> Frame {
        let text = |v: &[&str]| Column::Categorical(v.iter().map(|s| Some(s.to_string())).collect());
        Frame::new(vec![0, 1, 2, 3])
            .with_column("avg_dist", Column::Numeric(vec![Some(1.0), Some(9.0), Some(1.5), Some(8.0)]))
            .unwrap()
            .with_column("trips_in_first_30_days", Column::Numeric(vec![Some(0.0), Some(5.0), Some(1.0), Some(4.0)]))
            .unwrap()
            .with_column("city", text(&["A", "B", "A", "B"]))
            .unwrap()
            .with_column("phone", text(&["iPhone", "Android", "iPhone", "Android"]))
            .unwrap()
            .with_column("weekday_pct", Column::Numeric(vec![Some(5.0), Some(50.0), Some(95.0), Some(50.0)]))
            .unwrap()
            .with_column("last_trip_date", text(&["2014-01-01", "2014-06-20", "2014-02-01", "2014-06-25"]))
            .unwrap()
            .with_column("signup_date", text(&["2014-01-01", "2014-01-02", "2014-01-03", "2014-01-04"]))
            .unwrap()
    }

    #[test]
    fn predict_before_fit_is_not_fitted() {
        let pipeline = Pipeline::new(
            &PipelineConfig::default(),
            FeatureSubset::defaults().remove(0),
            &ModelConfig::default(),
        );
        assert!(matches!(pipeline.predict_proba(&frame()), Err(ChurnError::NotFitted(_))));
    }

    #[test]
    fn records_expanded_feature_names() {
        let mut pipeline = Pipeline::new(
            &PipelineConfig::default(),
            FeatureSubset::defaults().remove(0),
            &ModelConfig::default(),
        );
        let labels = Labels::new(vec![0, 1, 2, 3], vec![1, 0, 1, 0]).unwrap();
        pipeline.fit(&frame(), &labels).unwrap();
        let names: Vec<&str> = pipeline
            .feature_names()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            names,
            ["avg_dist", "trips_in_first_30_days", "city_A", "city_B", "phone_Android", "phone_iPhone"]
        );
        assert_eq!(pipeline.predict(&frame(), 0.5).unwrap(), vec![1, 0, 1, 0]);
    }

    #[test]
    fn labels_are_joined_by_key() {
        let mut pipeline = Pipeline::new(
            &PipelineConfig::default(),
            FeatureSubset::defaults().remove(0),
            &ModelConfig::default(),
        );
        // Same labels as above, listed in a different order.
        let labels = Labels::new(vec![3, 2, 1, 0], vec![0, 1, 0, 1]).unwrap();
        pipeline.fit(&frame(), &labels).unwrap();
        assert_eq!(pipeline.predict(&frame(), 0.5).unwrap(), vec![1, 0, 1, 0]);
    }

    #[test]
    fn missing_label_for_a_row_is_alignment_error() {
        let mut pipeline = Pipeline::new(
            &PipelineConfig::default(),
            FeatureSubset::defaults().remove(0),
            &ModelConfig::default(),
        );
        let labels = Labels::new(vec![0, 1, 2], vec![1, 0, 1]).unwrap();
        assert!(matches!(
            pipeline.fit(&frame(), &labels),
            Err(ChurnError::LabelAlignment(3))
        ));
    }
}
