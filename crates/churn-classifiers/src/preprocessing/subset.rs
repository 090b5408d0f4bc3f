use crate::config::FeatureSubset;
use crate::data_handling::Frame;
use crate::error::Result;
use crate::preprocessing::TransformStage;

/// Restricts a frame to exactly the configured columns, in order. This is
/// the stage the search varies.
#[derive(Debug, Clone)]
pub struct FeatureSubsetSelector {
    subset: FeatureSubset,
}

impl FeatureSubsetSelector {
    pub fn new(subset: FeatureSubset) -> Self {
        FeatureSubsetSelector { subset }
    }
}

impl TransformStage for FeatureSubsetSelector {
    fn name(&self) -> &str {
        "feature subset selector"
    }

    fn transform(&self, x: Frame) -> Result<Frame> {
        x.select_columns(&self.subset.columns, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::Column;
    use crate::error::ChurnError;

    fn frame() -> Frame {
        Frame::new(vec![0])
            .with_column("a", Column::Numeric(vec![Some(1.0)]))
            .unwrap()
            .with_column("b", Column::Numeric(vec![Some(2.0)]))
            .unwrap()
            .with_column("c", Column::Numeric(vec![Some(3.0)]))
            .unwrap()
    }

    #[test]
    fn selects_in_configured_order() {
        let stage = FeatureSubsetSelector::new(FeatureSubset::new("t", &["c", "a"]));
        let out = stage.transform(frame()).unwrap();
        assert_eq!(out.column_names(), &["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn unknown_column_is_schema_mismatch() {
        let stage = FeatureSubsetSelector::new(FeatureSubset::new("t", &["a", "zzz"]));
        assert!(matches!(
            stage.transform(frame()),
            Err(ChurnError::SchemaMismatch { .. })
        ));
    }
}
