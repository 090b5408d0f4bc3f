use std::collections::BTreeSet;

use crate::config::{CategoricalExpanderConfig, UnknownCategoryPolicy};
use crate::data_handling::{Column, Frame, Labels};
use crate::error::{ChurnError, Result};
use crate::preprocessing::TransformStage;

const STAGE: &str = "categorical expander";

/// Levels observed for one categorical column at fit time (sorted).
#[derive(Debug, Clone, PartialEq)]
struct FittedLevels {
    column: String,
    levels: Vec<String>,
}

/// One-hot expansion of every categorical column.
///
/// The fitted level set is the contract for every later transform: output
/// always holds exactly one `<column><sep><level>` indicator per fitted
/// level, so a level absent from the transform data yields an all-zero
/// column. A categorical column that appears or disappears after fit is a
/// `SchemaMismatch`; a level unseen at fit is handled per
/// `UnknownCategoryPolicy`. Missing cells give all-zero indicators, and so
/// does the missing level when it was not seen at fit.
#[derive(Debug, Clone, Default)]
pub struct CategoricalExpander {
    config: CategoricalExpanderConfig,
    missing_level: Option<String>,
    fitted: Option<Vec<FittedLevels>>,
}

impl CategoricalExpander {
    pub fn new(config: CategoricalExpanderConfig) -> Self {
        CategoricalExpander {
            config,
            missing_level: None,
            fitted: None,
        }
    }

    /// Treat `level` as a stand-in for a missing cell.
    pub fn with_missing_level(mut self, level: impl Into<String>) -> Self {
        self.missing_level = Some(level.into());
        self
    }

    fn indicator_name(&self, column: &str, level: &str) -> String {
        format!("{}{}{}", column, self.config.separator, level)
    }

    fn expand(
        &self,
        fitted: &FittedLevels,
        values: &[Option<String>],
        keys: &[u64],
    ) -> Result<Vec<(String, Column)>> {
        let mut indicators = vec![vec![Some(0.0); values.len()]; fitted.levels.len()];
        for (row, cell) in values.iter().enumerate() {
            let Some(value) = cell else { continue };
            match fitted.levels.binary_search(value) {
                Ok(level_idx) => indicators[level_idx][row] = Some(1.0),
                Err(_) if self.missing_level.as_ref() == Some(value) => {}
                Err(_) if self.config.unknown_category == UnknownCategoryPolicy::Ignore => {}
                Err(_) => {
                    return Err(ChurnError::schema(
                        STAGE,
                        format!(
                            "level '{}' of column '{}' at record {} was not seen at fit (known: {})",
                            value,
                            fitted.column,
                            keys[row],
                            fitted.levels.join(", ")
                        ),
                    ))
                }
            }
        }
        Ok(fitted
            .levels
            .iter()
            .zip(indicators)
            .map(|(level, values)| (self.indicator_name(&fitted.column, level), Column::Numeric(values)))
            .collect())
    }
}

impl TransformStage for CategoricalExpander {
    fn name(&self) -> &str {
        STAGE
    }

    fn fit(&mut self, x: &Frame, _y: &Labels) -> Result<()> {
        let fitted: Vec<FittedLevels> = x
            .columns()
            .filter_map(|(name, column)| match column {
                Column::Categorical(values) => {
                    let levels: BTreeSet<&String> = values.iter().flatten().collect();
                    Some(FittedLevels {
                        column: name.to_string(),
                        levels: levels.into_iter().cloned().collect(),
                    })
                }
                _ => None,
            })
            .collect();
        for f in &fitted {
            log::debug!("Expanding '{}' into {} levels: {}", f.column, f.levels.len(), f.levels.join(", "));
        }
        self.fitted = Some(fitted);
        Ok(())
    }

    fn transform(&self, x: Frame) -> Result<Frame> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| ChurnError::NotFitted(STAGE.to_string()))?;

        for f in fitted {
            match x.column(&f.column) {
                Some(Column::Categorical(_)) => {}
                Some(other) => {
                    return Err(ChurnError::schema(
                        STAGE,
                        format!("column '{}' was categorical at fit, now {:?}", f.column, other.kind()),
                    ))
                }
                None => {
                    return Err(ChurnError::schema(
                        STAGE,
                        format!("categorical column '{}' is not present", f.column),
                    ))
                }
            }
        }

        let mut out = Frame::new(x.keys().to_vec());
        for (name, column) in x.columns() {
            let Column::Categorical(values) = column else {
                push_unique(&mut out, name.to_string(), column.clone())?;
                continue;
            };
            let f = fitted.iter().find(|f| f.column == name).ok_or_else(|| {
                ChurnError::schema(STAGE, format!("categorical column '{}' was not present at fit", name))
            })?;
            for (indicator, values) in self.expand(f, values, x.keys())? {
                push_unique(&mut out, indicator, values)?;
            }
        }
        Ok(out)
    }
}

fn push_unique(frame: &mut Frame, name: String, column: Column) -> Result<()> {
    if frame.column(&name).is_some() {
        return Err(ChurnError::schema(STAGE, format!("duplicate output column '{}'", name)));
    }
    frame.set_column(name, column)
}
