use crate::data_handling::{Frame, Labels};
use crate::error::{ChurnError, Result};
use crate::preprocessing::TransformStage;

const STAGE: &str = "row-completeness filter";

/// Keeps only the columns that were fully populated in the fitting frame.
#[derive(Debug, Clone, Default)]
pub struct RowCompletenessFilter {
    keep_columns: Option<Vec<String>>,
}

impl RowCompletenessFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransformStage for RowCompletenessFilter {
    fn name(&self) -> &str {
        STAGE
    }

    fn fit(&mut self, x: &Frame, _y: &Labels) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ChurnError::EmptyDataset(format!("{} fitted on zero rows", STAGE)));
        }
        let counts: Vec<(&str, usize)> = x.columns().map(|(name, c)| (name, c.non_missing())).collect();
        let max_count = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);

        let keep: Vec<String> = counts
            .iter()
            .filter(|&&(_, n)| n == max_count && n == x.nrows())
            .map(|&(name, _)| name.to_string())
            .collect();
        if keep.is_empty() {
            return Err(ChurnError::EmptySubset {
                ncols: x.ncols(),
                nrows: x.nrows(),
            });
        }

        let dropped: Vec<&str> = counts
            .iter()
            .filter(|&&(name, _)| !keep.iter().any(|k| k == name))
            .map(|&(name, _)| name)
            .collect();
        if !dropped.is_empty() {
            log::debug!("Dropping incomplete columns: {}", dropped.join(", "));
        }

        self.keep_columns = Some(keep);
        Ok(())
    }

    fn transform(&self, x: Frame) -> Result<Frame> {
        let keep = self
            .keep_columns
            .as_ref()
            .ok_or_else(|| ChurnError::NotFitted(STAGE.to_string()))?;
        x.select_columns(keep, STAGE)
    }
}
