use crate::config::WeekdayFlagConfig;
use crate::data_handling::{Column, Frame};
use crate::error::{ChurnError, Result};
use crate::preprocessing::TransformStage;

const STAGE: &str = "weekday flags";

/// Derives 0.0/1.0 weekday and weekend flags from a weekday-activity
/// percentage. Flags are recomputed from the source column on every call.
#[derive(Debug, Clone, Default)]
pub struct WeekdayFlags {
    config: WeekdayFlagConfig,
}

impl WeekdayFlags {
    pub fn new(config: WeekdayFlagConfig) -> Self {
        WeekdayFlags { config }
    }

    /// `(weekday, weekend)` for one percentage value.
    pub fn flags(&self, pct: Option<f64>) -> (f64, f64) {
        match pct {
            Some(p) => (
                f64::from(u8::from(p > self.config.weekday_above)),
                f64::from(u8::from(p < self.config.weekend_below)),
            ),
            None => (0.0, 0.0),
        }
    }
}

impl TransformStage for WeekdayFlags {
    fn name(&self) -> &str {
        STAGE
    }

    fn transform(&self, mut x: Frame) -> Result<Frame> {
        let source = &self.config.source_column;
        let (weekday, weekend): (Vec<Option<f64>>, Vec<Option<f64>>) = match x.column(source) {
            Some(Column::Numeric(values)) => values
                .iter()
                .map(|&pct| {
                    let (weekday, weekend) = self.flags(pct);
                    (Some(weekday), Some(weekend))
                })
                .unzip(),
            Some(other) => {
                return Err(ChurnError::schema(
                    STAGE,
                    format!("column '{}' is {:?}, expected numeric", source, other.kind()),
                ))
            }
            None => {
                return Err(ChurnError::schema(
                    STAGE,
                    format!("column '{}' is not present", source),
                ))
            }
        };
        x.set_column(self.config.weekday_column.as_str(), Column::Numeric(weekday))?;
        x.set_column(self.config.weekend_column.as_str(), Column::Numeric(weekend))?;
        Ok(x)
    }
}
