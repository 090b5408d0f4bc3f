//! Feature transform stages applied inside the pipeline.
//!
//! Every stage implements `TransformStage`: `fit` captures whatever state the
//! stage needs from the training frame, `transform` reshapes any frame using
//! that state and never refits. Stages may add, drop or rename columns but
//! never reorder or drop rows. Stages without fitted state keep the default
//! no-op `fit`.
use crate::data_handling::{Frame, Labels};
use crate::error::Result;

pub mod completeness;
pub mod dummify;
pub mod scaler;
pub mod subset;
pub mod type_normalizer;
pub mod weekday;

pub use completeness::RowCompletenessFilter;
pub use dummify::CategoricalExpander;
pub use scaler::{fit_scaler, transform_all, Scaler};
pub use subset::FeatureSubsetSelector;
pub use type_normalizer::TypeNormalizer;
pub use weekday::WeekdayFlags;

pub trait TransformStage: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn fit(&mut self, _x: &Frame, _y: &Labels) -> Result<()> {
        Ok(())
    }

    fn transform(&self, x: Frame) -> Result<Frame>;

    fn fit_transform(&mut self, x: Frame, y: &Labels) -> Result<Frame> {
        self.fit(&x, y)?;
        self.transform(x)
    }
}
