//! Fit-then-apply normalization of the response target `Y`.
//!
//! A [`TargetTransform`] is fitted on the training table of one run only, then
//! applied with the same parameters to the training, validation and test
//! tables. Statistics of held-out rows never influence the scaling.
//!
//! Two policies are provided:
//! - [`MinMaxScaling`]: min-max scale `Y` into a target range.
//! - [`LogMinMaxScaling`]: min-max scale `ln(Y + offset)` into a target range.

use crate::error::{DatasetError, Result};
use crate::preprocessing::scaling::{FittedMinMaxScaler, MinMaxScaler};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::ResponseTable;
use ndarray::Array1;

const NOT_FITTED: &str = "You are trying to transform data using a non-fitted processor";

/// Normalization of the `Y` column with an explicit fitting step.
///
/// Calling [`TargetTransform::transform`] (or `apply`, `inverse_values`)
/// before [`TargetTransform::fit`] is an ordering bug and panics. A failed
/// `fit` discards any earlier fit.
pub trait TargetTransform {
    /// Learn scaling parameters from the training table.
    fn fit(&mut self, train: &ResponseTable) -> Result<()>;

    fn is_fitted(&self) -> bool;

    /// Rescale `Y` of any table with the fitted parameters.
    fn apply(&self, data: &ResponseTable) -> Result<ResponseTable>;

    /// Map scaled values (e.g. model predictions) back to the original `Y` scale.
    fn inverse_values(&self, values: &Array1<f64>) -> Result<Array1<f64>>;

    /// Checked entry point: asserts the transform is fitted, then applies it.
    ///
    /// # Panics
    /// Panics if called before `fit`.
    fn transform(&self, data: &ResponseTable) -> Result<ResponseTable> {
        assert!(self.is_fitted(), "{}", NOT_FITTED);
        self.apply(data)
    }
}

fn fitted_or_panic(fitted: &Option<FittedMinMaxScaler>) -> &FittedMinMaxScaler {
    match fitted {
        Some(scaler) => scaler,
        None => panic!("{}", NOT_FITTED),
    }
}

/// Min-max scaling of `Y` into `target_range`.
#[derive(Clone, Debug)]
pub struct MinMaxScaling {
    scaler: MinMaxScaler,
    fitted: Option<FittedMinMaxScaler>,
}

impl Default for MinMaxScaling {
    fn default() -> Self {
        Self::new((-1.0, 1.0))
    }
}

impl MinMaxScaling {
    /// # Panics
    /// Panics if `target_range.1 <= target_range.0`.
    pub fn new(target_range: (f64, f64)) -> Self {
        Self {
            scaler: MinMaxScaler::new().with_range(target_range.0, target_range.1),
            fitted: None,
        }
    }

    /// Fitted scaler, if any.
    pub fn fitted(&self) -> Option<&FittedMinMaxScaler> {
        self.fitted.as_ref()
    }
}

impl TargetTransform for MinMaxScaling {
    fn fit(&mut self, train: &ResponseTable) -> Result<()> {
        self.fitted = None;
        self.fitted = Some(self.scaler.fit(&train.targets())?);
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn apply(&self, data: &ResponseTable) -> Result<ResponseTable> {
        let scaled = fitted_or_panic(&self.fitted).transform(&data.targets())?;
        data.with_targets(scaled.view())
    }

    fn inverse_values(&self, values: &Array1<f64>) -> Result<Array1<f64>> {
        fitted_or_panic(&self.fitted).inverse_transform(values)
    }
}

/// `ln(Y + offset)` followed by min-max scaling into `target_range`.
#[derive(Clone, Debug)]
pub struct LogMinMaxScaling {
    offset: f64,
    scaler: MinMaxScaler,
    fitted: Option<FittedMinMaxScaler>,
}

impl Default for LogMinMaxScaling {
    fn default() -> Self {
        Self::new(1.0, (-1.0, 1.0))
    }
}

impl LogMinMaxScaling {
    /// # Panics
    /// Panics if `target_range.1 <= target_range.0`.
    pub fn new(offset: f64, target_range: (f64, f64)) -> Self {
        Self {
            offset,
            scaler: MinMaxScaler::new().with_range(target_range.0, target_range.1),
            fitted: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn fitted(&self) -> Option<&FittedMinMaxScaler> {
        self.fitted.as_ref()
    }

    fn log_targets(&self, data: &ResponseTable) -> Result<Array1<f64>> {
        let shifted = data.targets() + self.offset;
        if let Some(v) = shifted.iter().find(|v| v.is_nan() || **v <= 0.0) {
            return Err(DatasetError::Numerical(format!(
                "log argument must be positive, got Y + offset = {}",
                v
            )));
        }
        Ok(shifted.mapv(f64::ln))
    }
}

impl TargetTransform for LogMinMaxScaling {
    fn fit(&mut self, train: &ResponseTable) -> Result<()> {
        self.fitted = None;
        if train.is_empty() {
            return Err(DatasetError::EmptyData(
                "Cannot fit LogMinMaxScaling on an empty table".to_string(),
            ));
        }
        self.fitted = Some(self.scaler.fit(&self.log_targets(train)?)?);
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn apply(&self, data: &ResponseTable) -> Result<ResponseTable> {
        let fitted = fitted_or_panic(&self.fitted);
        let scaled = fitted.transform(&self.log_targets(data)?)?;
        data.with_targets(scaled.view())
    }

    fn inverse_values(&self, values: &Array1<f64>) -> Result<Array1<f64>> {
        let logs = fitted_or_panic(&self.fitted).inverse_transform(values)?;
        Ok(logs.mapv(|v| v.exp() - self.offset))
    }
}
