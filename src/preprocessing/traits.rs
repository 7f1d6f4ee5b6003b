//! Core traits for value transformers.
//!
//! - [`Transformer`]: Unfitted; holds hyperparameters and learns from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.

use crate::error::{DatasetError, Result};
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use drp_dataset::preprocessing::{MinMaxScaler, Transformer};
///
/// let scaler = MinMaxScaler::new().with_range(-1.0, 1.0);
/// let fitted = scaler.fit(&train_targets)?;
/// let scaled = fitted.transform(&test_targets)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Learn parameters from the data.
    ///
    /// # Errors
    /// Returns [`DatasetError`] if the data is empty or contains non-finite values.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted>;

    /// Fit and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output> {
        self.fit(data)?.transform(data)
    }
}

/// Trait for fitted transformers.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` are cross-platform compatible.
pub trait FittedTransformer: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output>;

    /// Reverse the transformation.
    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self>
    where
        Self: Sized;

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        crate::serialization::write_file(&self.extract_params(), path)
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let params: Self::Params = crate::serialization::read_file(path)?;
        Self::from_params(params)
    }
}

/// Check that every value is finite before fitting.
pub(crate) fn ensure_finite<'a, I>(values: I, what: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().find(|v| !v.is_finite()) {
        Some(v) => Err(DatasetError::Numerical(format!(
            "{} contains a non-finite value ({})",
            what, v
        ))),
        None => Ok(()),
    }
}
