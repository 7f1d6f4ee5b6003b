//! Min-Max Scaler for a single target column.
//!
//! The transformation is given by:
//! ```text
//! y_scaled = (y - y_min) / (y_max - y_min) * (max - min) + min
//! ```
//!
//! # Example
//! ```ignore
//! use drp_dataset::preprocessing::{MinMaxScaler, Transformer, FittedTransformer};
//!
//! let scaler = MinMaxScaler::new().with_range(-1.0, 1.0);
//! let fitted = scaler.fit(&train_y)?;
//! let scaled = fitted.transform(&test_y)?;
//! ```

use crate::error::{DatasetError, Result};
use crate::preprocessing::traits::{ensure_finite, FittedTransformer, Transformer};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Configuration for MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    /// Minimum value of the target range.
    pub min: f64,
    /// Maximum value of the target range.
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Serializable parameters for a fitted MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerParams {
    pub config: MinMaxScalerConfig,
    /// Minimum seen during fit.
    pub data_min: f64,
    /// Maximum seen during fit.
    pub data_max: f64,
    /// (max - min) / (data_max - data_min), or 1 for constant data.
    pub scale: f64,
}

/// MinMaxScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler {
    config: MinMaxScalerConfig,
}

impl MinMaxScaler {
    /// Create a new MinMaxScaler with default range [0, 1].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target range for scaling.
    ///
    /// # Panics
    /// Panics if `max <= min`.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        assert!(max > min, "max must be greater than min");
        self.config.min = min;
        self.config.max = max;
        self
    }

    pub fn config(&self) -> &MinMaxScalerConfig {
        &self.config
    }
}

impl Transformer for MinMaxScaler {
    type Input = Array1<f64>;
    type Output = Array1<f64>;
    type Params = MinMaxScalerParams;
    type Fitted = FittedMinMaxScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted> {
        if data.is_empty() {
            return Err(DatasetError::EmptyData(
                "Cannot fit MinMaxScaler on empty data".to_string(),
            ));
        }
        ensure_finite(data.iter(), "MinMaxScaler input")?;

        let data_min = data.fold(f64::INFINITY, |acc, &v| acc.min(v));
        let data_max = data.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let range = data_max - data_min;
        let scale = if range == 0.0 {
            1.0 // Constant target: scale by 1 to avoid division by zero
        } else {
            (self.config.max - self.config.min) / range
        };

        Ok(FittedMinMaxScaler {
            params: MinMaxScalerParams {
                config: self.config.clone(),
                data_min,
                data_max,
                scale,
            },
        })
    }
}

/// Fitted MinMaxScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedMinMaxScaler {
    params: MinMaxScalerParams,
}

impl FittedMinMaxScaler {
    /// Minimum seen during fit.
    pub fn data_min(&self) -> f64 {
        self.params.data_min
    }

    /// Maximum seen during fit.
    pub fn data_max(&self) -> f64 {
        self.params.data_max
    }

    pub fn scale(&self) -> f64 {
        self.params.scale
    }

    pub fn data_range(&self) -> f64 {
        self.params.data_max - self.params.data_min
    }
}

impl FittedTransformer for FittedMinMaxScaler {
    type Input = Array1<f64>;
    type Output = Array1<f64>;
    type Params = MinMaxScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output> {
        let p = &self.params;
        Ok(data.mapv(|y| (y - p.data_min) * p.scale + p.config.min))
    }

    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input> {
        let p = &self.params;
        Ok(data.mapv(|y| (y - p.config.min) / p.scale + p.data_min))
    }

    fn extract_params(&self) -> Self::Params {
        self.params.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if !(params.scale.is_finite() && params.scale > 0.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "scale must be positive and finite, got {}",
                params.scale
            )));
        }
        Ok(Self { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_data() -> Array1<f64> {
        array![1.0, 1.0, 3.0, 2.0]
    }

    #[test]
    fn test_minmax_scaler_fit() {
        let fitted = MinMaxScaler::new().fit(&create_test_data()).unwrap();
        assert_eq!(fitted.data_min(), 1.0);
        assert_eq!(fitted.data_max(), 3.0);
        assert!((fitted.scale() - 0.5).abs() < 1e-12);
        assert!((fitted.data_range() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scaler_transform() {
        let fitted = MinMaxScaler::new().fit(&create_test_data()).unwrap();
        let values = fitted.transform(&create_test_data()).unwrap();
        let expected = [0.0, 0.0, 1.0, 0.5];
        for (v, e) in values.iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-12, "Expected {}, got {}", e, v);
        }
    }

    #[test]
    fn test_minmax_scaler_custom_range() {
        let fitted = MinMaxScaler::new()
            .with_range(-1.0, 1.0)
            .fit(&create_test_data())
            .unwrap();
        let values = fitted.transform(&create_test_data()).unwrap();
        let expected = [-1.0, -1.0, 1.0, 0.0];
        for (v, e) in values.iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-12, "Expected {}, got {}", e, v);
        }
    }

    #[test]
    fn test_unseen_values_may_leave_range() {
        let fitted = MinMaxScaler::new().fit(&create_test_data()).unwrap();
        let values = fitted.transform(&array![5.0, -1.0]).unwrap();
        assert!((values[0] - 2.0).abs() < 1e-12);
        assert!((values[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scaler_inverse_transform() {
        let data = create_test_data();
        let fitted = MinMaxScaler::new().with_range(-1.0, 1.0).fit(&data).unwrap();
        let recovered = fitted
            .inverse_transform(&fitted.transform(&data).unwrap())
            .unwrap();
        for (o, r) in data.iter().zip(recovered.iter()) {
            assert!((o - r).abs() < 1e-12, "Expected {}, got {}", o, r);
        }
    }

    #[test]
    fn test_minmax_scaler_zero_range() {
        let data = array![5.0, 5.0, 5.0];
        let fitted = MinMaxScaler::new().fit(&data).unwrap();
        let values = fitted.transform(&data).unwrap();
        assert!(values.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_minmax_scaler_empty_data() {
        let result = MinMaxScaler::new().fit(&Array1::zeros(0));
        assert!(matches!(result, Err(DatasetError::EmptyData(_))));
    }

    #[test]
    fn test_minmax_scaler_rejects_nan() {
        let result = MinMaxScaler::new().fit(&array![1.0, f64::NAN]);
        assert!(matches!(result, Err(DatasetError::Numerical(_))));
    }

    #[test]
    #[should_panic(expected = "max must be greater than min")]
    fn test_minmax_scaler_inverted_range() {
        let _ = MinMaxScaler::new().with_range(1.0, 0.0);
    }

    #[test]
    fn test_minmax_scaler_fit_transform() {
        let values = MinMaxScaler::new()
            .fit_transform(&create_test_data())
            .unwrap();
        assert!((values[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scaler_save_load_file() -> Result<()> {
        let data = create_test_data();
        let fitted = MinMaxScaler::new().with_range(-1.0, 1.0).fit(&data)?;

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("minmax.bin");
        fitted.save_to_file(&path)?;
        let loaded = FittedMinMaxScaler::load_from_file(&path)?;

        assert_eq!(loaded, fitted);
        assert_eq!(loaded.transform(&data)?, fitted.transform(&data)?);
        Ok(())
    }

    #[test]
    fn test_from_params_rejects_zero_scale() {
        let mut params = MinMaxScaler::new()
            .fit(&create_test_data())
            .unwrap()
            .extract_params();
        params.scale = 0.0;
        assert!(FittedMinMaxScaler::from_params(params).is_err());
    }
}
