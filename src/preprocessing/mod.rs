//! Target preprocessing for drug-response tables.
//!
//! # Core Traits
//!
//! - [`Transformer`] / [`FittedTransformer`]: the unfitted/fitted pair used by
//!   value scalers such as [`MinMaxScaler`].
//! - [`TargetTransform`]: the fit-on-train, apply-everywhere contract used by
//!   [`crate::manager::DatasetManager`] to normalize `Y` for each run.
//!
//! # Example
//!
//! ```ignore
//! use drp_dataset::preprocessing::{LogMinMaxScaling, TargetTransform};
//!
//! let mut target = LogMinMaxScaling::new(1.0, (-1.0, 1.0));
//! target.fit(&partition.train)?;
//! let train = target.transform(&partition.train)?;
//! let test = target.transform(&partition.test)?;
//! ```

pub mod scaling;
pub mod target;
pub mod traits;

pub use scaling::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
pub use target::{LogMinMaxScaling, MinMaxScaling, TargetTransform};
pub use traits::{FittedTransformer, Transformer};
