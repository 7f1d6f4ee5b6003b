//! Scaling transformers for the response target.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`MinMaxScaler`] | Scale to [0, 1] or a custom range |

pub mod minmax;

pub use minmax::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
