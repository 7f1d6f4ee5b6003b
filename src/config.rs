//! Configuration for splitting, target scaling and feature caching.
//!
//! Every struct deserializes from JSON with defaults for omitted fields:
//!
//! ```json
//! {
//!   "split": { "k": 5, "partition_column": "CELL_ID", "exclude_from_test": ["C7"] },
//!   "target": { "kind": "log_min_max", "offset": 1.0, "range": [-1.0, 1.0] },
//!   "cache_dir": "data/processed"
//! }
//! ```

use crate::error::{DatasetError, Result};
use crate::preprocessing::target::{LogMinMaxScaling, MinMaxScaling, TargetTransform};
use crate::table::PartitionColumn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of folds.
pub const DEFAULT_K: usize = 25;
/// Default seed for fold construction and role assignment.
pub const DEFAULT_SEED: u64 = 3558;
/// Default directory of persisted featurization caches.
pub const DEFAULT_CACHE_DIR: &str = "data/processed";

/// How rows are split into folds and rotated across runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Number of folds, which is also the number of runs.
    pub k: usize,
    pub seed: u64,
    pub shuffle: bool,
    /// Group rows by this column; `None` splits individual rows.
    pub partition_column: Option<PartitionColumn>,
    /// Elements never placed in a test table: group values, or row indices
    /// when no partition column is set.
    pub exclude_from_test: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            seed: DEFAULT_SEED,
            shuffle: true,
            partition_column: None,
            exclude_from_test: Vec::new(),
        }
    }
}

impl SplitConfig {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_partition_column(mut self, column: PartitionColumn) -> Self {
        self.partition_column = Some(column);
        self
    }

    pub fn with_exclude_from_test<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_test = elements.into_iter().map(Into::into).collect();
        self
    }

    /// # Errors
    /// [`DatasetError::InvalidConfig`] if `k < 2`.
    pub fn validate(&self) -> Result<()> {
        if self.k < 2 {
            return Err(DatasetError::InvalidConfig(format!(
                "k must be at least 2 to hold distinct validation and test folds, got {}",
                self.k
            )));
        }
        Ok(())
    }
}

/// Target scaling policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetConfig {
    /// Min-max scale `Y` into `range`.
    MinMax {
        #[serde(default = "default_range")]
        range: (f64, f64),
    },
    /// Min-max scale `ln(Y + offset)` into `range`.
    LogMinMax {
        #[serde(default = "default_offset")]
        offset: f64,
        #[serde(default = "default_range")]
        range: (f64, f64),
    },
}

fn default_range() -> (f64, f64) {
    (-1.0, 1.0)
}

fn default_offset() -> f64 {
    1.0
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig::MinMax {
            range: default_range(),
        }
    }
}

impl TargetConfig {
    fn range(&self) -> (f64, f64) {
        match self {
            TargetConfig::MinMax { range } | TargetConfig::LogMinMax { range, .. } => *range,
        }
    }

    /// # Errors
    /// [`DatasetError::InvalidConfig`] if the range is empty, inverted or not finite.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.range();
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(DatasetError::InvalidConfig(format!(
                "target range must satisfy min < max, got ({}, {})",
                min, max
            )));
        }
        if let TargetConfig::LogMinMax { offset, .. } = self {
            if !offset.is_finite() {
                return Err(DatasetError::InvalidConfig(format!(
                    "log offset must be finite, got {}",
                    offset
                )));
            }
        }
        Ok(())
    }

    /// Construct the configured, unfitted target transform.
    pub fn build(&self) -> Result<Box<dyn TargetTransform>> {
        self.validate()?;
        Ok(match *self {
            TargetConfig::MinMax { range } => Box::new(MinMaxScaling::new(range)),
            TargetConfig::LogMinMax { offset, range } => {
                Box::new(LogMinMaxScaling::new(offset, range))
            }
        })
    }
}

/// Top-level configuration of a [`crate::manager::DatasetManager`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub split: SplitConfig,
    pub target: TargetConfig,
    /// Directory holding featurization caches.
    pub cache_dir: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            target: TargetConfig::default(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl DatasetConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.target.validate()
    }
}
