//! # drp-dataset
//!
//! Dataset preparation for drug-response prediction: reproducible,
//! leakage-controlled cross-validation splits, train-only target scaling and
//! cached drug featurization.
//!
//! ## Core Design Principles
//!
//! - **Seeded Reproducibility**: Folds and fold roles are drawn from generators
//!   re-seeded from a single configured seed, so a seed fully determines a split.
//! - **No Leakage**: Grouped splitting keeps every row of a cell line or drug in
//!   one fold, and target scaling is fitted on training rows only.
//! - **Explicit Ordering**: Splitters and target transforms must be fitted before
//!   use. Calling them out of order is a programming error and panics.
//! - **Reusable Featurization**: Drug representations are persisted per
//!   pipeline/featurizer pair and never recomputed while the cache file exists.
//!
//! ## Quick Start
//!
//! ```ignore
//! use drp_dataset::config::DatasetConfig;
//! use drp_dataset::manager::DatasetManager;
//! use drp_dataset::pipeline::CsvPipeline;
//!
//! let pipeline = CsvPipeline::new("GDSC2", "data/responses.csv", "data/drugs.csv");
//! let config = DatasetConfig::from_json_file("dataset.json")?;
//! let mut manager = DatasetManager::new(pipeline, my_featurizer, config)?;
//!
//! let drugs = manager.drugs()?;
//! for run in 0..manager.k() {
//!     let partition = manager.partition(run)?;
//!     // train on partition.train, early-stop on partition.validation,
//!     // report on partition.test, then invert predictions with
//!     // manager.target_transform().inverse_values(..)
//! }
//! ```
//!
//! ## Module Structure
//!
//! - `table` — Response, drug and cell-line tables
//! - `split` — Fold partitioning, role assignment and the run splitter
//! - `preprocessing` — Min-max scaler and target transform policies
//! - `featurize` — Drug featurizer trait and the on-disk feature cache
//! - `pipeline` — Sources of preprocessed tables (CSV implementation)
//! - `manager` — Ties preprocessing, splitting, scaling and caching together
//! - `config` — JSON-deserializable configuration
//! - `serialization` — Binary persistence helpers
//! - `error` — Crate error type

/// Crate error type.
pub mod error;

/// Tabular containers for responses, drugs and cell lines.
pub mod table;

/// Leakage-controlled cross-validation splitting.
pub mod split;

/// Data preprocessing transformers.
pub mod preprocessing;

/// Drug featurization and caching.
pub mod featurize;

pub mod pipeline;

pub mod manager;

pub mod config;

/// Binary persistence utilities.
pub mod serialization;

pub use config::{DatasetConfig, SplitConfig, TargetConfig};
pub use error::{DatasetError, Result};
pub use featurize::{DrugFeaturizer, FeatureCache, FeatureLookup};
pub use manager::DatasetManager;
pub use pipeline::{CsvPipeline, PreprocessingPipeline};
pub use preprocessing::target::{LogMinMaxScaling, MinMaxScaling, TargetTransform};
pub use split::{FoldPartitioner, Partition, RoleAssignment, Splitter};
pub use table::{CellLineTable, DrugTable, PartitionColumn, ResponseRecord, ResponseTable};
