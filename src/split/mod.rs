//! Seeded, leakage-controlled cross-validation splits.
//!
//! Splitting happens in three layers:
//!
//! 1. [`FoldPartitioner`] shuffles the elements (row indices, or the distinct
//!    values of a grouping column) with a seeded generator and cuts them into
//!    `k` near-equal folds.
//! 2. [`RoleAssignment`] draws a seeded derangement so that run `r` tests on
//!    fold `r` and validates on a different fold.
//! 3. [`Splitter`] turns a run index into concrete train/validation/test
//!    tables, dropping excluded elements from the test table only.
//!
//! Each layer re-seeds its own generator from the configured seed; the two
//! random streams are never chained. Re-running any single step with the same
//! seed reproduces its output exactly, regardless of what ran before it.
//!
//! # Example
//!
//! ```ignore
//! use drp_dataset::config::SplitConfig;
//! use drp_dataset::split::Splitter;
//! use drp_dataset::table::PartitionColumn;
//!
//! let config = SplitConfig::default()
//!     .with_k(5)
//!     .with_partition_column(PartitionColumn::CellId);
//! let mut splitter = Splitter::new(table, config)?;
//! splitter.fit()?;
//!
//! for partition in splitter.runs() {
//!     let (train, validation, test) = partition.sizes();
//! }
//! ```

pub mod partition;
pub mod roles;
pub mod splitter;

pub use partition::{partition_elements, FoldPartitioner};
pub use roles::{assign_validation_folds, RoleAssignment};
pub use splitter::{Elements, Splitter};

use crate::table::ResponseTable;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fresh generator for one splitting step.
///
/// ChaCha8 output is stable across platforms and crate releases, so a seed
/// stored alongside an experiment keeps reproducing the same folds.
pub(crate) fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Train, validation and test tables of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    pub train: ResponseTable,
    pub validation: ResponseTable,
    pub test: ResponseTable,
}

impl Partition {
    /// Row counts as `(train, validation, test)`.
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.len(), self.validation.len(), self.test.len())
    }

    /// Apply `f` to each of the three tables.
    pub fn try_map<F, E>(&self, mut f: F) -> Result<Partition, E>
    where
        F: FnMut(&ResponseTable) -> Result<ResponseTable, E>,
    {
        Ok(Partition {
            train: f(&self.train)?,
            validation: f(&self.validation)?,
            test: f(&self.test)?,
        })
    }
}
