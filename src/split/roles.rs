//! Rotation of folds into validation and test roles.

use crate::error::{DatasetError, Result};
use log::debug;
use rand::seq::SliceRandom;

/// Per-run validation and test fold indices.
///
/// Run `r` tests on fold `r`. Its validation fold comes from a seeded random
/// permutation with no fixed points, so validation and test never coincide.
/// The remaining `k - 2` folds are used for training.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleAssignment {
    validation: Vec<usize>,
    test: Vec<usize>,
}

impl RoleAssignment {
    /// Draw a derangement of `0..k` by rejection sampling.
    ///
    /// Permutations are drawn from a generator seeded with `seed` until one has
    /// no fixed point. About `e` draws are needed on average.
    ///
    /// # Errors
    /// [`DatasetError::InvalidConfig`] if `k < 2`: no derangement exists.
    pub fn assign(k: usize, seed: u64) -> Result<Self> {
        if k < 2 {
            return Err(DatasetError::InvalidConfig(format!(
                "at least 2 folds are needed to separate validation from test, got {}",
                k
            )));
        }

        let mut rng = super::seeded_rng(seed);
        let test: Vec<usize> = (0..k).collect();
        let mut draws = 0usize;
        let validation = loop {
            draws += 1;
            let mut candidate = test.clone();
            candidate.shuffle(&mut rng);
            if candidate.iter().zip(&test).all(|(v, t)| v != t) {
                break candidate;
            }
        };

        debug!("assigned fold roles for k={} after {} draws", k, draws);
        Ok(Self { validation, test })
    }

    /// Number of folds (and runs).
    pub fn k(&self) -> usize {
        self.test.len()
    }

    /// Validation fold of a run.
    ///
    /// # Panics
    /// Panics if `run >= k`.
    pub fn validation_fold(&self, run: usize) -> usize {
        self.validation[run]
    }

    /// Test fold of a run (always `run`).
    ///
    /// # Panics
    /// Panics if `run >= k`.
    pub fn test_fold(&self, run: usize) -> usize {
        self.test[run]
    }

    /// Training folds of a run, ascending.
    pub fn train_folds(&self, run: usize) -> Vec<usize> {
        let (val, test) = (self.validation_fold(run), self.test_fold(run));
        (0..self.k()).filter(|&f| f != val && f != test).collect()
    }

    pub fn validation_folds(&self) -> &[usize] {
        &self.validation
    }

    pub fn test_folds(&self) -> &[usize] {
        &self.test
    }
}

/// Validation fold of every run, indexed by run.
pub fn assign_validation_folds(k: usize, seed: u64) -> Result<Vec<usize>> {
    Ok(RoleAssignment::assign(k, seed)?.validation)
}
