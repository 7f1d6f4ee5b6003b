//! Seeded k-fold partitioning of an element sequence.

use crate::error::{DatasetError, Result};
use log::debug;
use rand::seq::SliceRandom;

/// Splits elements into `k` contiguous, near-equal folds.
///
/// With `n` elements the first `n % k` folds hold `n / k + 1` elements and the
/// rest hold `n / k`. Shuffling draws a uniform permutation from a generator
/// seeded with `seed`, so the same seed and input order always give the same
/// folds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldPartitioner {
    k: usize,
    seed: u64,
    shuffle: bool,
}

impl FoldPartitioner {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            shuffle: true,
        }
    }

    /// Keep the input order instead of shuffling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Partition `elements` into `k` folds.
    ///
    /// # Errors
    /// [`DatasetError::InvalidConfig`] if `k` is zero or larger than the number
    /// of elements; empty folds are never produced.
    pub fn partition<T: Clone>(&self, elements: &[T]) -> Result<Vec<Vec<T>>> {
        let n = elements.len();
        if self.k == 0 {
            return Err(DatasetError::InvalidConfig(
                "number of folds must be positive".to_string(),
            ));
        }
        if self.k > n {
            return Err(DatasetError::InvalidConfig(format!(
                "cannot split {} elements into {} folds",
                n, self.k
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        if self.shuffle {
            let mut rng = super::seeded_rng(self.seed);
            order.shuffle(&mut rng);
        }

        let base = n / self.k;
        let extra = n % self.k;
        let mut folds = Vec::with_capacity(self.k);
        let mut start = 0;
        for fold in 0..self.k {
            let size = base + usize::from(fold < extra);
            folds.push(
                order[start..start + size]
                    .iter()
                    .map(|&i| elements[i].clone())
                    .collect(),
            );
            start += size;
        }

        debug!(
            "partitioned {} elements into {} folds (seed={}, shuffle={})",
            n, self.k, self.seed, self.shuffle
        );
        Ok(folds)
    }
}

/// Partition the positions `0..n_elements` into `k` folds.
///
/// Shorthand for [`FoldPartitioner::partition`] over element positions.
pub fn partition_elements(
    n_elements: usize,
    k: usize,
    seed: u64,
    shuffle: bool,
) -> Result<Vec<Vec<usize>>> {
    let positions: Vec<usize> = (0..n_elements).collect();
    FoldPartitioner::new(k, seed)
        .with_shuffle(shuffle)
        .partition(&positions)
}
