//! Orchestration of preprocessing, splitting, target scaling and feature caching.

use crate::config::{DatasetConfig, SplitConfig};
use crate::error::{DatasetError, Result};
use crate::featurize::{DrugFeaturizer, FeatureCache, FeatureLookup};
use crate::pipeline::PreprocessingPipeline;
use crate::preprocessing::target::TargetTransform;
use crate::split::{Partition, Splitter};
use crate::table::{CellLineTable, ResponseTable};
use log::info;

/// Fewest folds that leave one training fold next to validation and test.
pub const MIN_RUN_FOLDS: usize = 3;

/// Entry point for model training code.
///
/// On construction the pipeline is run once and the resulting table is handed
/// to a fitted [`Splitter`]. Each call to [`DatasetManager::partition`] refits
/// the target transform on that run's training rows and applies it to all
/// three tables.
pub struct DatasetManager<P, F> {
    pipeline: P,
    featurizer: F,
    splitter: Splitter,
    target: Box<dyn TargetTransform>,
    cache: FeatureCache,
}

impl<P, F> DatasetManager<P, F>
where
    P: PreprocessingPipeline,
    F: DrugFeaturizer,
{
    /// Build a manager from a configuration.
    ///
    /// # Errors
    /// Invalid configuration (including `k < 3`), pipeline failures, or too few
    /// elements for `k`.
    pub fn new(pipeline: P, featurizer: F, config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let target = config.target.build()?;
        let cache = FeatureCache::new(config.cache_dir);
        Self::with_target(pipeline, featurizer, config.split, target, cache)
    }

    /// Build a manager around an explicit target transform and cache.
    pub fn with_target(
        pipeline: P,
        featurizer: F,
        split: SplitConfig,
        target: Box<dyn TargetTransform>,
        cache: FeatureCache,
    ) -> Result<Self> {
        if split.k < MIN_RUN_FOLDS {
            return Err(DatasetError::InvalidConfig(format!(
                "k must be at least {} so every run keeps a training fold, got {}",
                MIN_RUN_FOLDS, split.k
            )));
        }
        let data = pipeline.preprocess()?;
        let mut splitter = Splitter::new(data, split)?;
        splitter.fit()?;
        info!(
            "dataset manager ready for {}: {} rows, {} runs",
            pipeline,
            splitter.data().len(),
            splitter.k()
        );
        Ok(Self {
            pipeline,
            featurizer,
            splitter,
            target,
            cache,
        })
    }

    /// The preprocessed response table.
    pub fn data(&self) -> &ResponseTable {
        self.splitter.data()
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Number of runs.
    pub fn k(&self) -> usize {
        self.splitter.k()
    }

    /// Target-scaled train, validation and test tables of run `run`.
    ///
    /// The target transform is refitted on the run's training table, so after
    /// this call [`DatasetManager::target_transform`] can invert predictions
    /// made for that run.
    ///
    /// # Panics
    /// Panics if `run >= k`.
    pub fn partition(&mut self, run: usize) -> Result<Partition> {
        let raw = self.splitter.split(run);
        self.target.fit(&raw.train)?;
        let target = &self.target;
        raw.try_map(|table| target.transform(table))
    }

    /// Target transform as fitted by the last [`DatasetManager::partition`] call.
    pub fn target_transform(&self) -> &dyn TargetTransform {
        self.target.as_ref()
    }

    pub fn cell_lines(&self) -> Result<CellLineTable> {
        self.pipeline.cell_lines()
    }

    /// Drug representations, read from the feature cache or computed into it.
    pub fn drugs(&self) -> Result<FeatureLookup<F::Representation>> {
        let drugs = self.pipeline.drugs()?;
        self.cache
            .load_or_compute(&self.pipeline.to_string(), &self.featurizer, &drugs)
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn featurizer(&self) -> &F {
        &self.featurizer
    }

    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }
}
