//! On-disk memoization of drug featurizations.
//!
//! A cache file lives at `{dir}/{pipeline}_{featurizer}.bin`, where both parts
//! are the `Display` identities of the preprocessing pipeline and the
//! featurizer. An existing file is trusted as-is: it is never recomputed or
//! checked for freshness, so changing a pipeline or featurizer without changing
//! its identity string reuses stale results. Delete the file to force a refresh.
//!
//! Reads and writes are whole-file. Two processes racing on a cold cache both
//! compute and the last write wins.

use super::{DrugFeaturizer, FeatureLookup};
use crate::error::Result;
use crate::serialization::{read_file, write_file};
use crate::table::DrugTable;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File extension of cache artifacts.
pub const CACHE_EXTENSION: &str = "bin";

/// Directory of persisted featurization results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureCache {
    dir: PathBuf,
}

impl FeatureCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key combining the pipeline and featurizer identities.
    pub fn signature(pipeline_identity: &str, featurizer_identity: &str) -> String {
        format!("{}_{}", pipeline_identity, featurizer_identity)
    }

    /// Path of the cache file for a signature.
    ///
    /// A `/` in an identity string places the file in a subdirectory of `dir`.
    pub fn path_for(&self, signature: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", signature, CACHE_EXTENSION))
    }

    /// Whether a cache file exists for the given identities.
    pub fn contains(&self, pipeline_identity: &str, featurizer_identity: &str) -> bool {
        self.path_for(&Self::signature(pipeline_identity, featurizer_identity))
            .exists()
    }

    /// Load the cached representations of `drugs`, computing and storing them
    /// on a miss.
    ///
    /// Drugs absent from the resulting map are reported in
    /// [`FeatureLookup::missing`] and logged as a warning; they do not fail the
    /// call.
    ///
    /// # Errors
    /// Propagates featurizer failures, unreadable cache files and write errors.
    pub fn load_or_compute<F>(
        &self,
        pipeline_identity: &str,
        featurizer: &F,
        drugs: &DrugTable,
    ) -> Result<FeatureLookup<F::Representation>>
    where
        F: DrugFeaturizer + ?Sized,
    {
        let signature = Self::signature(pipeline_identity, &featurizer.to_string());
        let path = self.path_for(&signature);

        let (features, from_cache) = if path.exists() {
            info!("loading cached drug features from {}", path.display());
            let features: BTreeMap<String, F::Representation> = read_file(&path)?;
            (features, true)
        } else {
            info!(
                "featurizing {} drugs with {} (cache miss for {})",
                drugs.len(),
                featurizer,
                signature
            );
            let features = featurizer.featurize(drugs.smiles(), drugs.ids())?;
            std::fs::create_dir_all(path.parent().unwrap_or(self.dir.as_path()))?;
            write_file(&features, &path)?;
            (features, false)
        };

        let missing = unreachable_ids(drugs.ids(), &features);
        if !missing.is_empty() {
            warn!(
                "it was not possible to featurize {} drug(s): {:?}",
                missing.len(),
                missing
            );
        }

        Ok(FeatureLookup {
            features,
            missing,
            from_cache,
        })
    }
}

/// Requested identifiers without an entry in `features`.
fn unreachable_ids<R>(requested: &[String], features: &BTreeMap<String, R>) -> BTreeSet<String> {
    requested
        .iter()
        .filter(|id| !features.contains_key(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use std::cell::Cell;
    use std::fmt;

    /// Featurizes a drug as its SMILES length; skips SMILES containing `?`.
    struct LengthFeaturizer {
        calls: Cell<usize>,
    }

    impl LengthFeaturizer {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl fmt::Display for LengthFeaturizer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "smiles-length")
        }
    }

    impl DrugFeaturizer for LengthFeaturizer {
        type Representation = Vec<f32>;

        fn featurize(
            &self,
            smiles: &[String],
            drug_ids: &[String],
        ) -> Result<BTreeMap<String, Vec<f32>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(drug_ids
                .iter()
                .zip(smiles)
                .filter(|(_, s)| !s.contains('?'))
                .map(|(id, s)| (id.clone(), vec![s.len() as f32]))
                .collect())
        }
    }

    struct FailingFeaturizer;

    impl fmt::Display for FailingFeaturizer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failing")
        }
    }

    impl DrugFeaturizer for FailingFeaturizer {
        type Representation = u8;

        fn featurize(&self, _: &[String], _: &[String]) -> Result<BTreeMap<String, u8>> {
            Err(DatasetError::Featurization("model not loaded".to_string()))
        }
    }

    fn create_drugs() -> DrugTable {
        DrugTable::new(vec![("D1", "CCO"), ("D2", "c1ccccc1"), ("D3", "C?C")])
    }

    #[test]
    fn test_signature_and_path() {
        let cache = FeatureCache::new("data/processed");
        let signature = FeatureCache::signature("GDSC", "morgan-2048");
        assert_eq!(signature, "GDSC_morgan-2048");
        assert_eq!(
            cache.path_for(&signature),
            PathBuf::from("data/processed/GDSC_morgan-2048.bin")
        );
    }

    #[test]
    fn test_cold_cache_computes_and_persists() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path().join("processed"));
        let featurizer = LengthFeaturizer::new();

        assert!(!cache.contains("GDSC", "smiles-length"));
        let lookup = cache.load_or_compute("GDSC", &featurizer, &create_drugs())?;

        assert!(!lookup.from_cache);
        assert_eq!(featurizer.calls.get(), 1);
        assert_eq!(lookup.get("D2"), Some(&vec![8.0]));
        assert!(cache.contains("GDSC", "smiles-length"));
        Ok(())
    }

    #[test]
    fn test_warm_cache_skips_featurizer() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());
        let featurizer = LengthFeaturizer::new();

        let first = cache.load_or_compute("GDSC", &featurizer, &create_drugs())?;
        let second = cache.load_or_compute("GDSC", &featurizer, &create_drugs())?;

        assert_eq!(featurizer.calls.get(), 1);
        assert!(second.from_cache);
        assert_eq!(first.features, second.features);
        assert_eq!(first.missing, second.missing);
        Ok(())
    }

    #[test]
    fn test_existing_file_is_trusted_verbatim() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());

        let mut stale: BTreeMap<String, Vec<f32>> = BTreeMap::new();
        stale.insert("D1".to_string(), vec![-1.0]);
        write_file(&stale, cache.path_for("GDSC_smiles-length"))?;

        let featurizer = LengthFeaturizer::new();
        let lookup = cache.load_or_compute("GDSC", &featurizer, &create_drugs())?;

        assert_eq!(featurizer.calls.get(), 0);
        assert_eq!(lookup.get("D1"), Some(&vec![-1.0]));
        let expected: BTreeSet<String> = ["D2", "D3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(lookup.missing, expected);
        Ok(())
    }

    #[test]
    fn test_reconciliation_reports_exactly_unreachable() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());
        let lookup = cache.load_or_compute("GDSC", &LengthFeaturizer::new(), &create_drugs())?;

        assert!(!lookup.is_complete());
        assert_eq!(lookup.missing.iter().collect::<Vec<_>>(), vec!["D3"]);
        assert_eq!(lookup.features.keys().collect::<Vec<_>>(), vec!["D1", "D2"]);
        Ok(())
    }

    #[test]
    fn test_identities_separate_cache_files() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());
        let featurizer = LengthFeaturizer::new();

        cache.load_or_compute("GDSC1", &featurizer, &create_drugs())?;
        cache.load_or_compute("GDSC2", &featurizer, &create_drugs())?;
        assert_eq!(featurizer.calls.get(), 2);
        Ok(())
    }

    #[test]
    fn test_identity_with_separator_creates_subdirectory() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());
        let featurizer = LengthFeaturizer::new();

        let lookup = cache.load_or_compute("GDSC/v2", &featurizer, &create_drugs())?;
        assert!(!lookup.from_cache);
        assert!(tmp.path().join("GDSC").join("v2_smiles-length.bin").exists());

        let again = cache.load_or_compute("GDSC/v2", &featurizer, &create_drugs())?;
        assert!(again.from_cache);
        assert_eq!(featurizer.calls.get(), 1);
        Ok(())
    }

    #[test]
    fn test_featurizer_failure_writes_nothing() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());

        let result = cache.load_or_compute("GDSC", &FailingFeaturizer, &create_drugs());
        assert!(matches!(result, Err(DatasetError::Featurization(_))));
        assert!(!cache.contains("GDSC", "failing"));
        Ok(())
    }

    #[test]
    fn test_corrupt_cache_file_is_an_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let cache = FeatureCache::new(tmp.path());
        std::fs::write(cache.path_for("GDSC_smiles-length"), b"\x01")?;

        let result = cache.load_or_compute("GDSC", &LengthFeaturizer::new(), &create_drugs());
        assert!(matches!(result, Err(DatasetError::Serialization(_))));
        Ok(())
    }
}
