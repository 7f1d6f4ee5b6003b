//! Drug featurization and its persisted cache.
//!
//! A [`DrugFeaturizer`] turns SMILES strings into some representation. How it
//! does so is up to the implementor; this crate only decides when it runs and
//! whether a stored result can be reused, through [`FeatureCache`].

pub mod cache;

pub use cache::FeatureCache;

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Computes a representation for each drug.
///
/// The `Display` output identifies the featurization and is part of the cache
/// signature: two featurizers that print the same string share cache files.
pub trait DrugFeaturizer: fmt::Display {
    /// Per-drug representation (fingerprint bits, descriptor vector, graph...).
    type Representation: Serialize + DeserializeOwned;

    /// Featurize `smiles[i]` for `drug_ids[i]`.
    ///
    /// Drugs that cannot be represented are left out of the returned map
    /// instead of failing the whole call.
    fn featurize(
        &self,
        smiles: &[String],
        drug_ids: &[String],
    ) -> Result<BTreeMap<String, Self::Representation>>;
}

/// Representations returned by a cache lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureLookup<R> {
    /// Representation of every drug that could be featurized.
    pub features: BTreeMap<String, R>,
    /// Requested drugs without a representation.
    pub missing: BTreeSet<String>,
    /// Whether `features` was read from an existing cache file.
    pub from_cache: bool,
}

impl<R> FeatureLookup<R> {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn get(&self, drug_id: &str) -> Option<&R> {
        self.features.get(drug_id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
