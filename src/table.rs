//! In-memory tables for drug-response data.
//!
//! - [`ResponseTable`] — the canonical `(CELL_ID, DRUG_ID, Y)` table. Row
//!   indices are positions in the table, so a table behaves as if its index had
//!   just been reset.
//! - [`DrugTable`] — drug identifiers with their SMILES strings.
//! - [`CellLineTable`] — cell-line identifiers with a numeric feature matrix.

use crate::error::{DatasetError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier column of the response table that rows can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionColumn {
    #[serde(rename = "CELL_ID")]
    CellId,
    #[serde(rename = "DRUG_ID")]
    DrugId,
}

impl fmt::Display for PartitionColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionColumn::CellId => write!(f, "CELL_ID"),
            PartitionColumn::DrugId => write!(f, "DRUG_ID"),
        }
    }
}

/// One measured response of a cell line to a drug.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "CELL_ID")]
    pub cell_id: String,
    #[serde(rename = "DRUG_ID")]
    pub drug_id: String,
    #[serde(rename = "Y")]
    pub y: f64,
}

impl ResponseRecord {
    pub fn new(cell_id: impl Into<String>, drug_id: impl Into<String>, y: f64) -> Self {
        Self {
            cell_id: cell_id.into(),
            drug_id: drug_id.into(),
            y,
        }
    }

    /// Value of an identifier column for this record.
    pub fn key(&self, column: PartitionColumn) -> &str {
        match column {
            PartitionColumn::CellId => &self.cell_id,
            PartitionColumn::DrugId => &self.drug_id,
        }
    }
}

/// Ordered drug-response rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseTable {
    records: Vec<ResponseRecord>,
}

impl ResponseTable {
    pub fn new(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResponseRecord> {
        self.records.iter()
    }

    /// The `Y` column.
    pub fn targets(&self) -> Array1<f64> {
        self.records.iter().map(|r| r.y).collect()
    }

    /// Copy of the table with the `Y` column replaced.
    ///
    /// # Errors
    /// [`DatasetError::LengthMismatch`] if `targets` does not have one value per row.
    pub fn with_targets(&self, targets: ArrayView1<'_, f64>) -> Result<Self> {
        if targets.len() != self.records.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.records.len(),
                got: targets.len(),
            });
        }
        let records = self
            .records
            .iter()
            .zip(targets.iter())
            .map(|(r, &y)| ResponseRecord { y, ..r.clone() })
            .collect();
        Ok(Self { records })
    }

    /// Rows at the given positions, in the order given.
    ///
    /// # Panics
    /// Panics if a position is out of bounds.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            records: rows.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// Distinct values of an identifier column, in order of first appearance.
    pub fn unique(&self, column: PartitionColumn) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.key(column))
            .filter(|k| seen.insert(*k))
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<ResponseRecord> for ResponseTable {
    fn from_iter<I: IntoIterator<Item = ResponseRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResponseTable {
    type Item = &'a ResponseRecord;
    type IntoIter = std::slice::Iter<'a, ResponseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Drug identifiers with their SMILES strings, indexed by `DRUG_ID`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrugTable {
    ids: Vec<String>,
    smiles: Vec<String>,
}

impl DrugTable {
    /// Build from `(DRUG_ID, SMILES)` pairs.
    pub fn new<I, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        let (ids, smiles) = entries
            .into_iter()
            .map(|(k, s)| (k.into(), s.into()))
            .unzip();
        Self { ids, smiles }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn smiles(&self) -> &[String] {
        &self.smiles
    }

    /// SMILES string of a drug, if present.
    pub fn get(&self, drug_id: &str) -> Option<&str> {
        self.ids
            .iter()
            .position(|id| id == drug_id)
            .map(|i| self.smiles[i].as_str())
    }
}

/// Cell-line features indexed by `CELL_ID`.
#[derive(Clone, Debug, PartialEq)]
pub struct CellLineTable {
    ids: Vec<String>,
    feature_names: Vec<String>,
    features: Array2<f64>,
}

impl CellLineTable {
    /// # Errors
    /// [`DatasetError::LengthMismatch`] if the matrix shape disagrees with the
    /// identifiers or the feature names.
    pub fn new(ids: Vec<String>, feature_names: Vec<String>, features: Array2<f64>) -> Result<Self> {
        let (rows, cols) = features.dim();
        if rows != ids.len() {
            return Err(DatasetError::LengthMismatch {
                expected: ids.len(),
                got: rows,
            });
        }
        if cols != feature_names.len() {
            return Err(DatasetError::LengthMismatch {
                expected: feature_names.len(),
                got: cols,
            });
        }
        Ok(Self {
            ids,
            feature_names,
            features,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Feature row of one cell line.
    pub fn row(&self, cell_id: &str) -> Option<ArrayView1<'_, f64>> {
        self.ids
            .iter()
            .position(|id| id == cell_id)
            .map(|i| self.features.row(i))
    }
}
