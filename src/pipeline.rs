//! Sources of preprocessed drug-response data.
//!
//! [`PreprocessingPipeline`] is the seam between raw data ingestion and the
//! splitting/caching core. [`CsvPipeline`] reads already-cleaned CSV files.

use crate::error::{DatasetError, Result};
use crate::table::{CellLineTable, DrugTable, ResponseRecord, ResponseTable};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use ndarray::Array2;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Produces the canonical tables of a dataset.
///
/// The `Display` output identifies the pipeline and is part of the drug
/// feature cache signature.
pub trait PreprocessingPipeline: fmt::Display {
    /// The `(CELL_ID, DRUG_ID, Y)` response table.
    fn preprocess(&self) -> Result<ResponseTable>;

    /// Cell-line features indexed by `CELL_ID`.
    fn cell_lines(&self) -> Result<CellLineTable>;

    /// SMILES strings indexed by `DRUG_ID`.
    fn drugs(&self) -> Result<DrugTable>;
}

/// Pipeline over cleaned CSV files.
///
/// - responses: columns `CELL_ID`, `DRUG_ID`, `Y` (others ignored); rows with
///   an empty or non-finite `Y` are dropped.
/// - drugs: columns `DRUG_ID`, `SMILES`; repeated identifiers keep the first row.
/// - cell lines (optional): `CELL_ID` followed by numeric feature columns.
#[derive(Clone, Debug)]
pub struct CsvPipeline {
    name: String,
    responses: PathBuf,
    drugs: PathBuf,
    cell_lines: Option<PathBuf>,
}

impl CsvPipeline {
    pub fn new(
        name: impl Into<String>,
        responses: impl Into<PathBuf>,
        drugs: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            responses: responses.into(),
            drugs: drugs.into(),
            cell_lines: None,
        }
    }

    pub fn with_cell_lines(mut self, path: impl Into<PathBuf>) -> Self {
        self.cell_lines = Some(path.into());
        self
    }
}

impl fmt::Display for CsvPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new().trim(csv::Trim::All).from_reader(BufReader::new(file)))
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
}

fn parse_number(field: &str, path: &Path, line: usize) -> Result<f64> {
    field.parse().map_err(|_| {
        DatasetError::Serialization(format!(
            "{}:{}: '{}' is not a number",
            path.display(),
            line,
            field
        ))
    })
}

impl PreprocessingPipeline for CsvPipeline {
    fn preprocess(&self) -> Result<ResponseTable> {
        let mut rdr = open_csv(&self.responses)?;
        let headers = rdr.headers()?.clone();
        let cell = column_index(&headers, "CELL_ID")?;
        let drug = column_index(&headers, "DRUG_ID")?;
        let target = column_index(&headers, "Y")?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for (i, result) in rdr.records().enumerate() {
            let row = result?;
            let y_field = row.get(target).unwrap_or("");
            if y_field.is_empty() {
                dropped += 1;
                continue;
            }
            let y = parse_number(y_field, &self.responses, i + 2)?;
            if !y.is_finite() {
                dropped += 1;
                continue;
            }
            records.push(ResponseRecord::new(
                row.get(cell).unwrap_or(""),
                row.get(drug).unwrap_or(""),
                y,
            ));
        }

        info!(
            "{}: loaded {} responses ({} without target dropped)",
            self.name,
            records.len(),
            dropped
        );
        Ok(ResponseTable::new(records))
    }

    fn cell_lines(&self) -> Result<CellLineTable> {
        let path = match &self.cell_lines {
            Some(path) => path,
            None => {
                debug!("{}: no cell-line file configured", self.name);
                return CellLineTable::new(Vec::new(), Vec::new(), Array2::zeros((0, 0)));
            }
        };

        let mut rdr = open_csv(path)?;
        let headers = rdr.headers()?.clone();
        let id_col = column_index(&headers, "CELL_ID")?;
        let feature_cols: Vec<usize> = (0..headers.len()).filter(|&c| c != id_col).collect();
        let feature_names = feature_cols.iter().map(|&c| headers[c].to_string()).collect();

        let mut ids = Vec::new();
        let mut values = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = result?;
            ids.push(row.get(id_col).unwrap_or("").to_string());
            for &c in &feature_cols {
                values.push(parse_number(row.get(c).unwrap_or(""), path, i + 2)?);
            }
        }

        let features = Array2::from_shape_vec((ids.len(), feature_cols.len()), values)
            .map_err(|e| DatasetError::Serialization(e.to_string()))?;
        CellLineTable::new(ids, feature_names, features)
    }

    fn drugs(&self) -> Result<DrugTable> {
        let mut rdr = open_csv(&self.drugs)?;
        let headers = rdr.headers()?.clone();
        let id_col = column_index(&headers, "DRUG_ID")?;
        let smiles_col = column_index(&headers, "SMILES")?;

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let id = row.get(id_col).unwrap_or("").to_string();
            if seen.insert(id.clone()) {
                entries.push((id, row.get(smiles_col).unwrap_or("").to_string()));
            }
        }
        Ok(DrugTable::new(entries))
    }
}
