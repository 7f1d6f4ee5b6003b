//! Materialization of per-run train/validation/test tables.

use super::partition::partition_elements;
use super::{Partition, RoleAssignment};
use crate::config::SplitConfig;
use crate::error::{DatasetError, Result};
use crate::table::ResponseTable;
use log::{debug, info};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// The units that are assigned to folds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Elements {
    /// Every row is its own element.
    Rows(usize),
    /// Distinct values of the grouping column, in order of first appearance.
    Groups(Vec<String>),
}

impl Elements {
    pub fn len(&self) -> usize {
        match self {
            Elements::Rows(n) => *n,
            Elements::Groups(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable name of an element.
    pub fn label(&self, element: usize) -> Cow<'_, str> {
        match self {
            Elements::Rows(_) => Cow::Owned(element.to_string()),
            Elements::Groups(values) => Cow::Borrowed(values[element].as_str()),
        }
    }
}

/// K-fold splitter producing one train/validation/test partition per run.
///
/// The splitter owns the table it splits. Call [`Splitter::fit`] (or
/// [`Splitter::get_partitions`] followed by [`Splitter::get_folds`]) before
/// asking for a run.
///
/// With a partition column, all rows sharing a value go to the same role in
/// every run, so no group leaks between training and evaluation.
#[derive(Clone, Debug)]
pub struct Splitter {
    data: ResponseTable,
    config: SplitConfig,
    elements: Elements,
    /// Element position of every row.
    row_elements: Vec<usize>,
    excluded: HashSet<usize>,
    folds: Option<Vec<Vec<usize>>>,
    fold_of_element: Vec<usize>,
    roles: Option<RoleAssignment>,
}

impl Splitter {
    /// Resolve elements and exclusions for `data`.
    ///
    /// # Errors
    /// [`DatasetError::InvalidConfig`] if `k < 2`, if `k` exceeds the number of
    /// elements, or if an exclusion is not a row index in row mode.
    pub fn new(data: ResponseTable, config: SplitConfig) -> Result<Self> {
        config.validate()?;

        let (elements, row_elements): (Elements, Vec<usize>) = match config.partition_column {
            None => (Elements::Rows(data.len()), (0..data.len()).collect()),
            Some(column) => {
                let values = data.unique(column);
                let row_elements = {
                    let position: HashMap<&str, usize> = values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (v.as_str(), i))
                        .collect();
                    data.iter().map(|r| position[r.key(column)]).collect()
                };
                (Elements::Groups(values), row_elements)
            }
        };

        if config.k > elements.len() {
            return Err(DatasetError::InvalidConfig(format!(
                "cannot split {} elements into {} folds",
                elements.len(),
                config.k
            )));
        }

        let excluded = resolve_exclusions(&elements, &config.exclude_from_test)?;

        Ok(Self {
            data,
            config,
            elements,
            row_elements,
            excluded,
            folds: None,
            fold_of_element: Vec::new(),
            roles: None,
        })
    }

    /// Build the folds.
    pub fn get_partitions(&mut self, shuffle: bool) -> Result<()> {
        let n = self.elements.len();
        let folds = partition_elements(n, self.config.k, self.config.seed, shuffle)?;

        let mut fold_of_element = vec![0; n];
        for (fold, members) in folds.iter().enumerate() {
            for &el in members {
                fold_of_element[el] = fold;
            }
        }

        self.fold_of_element = fold_of_element;
        self.folds = Some(folds);
        self.roles = None;
        Ok(())
    }

    /// Assign validation and test folds to every run.
    ///
    /// # Panics
    /// Panics if [`Splitter::get_partitions`] has not been called.
    pub fn get_folds(&mut self) -> Result<()> {
        assert!(self.is_partitioned(), "The data was not partitioned yet");
        self.roles = Some(RoleAssignment::assign(self.config.k, self.config.seed)?);
        Ok(())
    }

    /// Build folds and roles with the configured shuffle flag.
    pub fn fit(&mut self) -> Result<()> {
        self.get_partitions(self.config.shuffle)?;
        self.get_folds()?;
        info!(
            "splitter fitted: {} rows, {} elements, k={}, {} excluded from test",
            self.data.len(),
            self.elements.len(),
            self.config.k,
            self.excluded.len()
        );
        Ok(())
    }

    pub fn is_partitioned(&self) -> bool {
        self.folds.is_some()
    }

    pub fn is_fitted(&self) -> bool {
        self.roles.is_some()
    }

    /// Train, validation and test tables of run `run`.
    ///
    /// Rows keep their order from the source table. Rows whose element is
    /// excluded from test are dropped from the test table only.
    ///
    /// # Panics
    /// Panics if the splitter is not fitted or if `run >= k`.
    pub fn split(&self, run: usize) -> Partition {
        let roles = match &self.roles {
            Some(roles) => roles,
            None => panic!("You are trying to get splits before fitting the splitter"),
        };
        assert!(
            run < roles.k(),
            "run {} is out of range for {} folds",
            run,
            roles.k()
        );

        let val_fold = roles.validation_fold(run);
        let test_fold = roles.test_fold(run);

        let mut train = Vec::new();
        let mut validation = Vec::new();
        let mut test = Vec::new();
        for (row, &el) in self.row_elements.iter().enumerate() {
            let fold = self.fold_of_element[el];
            if fold == test_fold {
                if !self.excluded.contains(&el) {
                    test.push(row);
                }
            } else if fold == val_fold {
                validation.push(row);
            } else {
                train.push(row);
            }
        }

        debug!(
            "run {}: validation fold {}, test fold {}, rows {}/{}/{}",
            run,
            val_fold,
            test_fold,
            train.len(),
            validation.len(),
            test.len()
        );

        Partition {
            train: self.data.select(&train),
            validation: self.data.select(&validation),
            test: self.data.select(&test),
        }
    }

    /// Partitions of all runs in order.
    ///
    /// # Panics
    /// Panics if the splitter is not fitted.
    pub fn runs(&self) -> impl Iterator<Item = Partition> + '_ {
        (0..self.config.k).map(move |run| self.split(run))
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// The table being split.
    pub fn data(&self) -> &ResponseTable {
        &self.data
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// Element positions of each fold, if partitioned.
    pub fn folds(&self) -> Option<&[Vec<usize>]> {
        self.folds.as_deref()
    }

    /// Fold holding an element, if partitioned.
    pub fn fold_of_element(&self, element: usize) -> Option<usize> {
        self.folds.as_ref()?;
        self.fold_of_element.get(element).copied()
    }

    pub fn roles(&self) -> Option<&RoleAssignment> {
        self.roles.as_ref()
    }

    /// Whether an element is barred from test tables.
    pub fn is_excluded(&self, element: usize) -> bool {
        self.excluded.contains(&element)
    }
}

fn resolve_exclusions(elements: &Elements, exclude: &[String]) -> Result<HashSet<usize>> {
    let mut excluded = HashSet::new();
    match elements {
        Elements::Rows(n) => {
            for entry in exclude {
                let row: usize = entry.trim().parse().map_err(|_| {
                    DatasetError::InvalidConfig(format!(
                        "exclusion '{}' is not a row index; set a partition column to exclude groups",
                        entry
                    ))
                })?;
                if row < *n {
                    excluded.insert(row);
                } else {
                    debug!("ignoring exclusion of row {} beyond table end", row);
                }
            }
        }
        Elements::Groups(values) => {
            let position: HashMap<&str, usize> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (v.as_str(), i))
                .collect();
            for entry in exclude {
                match position.get(entry.as_str()) {
                    Some(&el) => {
                        excluded.insert(el);
                    }
                    None => debug!("ignoring exclusion of unknown element '{}'", entry),
                }
            }
        }
    }
    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PartitionColumn, ResponseRecord};
    use std::collections::HashMap;

    /// 100 rows; cell line `C{i % 20}`, drug `D{i % 7}`, target `i`.
    fn create_test_table() -> ResponseTable {
        (0..100)
            .map(|i| ResponseRecord::new(format!("C{}", i % 20), format!("D{}", i % 7), i as f64))
            .collect()
    }

    fn row_ids(table: &ResponseTable) -> HashSet<usize> {
        table.iter().map(|r| r.y as usize).collect()
    }

    fn fitted(config: SplitConfig) -> Splitter {
        let mut splitter = Splitter::new(create_test_table(), config).unwrap();
        splitter.fit().unwrap();
        splitter
    }

    #[test]
    fn test_hundred_rows_five_folds() {
        let splitter = fitted(SplitConfig::default().with_k(5));
        assert!(splitter.folds().unwrap().iter().all(|f| f.len() == 20));

        let roles = splitter.roles().unwrap();
        assert_eq!(roles.test_fold(0), 0);
        assert_ne!(roles.validation_fold(0), 0);

        let partition = splitter.split(0);
        assert_eq!(partition.sizes(), (60, 20, 20));
    }

    #[test]
    fn test_roles_disjoint_and_complete_per_run() {
        let splitter = fitted(SplitConfig::default().with_k(5).with_seed(17));
        for partition in splitter.runs() {
            let train = row_ids(&partition.train);
            let val = row_ids(&partition.validation);
            let test = row_ids(&partition.test);
            assert!(train.is_disjoint(&val));
            assert!(train.is_disjoint(&test));
            assert!(val.is_disjoint(&test));
            assert_eq!(train.len() + val.len() + test.len(), 100);
        }
    }

    #[test]
    fn test_every_row_tested_exactly_once() {
        let splitter = fitted(SplitConfig::default().with_k(4));
        let mut counts = vec![0; 100];
        for partition in splitter.runs() {
            for id in row_ids(&partition.test) {
                counts[id] += 1;
            }
        }
        assert!(counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_grouping_keeps_groups_within_one_role() {
        let splitter = fitted(
            SplitConfig::default()
                .with_k(4)
                .with_partition_column(PartitionColumn::CellId),
        );
        assert_eq!(splitter.elements().len(), 20);

        for partition in splitter.runs() {
            let mut role_of: HashMap<String, &str> = HashMap::new();
            for (role, table) in [
                ("train", &partition.train),
                ("validation", &partition.validation),
                ("test", &partition.test),
            ] {
                for r in table {
                    let previous = role_of.insert(r.cell_id.clone(), role);
                    assert!(previous.is_none() || previous == Some(role));
                }
            }
            // every cell line holds 5 rows
            assert_eq!(partition.test.len() % 5, 0);
            assert_eq!(role_of.len(), 20);
            let (train, validation, test) = partition.sizes();
            assert_eq!(train + validation + test, 100);
        }
    }

    #[test]
    fn test_exclusion_only_affects_test() {
        let excluded = ["C3", "C4", "C11"];
        let splitter = fitted(
            SplitConfig::default()
                .with_k(5)
                .with_partition_column(PartitionColumn::CellId)
                .with_exclude_from_test(excluded),
        );

        let mut seen_in_training = HashSet::new();
        for partition in splitter.runs() {
            assert!(partition.test.iter().all(|r| !excluded.contains(&r.cell_id.as_str())));
            for r in partition.train.iter().chain(partition.validation.iter()) {
                seen_in_training.insert(r.cell_id.clone());
            }
        }
        for cell in excluded {
            assert!(seen_in_training.contains(cell));
        }
    }

    #[test]
    fn test_row_mode_exclusion() {
        let splitter = fitted(
            SplitConfig::default()
                .with_k(5)
                .with_exclude_from_test(["0", "1", "2", "999"]),
        );
        for partition in splitter.runs() {
            let test = row_ids(&partition.test);
            assert!(!test.contains(&0) && !test.contains(&1) && !test.contains(&2));
        }
        assert!(splitter.is_excluded(1));
        assert!(!splitter.is_excluded(3));
    }

    #[test]
    fn test_row_mode_rejects_non_numeric_exclusion() {
        let result = Splitter::new(
            create_test_table(),
            SplitConfig::default().with_k(5).with_exclude_from_test(["C1"]),
        );
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let config = SplitConfig::default()
            .with_k(5)
            .with_partition_column(PartitionColumn::DrugId);
        let a = fitted(config.clone());
        let b = fitted(config);
        assert_eq!(a.folds(), b.folds());
        assert_eq!(a.roles(), b.roles());
        assert_eq!(a.split(3), b.split(3));
    }

    #[test]
    fn test_rows_keep_source_order() {
        let splitter = fitted(SplitConfig::default().with_k(5));
        let partition = splitter.split(2);
        let ys: Vec<f64> = partition.train.iter().map(|r| r.y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_too_many_folds_rejected() {
        // 7 distinct drugs
        let result = Splitter::new(
            create_test_table(),
            SplitConfig::default()
                .with_k(8)
                .with_partition_column(PartitionColumn::DrugId),
        );
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_single_fold_rejected() {
        let result = Splitter::new(create_test_table(), SplitConfig::default().with_k(1));
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "before fitting the splitter")]
    fn test_split_before_fit_panics() {
        let splitter = Splitter::new(create_test_table(), SplitConfig::default().with_k(5)).unwrap();
        let _ = splitter.split(0);
    }

    #[test]
    #[should_panic(expected = "before fitting the splitter")]
    fn test_split_after_partitions_only_panics() {
        let mut splitter =
            Splitter::new(create_test_table(), SplitConfig::default().with_k(5)).unwrap();
        splitter.get_partitions(true).unwrap();
        let _ = splitter.split(0);
    }

    #[test]
    #[should_panic(expected = "not partitioned yet")]
    fn test_get_folds_before_partitions_panics() {
        let mut splitter =
            Splitter::new(create_test_table(), SplitConfig::default().with_k(5)).unwrap();
        let _ = splitter.get_folds();
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_run_out_of_range_panics() {
        let splitter = fitted(SplitConfig::default().with_k(5));
        let _ = splitter.split(5);
    }

    #[test]
    fn test_elements_labels() {
        let splitter = fitted(
            SplitConfig::default()
                .with_k(2)
                .with_partition_column(PartitionColumn::DrugId),
        );
        assert_eq!(splitter.elements().label(0), "D0");
        assert_eq!(Elements::Rows(3).label(2), "2");
        assert!(splitter.fold_of_element(0).is_some());
    }
}
