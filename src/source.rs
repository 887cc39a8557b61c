//! # Value Source Trait
//!
//! The contract between the pipeline and whatever locates and parses dataset
//! files. The pipeline only needs:
//!
//! - the complete, ordered list of dataset ids (incidence matrix rows),
//! - one `ColumnSample` per column (raw values + owning dataset),
//! - the package structure (for snapshots).
//!
//! Unreadable sources are fatal: implementations return `Error::Io` or
//! `Error::Source` and the run aborts without retry.
//!
//! `MemorySource` is the reference implementation, used for tests and for
//! embedding tether behind a loader that already holds the data.

use hashbrown::HashMap;
use crate::model::{Column, ColumnSample, Dataset, DatasetId, Package};
use crate::{Error, Result};

/// Read-only access to a corpus of packages, datasets and column values.
pub trait ValueSource {
    /// Packages in a stable order.
    fn packages(&self) -> Result<Vec<Package>>;

    /// Every dataset id in the corpus, in a stable order. Must cover the
    /// dataset of every sampled column.
    fn dataset_ids(&self) -> Result<Vec<DatasetId>>;

    /// Datasets in the same order as `dataset_ids`.
    fn datasets(&self) -> Result<Vec<Dataset>>;

    /// One sample per column, nulls dropped. Columns with no non-null values
    /// are omitted.
    fn column_samples(&self) -> Result<Vec<ColumnSample>>;
}

// ============================================================================
// MemorySource
// ============================================================================

/// In-memory corpus.
///
/// Empty strings are treated as nulls, matching how blank CSV cells load.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    packages: Vec<Package>,
    datasets: Vec<Dataset>,
    /// dataset id → (column name, non-null values) in column order
    values: HashMap<DatasetId, Vec<(String, Vec<String>)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset to a package, creating the package on first use.
    ///
    /// Re-adding an existing dataset id replaces its columns.
    pub fn add_dataset<P, D, N, V>(&mut self, package: P, dataset: D, columns: Vec<(N, Vec<V>)>)
    where
        P: Into<String>,
        D: Into<DatasetId>,
        N: Into<String>,
        V: Into<String>,
    {
        let package = package.into();
        let id = dataset.into();

        let mut names = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        for (name, vals) in columns {
            let name = name.into();
            let vals: Vec<String> = vals
                .into_iter()
                .map(Into::into)
                .filter(|v: &String| !v.is_empty())
                .collect();
            names.push(name.clone());
            cols.push((name, vals));
        }

        match self.datasets.iter_mut().find(|d| d.id == id) {
            Some(existing) => {
                existing.columns = names;
            }
            None => {
                self.datasets.push(Dataset { id: id.clone(), package: package.clone(), columns: names });
                match self.packages.iter_mut().find(|p| p.name == package) {
                    Some(p) => p.datasets.push(id.clone()),
                    None => {
                        let mut p = Package::new(package);
                        p.datasets.push(id.clone());
                        self.packages.push(p);
                    }
                }
            }
        }
        self.values.insert(id, cols);
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// Raw non-null values of one column.
    pub fn values(&self, dataset: &DatasetId, column: &str) -> Result<&[String]> {
        let cols = self
            .values
            .get(dataset)
            .ok_or_else(|| Error::Source(format!("dataset {} not loaded", dataset)))?;
        cols.iter()
            .find(|(name, _)| name == column)
            .map(|(_, vals)| vals.as_slice())
            .ok_or_else(|| Error::Source(format!("column {} not found in dataset {}", column, dataset)))
    }
}

impl ValueSource for MemorySource {
    fn packages(&self) -> Result<Vec<Package>> {
        Ok(self.packages.clone())
    }

    fn dataset_ids(&self) -> Result<Vec<DatasetId>> {
        Ok(self.datasets.iter().map(|d| d.id.clone()).collect())
    }

    fn datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self.datasets.clone())
    }

    fn column_samples(&self) -> Result<Vec<ColumnSample>> {
        let mut samples = Vec::new();
        for dataset in &self.datasets {
            let cols = self
                .values
                .get(&dataset.id)
                .ok_or_else(|| Error::Source(format!("dataset {} has no loaded values", dataset.id)))?;
            for (name, vals) in cols {
                if vals.is_empty() {
                    continue;
                }
                samples.push(ColumnSample {
                    column: Column::new(dataset.package.clone(), dataset.id.clone(), name.clone()),
                    values: vals.clone(),
                });
            }
        }
        Ok(samples)
    }
}
