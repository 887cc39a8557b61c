//! Packages, datasets and columns: the read-only facts of a corpus.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque dataset identifier (the resource id in the source catalog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetId(pub String);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        DatasetId(s.to_string())
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        DatasetId(s)
    }
}

/// Column identity: `(dataset id, column name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub dataset: DatasetId,
    pub name: String,
}

impl ColumnKey {
    pub fn new(dataset: impl Into<DatasetId>, name: impl Into<String>) -> Self {
        Self { dataset: dataset.into(), name: name.into() }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.name)
    }
}

/// A named attribute of a dataset. The unit of clustering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub key: ColumnKey,
    /// Name of the package owning the column's dataset.
    pub package: String,
}

impl Column {
    pub fn new(
        package: impl Into<String>,
        dataset: impl Into<DatasetId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            key: ColumnKey::new(dataset, name),
            package: package.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn dataset(&self) -> &DatasetId {
        &self.key.dataset
    }

    /// Display id used in relation tables: `package.column`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.key.name)
    }
}

/// A tabular resource inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub package: String,
    /// Column names in source order.
    pub columns: Vec<String>,
}

/// A named group of datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub datasets: Vec<DatasetId>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), datasets: Vec::new() }
    }
}

/// Raw values of one column in source order, nulls already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSample {
    pub column: Column,
    pub values: Vec<String>,
}

impl ColumnSample {
    pub fn new(column: Column, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}
