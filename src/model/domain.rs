//! Domains and the column → domain assignment.

use std::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use super::{Column, ColumnKey};

/// Label the clustering primitive uses for points outside every cluster.
pub const NOISE_LABEL: i64 = -1;

/// 0-based position of a domain in the clusterer's result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub usize);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cluster of columns judged semantically equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    /// Opaque label from the clustering primitive. Never `NOISE_LABEL`.
    pub label: i64,
    pub columns: Vec<Column>,
    /// Dominant uppercased member name, when it is common enough.
    pub name: Option<String>,
}

impl Domain {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, key: &ColumnKey) -> bool {
        self.columns.iter().any(|c| &c.key == key)
    }
}

/// Explicit column → domain mapping produced by clustering.
///
/// A column missing from the map is unassigned. `DomainId(0)` is a real
/// assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainAssignment {
    by_column: HashMap<ColumnKey, DomainId>,
}

impl DomainAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a column's domain. Returns the previous id if the column was
    /// already assigned.
    pub fn assign(&mut self, key: ColumnKey, id: DomainId) -> Option<DomainId> {
        self.by_column.insert(key, id)
    }

    pub fn get(&self, key: &ColumnKey) -> Option<DomainId> {
        self.by_column.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, DomainId)> {
        self.by_column.iter().map(|(k, v)| (k, *v))
    }
}
