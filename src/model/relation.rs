//! Relation outputs: directed domain edges and the sparse column table.

use serde::{Deserialize, Serialize};
use super::DomainId;

/// A directed, weighted domain → domain edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: DomainId,
    pub target: DomainId,
    pub weight: f64,
}

/// One nonzero cell of the column relation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRelation {
    /// Index of the partner column in the pipeline's column list.
    pub target: usize,
    pub score: f64,
}

/// Sparse column × column relation table. Row `i` lists the retained
/// partners of column `i`, strongest first; every other cell is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRelations {
    rows: Vec<Vec<ColumnRelation>>,
}

impl ColumnRelations {
    pub fn from_rows(rows: Vec<Vec<ColumnRelation>>) -> Self {
        Self { rows }
    }

    /// Number of columns (rows) in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> &[ColumnRelation] {
        &self.rows[i]
    }

    /// Score of `(i, j)`, zero when not retained.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows
            .get(i)
            .and_then(|row| row.iter().find(|r| r.target == j))
            .map_or(0.0, |r| r.score)
    }

    pub fn nonzero_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// All retained cells as `(source, target, score)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |r| (i, r.target, r.score)))
    }
}
