//! Column Relation Propagator.
//!
//! Projects domain affinity onto column pairs: columns `c1`, `c2` in distinct
//! domains inherit `affinity[d(c1)][d(c2)]`. Each column keeps only its
//! strongest partners. Unassigned columns and same-domain pairs stay at zero.

use tracing::info;

use crate::model::{AffinityMatrix, Column, ColumnRelation, ColumnRelations, DomainAssignment};
use crate::{Error, Result};

/// Sparse column relation table over `columns` (row/column order = slice
/// order).
///
/// Row `i` holds at most `max_relations` partners, each scoring strictly
/// above `min_score`, strongest first (ties by lower index).
pub fn column_relations(
    affinity: &AffinityMatrix,
    columns: &[Column],
    assignment: &DomainAssignment,
    max_relations: usize,
    min_score: f64,
) -> Result<ColumnRelations> {
    let domains: Vec<Option<usize>> = columns
        .iter()
        .map(|c| assignment.get(&c.key).map(|id| id.0))
        .collect();

    if let Some(&bad) = domains.iter().flatten().find(|&&d| d >= affinity.rows()) {
        return Err(Error::DimensionMismatch { expected: affinity.rows(), got: bad + 1 });
    }

    let mut rows = Vec::with_capacity(columns.len());
    for (i, d1) in domains.iter().enumerate() {
        let Some(d1) = *d1 else {
            rows.push(Vec::new());
            continue;
        };

        let mut partners: Vec<ColumnRelation> = domains
            .iter()
            .enumerate()
            .filter_map(|(j, d2)| match *d2 {
                Some(d2) if j != i && d2 != d1 => Some(ColumnRelation { target: j, score: affinity.get(d1, d2) }),
                _ => None,
            })
            .filter(|r| r.score > min_score)
            .collect();
        partners.sort_by(|a, b| b.score.total_cmp(&a.score));
        partners.truncate(max_relations);
        rows.push(partners);
    }

    let table = ColumnRelations::from_rows(rows);
    info!(columns = columns.len(), relations = table.nonzero_count(), "column relations propagated");
    Ok(table)
}
