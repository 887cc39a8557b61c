//! # Domain Clusterer
//!
//! ```text
//! (ColumnSummary, Column)*  ──divergence──►  DistanceMatrix
//!                           ──DensityClusterer──►  labels (-1 = noise)
//!                           ──group by label──►  Vec<Domain> + DomainAssignment
//! ```
//!
//! The density primitive is a pluggable capability. `Hdbscan` is the
//! reference implementation; any algorithm honouring the `DensityClusterer`
//! contract can replace it without touching the other stages.

pub mod hdbscan;

pub use hdbscan::Hdbscan;

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use crate::divergence::distance_matrix;
use crate::model::{Column, ColumnSummary, DistanceMatrix, Domain, DomainAssignment, DomainId, NOISE_LABEL};
use crate::{Error, Result};

/// A name must appear strictly more than this many times to label a domain.
pub const NAME_MIN_COUNT: usize = 2;

/// Density-based clustering over a precomputed distance matrix.
///
/// Contract: one label per row; `NOISE_LABEL` for rows outside every
/// cluster; every other label is shared by at least `min_cluster_size` rows.
pub trait DensityClusterer: Send + Sync {
    fn cluster(&self, distances: &DistanceMatrix, min_cluster_size: usize) -> Result<Vec<i64>>;
}

impl<C: DensityClusterer + ?Sized> DensityClusterer for &C {
    fn cluster(&self, distances: &DistanceMatrix, min_cluster_size: usize) -> Result<Vec<i64>> {
        (**self).cluster(distances, min_cluster_size)
    }
}

impl<C: DensityClusterer + ?Sized> DensityClusterer for Box<C> {
    fn cluster(&self, distances: &DistanceMatrix, min_cluster_size: usize) -> Result<Vec<i64>> {
        (**self).cluster(distances, min_cluster_size)
    }
}

/// Result of the clustering stage.
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    pub domains: Vec<Domain>,
    pub assignment: DomainAssignment,
    /// Columns labelled as noise.
    pub noise: usize,
}

/// Group represented columns into domains.
///
/// Domains are numbered in order of first appearance of their label while
/// scanning rows. Noise columns stay unassigned.
pub fn cluster_columns<C>(
    clusterer: &C,
    represented: &[(ColumnSummary, Column)],
    min_cluster_size: usize,
) -> Result<Clustering>
where
    C: DensityClusterer + ?Sized,
{
    if represented.is_empty() {
        return Ok(Clustering::default());
    }

    let summaries: Vec<&ColumnSummary> = represented.iter().map(|(g, _)| g).collect();
    let distances = distance_matrix(&summaries)?;
    let labels = clusterer.cluster(&distances, min_cluster_size)?;

    if labels.len() != represented.len() {
        return Err(Error::Clustering(format!(
            "clusterer returned {} labels for {} rows",
            labels.len(),
            represented.len()
        )));
    }

    let mut domains: Vec<Domain> = Vec::new();
    let mut by_label: HashMap<i64, usize> = HashMap::new();
    let mut noise = 0;

    for ((_, column), &label) in represented.iter().zip(&labels) {
        if label == NOISE_LABEL {
            noise += 1;
            continue;
        }
        let idx = *by_label.entry(label).or_insert_with(|| {
            domains.push(Domain { id: DomainId(domains.len()), label, columns: Vec::new(), name: None });
            domains.len() - 1
        });
        domains[idx].columns.push(column.clone());
    }

    let mut assignment = DomainAssignment::new();
    for domain in &mut domains {
        if domain.len() < min_cluster_size {
            return Err(Error::Clustering(format!(
                "label {} has {} members, below min_cluster_size {}",
                domain.label,
                domain.len(),
                min_cluster_size
            )));
        }
        domain.name = domain_name(&domain.columns);
        for column in &domain.columns {
            if assignment.assign(column.key.clone(), domain.id).is_some() {
                return Err(Error::Clustering(format!("column {} appears in two domains", column.key)));
            }
        }
        debug!(domain = %domain.id, size = domain.len(), name = ?domain.name, "domain formed");
    }

    if domains.is_empty() {
        warn!(columns = represented.len(), "every column labelled as noise");
    }
    info!(domains = domains.len(), noise, "columns clustered");
    Ok(Clustering { domains, assignment, noise })
}

/// Most frequent uppercased member name, if it occurs more than
/// `NAME_MIN_COUNT` times. Ties go to the name seen first.
pub fn domain_name(columns: &[Column]) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for column in columns {
        let upper = column.name().to_uppercase();
        match counts.iter_mut().find(|(name, _)| *name == upper) {
            Some((_, n)) => *n += 1,
            None => counts.push((upper, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (name, n) in counts {
        if best.as_ref().is_none_or(|(_, b)| n > *b) {
            best = Some((name, n));
        }
    }
    best.filter(|(_, n)| *n > NAME_MIN_COUNT).map(|(name, _)| name)
}
