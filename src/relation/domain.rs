//! Domain Relation Engine.
//!
//! ```text
//! M  (datasets × domains)   M[i][k] = #columns of domain k in dataset i
//! C  = Mᵀ·M                 co-occurrence, C[k][k] = size of domain k
//! E  = r·rᵀ / ΣC            expected counts, r = row sums of C
//! PPMI = max(ln((C + ε) / (E + ε)), 0)
//! ```
//!
//! The affinity matrix is symmetric; the edge list is a per-row top-k and is
//! therefore not.

use hashbrown::HashMap;
use tracing::{debug, info};

use crate::model::{AffinityMatrix, DatasetId, Domain, DomainId, Matrix, RelationEdge};
use crate::{Error, Result};

/// Additive smoothing inside the PMI log ratio.
pub const PMI_SMOOTHING: f64 = 1e-8;

/// Dataset × domain membership counts.
///
/// Fails fast with `Error::UnknownDataset` when a member's dataset is not in
/// `dataset_ids`; skipping it would silently shift the matrix.
pub fn incidence_matrix(domains: &[Domain], dataset_ids: &[DatasetId]) -> Result<Matrix> {
    let mut row_of: HashMap<&DatasetId, usize> = HashMap::with_capacity(dataset_ids.len());
    for (i, id) in dataset_ids.iter().enumerate() {
        row_of.entry(id).or_insert(i);
    }

    let mut m = Matrix::zeros(dataset_ids.len(), domains.len());
    for (k, domain) in domains.iter().enumerate() {
        for column in &domain.columns {
            let i = *row_of
                .get(column.dataset())
                .ok_or_else(|| Error::UnknownDataset(column.dataset().to_string()))?;
            m.add(i, k, 1.0);
        }
    }
    Ok(m)
}

/// Domain × domain co-occurrence `Mᵀ·M`.
pub fn co_occurrence(incidence: &Matrix) -> Matrix {
    incidence.gram()
}

/// Positive pointwise mutual information of an incidence matrix's
/// co-occurrence. An all-zero co-occurrence yields an all-zero matrix.
pub fn ppmi(incidence: &Matrix) -> AffinityMatrix {
    let co = co_occurrence(incidence);
    let n = co.rows();
    let total = co.sum();
    let mut out = AffinityMatrix::square(n);
    if total <= 0.0 {
        return out;
    }

    let rowsum = co.row_sums();
    for k in 0..n {
        for j in 0..n {
            let expected = rowsum[k] * rowsum[j] / total;
            let pmi = ((co.get(k, j) + PMI_SMOOTHING) / (expected + PMI_SMOOTHING)).ln();
            out.set(k, j, pmi.max(0.0));
        }
    }
    out
}

/// Symmetric, non-negative domain affinity (PPMI), indexed by `DomainId`.
pub fn domain_affinity(domains: &[Domain], dataset_ids: &[DatasetId]) -> Result<AffinityMatrix> {
    let incidence = incidence_matrix(domains, dataset_ids)?;
    let affinity = ppmi(&incidence);
    debug!(datasets = incidence.rows(), domains = incidence.cols(), "domain affinity computed");
    Ok(affinity)
}

/// Directed top-k edges.
///
/// For each domain `k`: rank the other domains by `affinity[k][j]`
/// (descending, ties by lower index), keep the first `nlargest`, drop weights
/// below `min_weight`. Domain `k` may list `j` while `j` does not list `k`.
pub fn top_edges(affinity: &AffinityMatrix, nlargest: usize, min_weight: f64) -> Vec<RelationEdge> {
    let n = affinity.rows();
    let mut edges = Vec::new();

    for k in 0..n {
        let mut ranked: Vec<(usize, f64)> = affinity
            .row(k)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != k)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        edges.extend(
            ranked
                .into_iter()
                .take(nlargest)
                .filter(|&(_, w)| w >= min_weight)
                .map(|(j, w)| RelationEdge { source: DomainId(k), target: DomainId(j), weight: w }),
        );
    }

    info!(domains = n, edges = edges.len(), nlargest, min_weight, "domain edges extracted");
    edges
}
