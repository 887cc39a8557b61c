//! # Divergence Metric
//!
//! Bhattacharyya distance between two diagonal Gaussians:
//!
//! ```text
//! savg  = (s1 + s2) / 2
//! term1 = 1/8 · Σ (mu1 − mu2)² / savg            mean separation vs pooled spread
//! term2 = 1/2 · Σ [ ln savg − ½ (ln s1 + ln s2) ] variance mismatch
//! d     = term1 + term2
//! ```
//!
//! Both terms vanish when the summaries are equal. Every term is built from
//! commutative operations on `(s1, s2)` and `(mu1 − mu2)²`, so
//! `divergence(a, b)` and `divergence(b, a)` are bit-identical.

use rayon::prelude::*;
use tracing::debug;

use crate::model::{ColumnSummary, DistanceMatrix};
use crate::{Error, Result};

/// Symmetric, non-negative dissimilarity between two column summaries.
pub fn divergence(a: &ColumnSummary, b: &ColumnSummary) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(Error::DimensionMismatch { expected: a.dim(), got: b.dim() });
    }

    let mut term1 = 0.0;
    let mut term2 = 0.0;
    let dims = a.mean().iter().zip(a.variance()).zip(b.mean().iter().zip(b.variance()));
    for ((mu1, s1), (mu2, s2)) in dims {
        let savg = (s1 + s2) / 2.0;
        let diff = mu1 - mu2;
        term1 += diff * diff / savg;
        term2 += savg.ln() - 0.5 * (s1.ln() + s2.ln());
    }

    // ln savg ≥ mean(ln s) per dimension; clamp rounding below zero
    Ok((0.125 * term1 + 0.5 * term2).max(0.0))
}

/// Full pairwise matrix. Rows of the upper triangle are computed in
/// parallel and mirrored into the lower triangle.
pub fn distance_matrix(summaries: &[&ColumnSummary]) -> Result<DistanceMatrix> {
    let n = summaries.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i + 1..n)
                .map(|j| divergence(summaries[i], summaries[j]))
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<_>>()?;

    let mut m = DistanceMatrix::square(n);
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, d) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            m.set(i, j, d);
            m.set(j, i, d);
        }
    }
    debug!(n, "distance matrix built");
    Ok(m)
}
