//! ColumnSummary: a diagonal Gaussian over the encoder's latent space.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Lower bound for every variance entry. Keeps the divergence metric free of
/// division by zero and `ln(0)`.
pub const VARIANCE_FLOOR: f64 = 1e-4;

/// Probabilistic description of a column's sampled values: per-dimension mean
/// and variance of their latent vectors.
///
/// Invariant: `variance.len() == mean.len()` and every variance entry is
/// `>= VARIANCE_FLOOR` (never NaN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    mean: Vec<f64>,
    variance: Vec<f64>,
}

impl ColumnSummary {
    /// Build a summary, replacing NaN variances with the floor and clamping
    /// the rest to it.
    pub fn new(mean: Vec<f64>, variance: Vec<f64>) -> Result<Self> {
        if mean.len() != variance.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                got: variance.len(),
            });
        }
        let variance = variance.into_iter().map(floor_variance).collect();
        Ok(Self { mean, variance })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn variance(&self) -> &[f64] {
        &self.variance
    }
}

#[inline]
fn floor_variance(v: f64) -> f64 {
    if v.is_nan() { VARIANCE_FLOOR } else { v.max(VARIANCE_FLOOR) }
}
