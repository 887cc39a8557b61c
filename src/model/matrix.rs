//! Dense row-major `f64` matrix used for distances, incidence counts and
//! affinities.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Dense row-major matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Pairwise divergence between column summaries. Square, symmetric, zero
/// diagonal, non-negative.
pub type DistanceMatrix = Matrix;

/// PPMI affinity between domains, indexed by `DomainId`. Square, symmetric,
/// non-negative.
pub type AffinityMatrix = Matrix;

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    /// Build from nested rows. Ragged input is rejected.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(Error::DimensionMismatch { expected: n_cols, got: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { rows: n_rows, cols: n_cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] += value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Row sums.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.row(i).iter().sum()).collect()
    }

    /// `selfᵀ · self`, a `cols × cols` Gram matrix. Every cell sums its
    /// products in the same row order, so the result is exactly symmetric.
    pub fn gram(&self) -> Matrix {
        let mut out = Matrix::square(self.cols);
        for k in 0..self.cols {
            for j in k..self.cols {
                let mut acc = 0.0;
                for i in 0..self.rows {
                    acc += self.get(i, k) * self.get(i, j);
                }
                out.set(k, j, acc);
                out.set(j, k, acc);
            }
        }
        out
    }

    /// Whether `|m[i][j] - m[j][i]| <= tol` for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.rows).all(|i| (i + 1..self.cols).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol))
    }
}
