//! Truncated SVD of the centred rating matrix.
//!
//! The decomposition itself is nalgebra's; this module converts between the
//! ndarray matrices the model works with and keeps the largest triplets.

use nalgebra::{DMatrix, SVD};
use ndarray::{Array1, Array2};

use super::RecommenderError;

/// Convergence threshold passed to the solver.
const SVD_EPSILON: f64 = f64::EPSILON;
/// Iteration cap before the solver gives up.
const SVD_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Svd {
    /// `m × r`, orthonormal columns
    pub u: Array2<f64>,
    /// `r`, descending, non-negative
    pub sigma: Array1<f64>,
    /// `r × n`, orthonormal rows
    pub vt: Array2<f64>,
}

impl Svd {
    pub fn rank(&self) -> usize {
        self.sigma.len()
    }

    pub fn reconstruct(&self) -> Array2<f64> {
        let scaled = &self.u * &self.sigma;
        scaled.dot(&self.vt)
    }
}

/// Full thin SVD, `r = min(m, n)`.
pub fn thin_svd(matrix: &Array2<f64>) -> Result<Svd, RecommenderError> {
    truncated_svd(matrix, usize::MAX)
}

/// Top-`k` singular triplets, largest first.
pub fn truncated_svd(matrix: &Array2<f64>, k: usize) -> Result<Svd, RecommenderError> {
    let (m, n) = matrix.dim();
    if m == 0 || n == 0 {
        return Err(RecommenderError::Decomposition(format!(
            "cannot decompose a {m}x{n} matrix"
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(RecommenderError::Decomposition(
            "matrix contains non-finite values".to_string(),
        ));
    }

    let dense = DMatrix::from_fn(m, n, |i, j| matrix[[i, j]]);
    let svd = SVD::try_new(dense, true, true, SVD_EPSILON, SVD_MAX_ITERATIONS).ok_or_else(|| {
        RecommenderError::Decomposition(format!(
            "SVD did not converge in {SVD_MAX_ITERATIONS} iterations"
        ))
    })?;
    let u = svd
        .u
        .ok_or_else(|| RecommenderError::Decomposition("SVD failed to compute U".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| RecommenderError::Decomposition("SVD failed to compute V^T".to_string()))?;
    let values = svd.singular_values;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order.truncate(k);

    let r = order.len();
    let sigma = Array1::from_iter(order.iter().map(|&j| values[j]));
    if sigma.iter().any(|x| !x.is_finite()) {
        return Err(RecommenderError::Decomposition(
            "singular values are not finite".to_string(),
        ));
    }

    Ok(Svd {
        u: Array2::from_shape_fn((m, r), |(i, j)| u[(i, order[j])]),
        sigma,
        vt: Array2::from_shape_fn((r, n), |(i, j)| v_t[(order[i], j)]),
    })
}
