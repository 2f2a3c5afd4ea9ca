use faer::{linalg::solvers::DenseSolveCore, Mat, MatRef, Side};
use tracing::trace;

/// A pivot whose square falls below this fraction of its diagonal entry marks the matrix as
/// singular.
pub(crate) const PIVOT_TOLERANCE: f64 = 1e-10;

/// X'X
pub(crate) fn cross_product(x: MatRef<'_, f64>) -> Mat<f64> {
    x.transpose() * x
}

/// X'WX for a diagonal W.
pub(crate) fn weighted_cross_product(x: MatRef<'_, f64>, w: &[f64]) -> Mat<f64> {
    let xw = Mat::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] * w[i]);
    x.transpose() * xw.as_ref()
}

/// Xb
pub(crate) fn mat_vec(x: MatRef<'_, f64>, b: &[f64]) -> Vec<f64> {
    (0..x.nrows())
        .map(|i| (0..x.ncols()).map(|j| x[(i, j)] * b[j]).sum())
        .collect()
}

/// X'v
pub(crate) fn t_mat_vec(x: MatRef<'_, f64>, v: &[f64]) -> Vec<f64> {
    (0..x.ncols())
        .map(|j| (0..x.nrows()).map(|i| x[(i, j)] * v[i]).sum())
        .collect()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}

/// Inverse of a symmetric positive definite matrix through its Cholesky factor, or `None` when
/// the factorization fails or a pivot is numerically zero.
pub(crate) fn spd_inverse(a: MatRef<'_, f64>) -> Option<Mat<f64>> {
    let n = a.nrows();
    for j in 0..n {
        for i in 0..n {
            if !a[(i, j)].is_finite() {
                trace!("Non-finite entry at ({}, {})", i, j);
                return None;
            }
        }
    }
    let llt = a.llt(Side::Lower).ok()?;
    let l = llt.L();
    for j in 0..n {
        let d = a[(j, j)];
        if d <= 0.0 || l[(j, j)].powi(2) <= PIVOT_TOLERANCE * d {
            trace!(pivot = l[(j, j)], diagonal = d, "Singular pivot at column {}", j);
            return None;
        }
    }
    let mut inv = llt.inverse();
    // make self adjoint (symmetric across the diagonal)
    for j in 0..n {
        for i in 0..j {
            inv[(i, j)] = inv[(j, i)];
        }
    }
    Some(inv)
}
