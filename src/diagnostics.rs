// src/diagnostics.rs
//
// Numerical quality metrics for a fitted basis. All functions return `None`
// on empty or dimensionally inconsistent inputs instead of panicking.

use ndarray::{Array1, Array2, ArrayView2};

/// Computes the Frobenius norm of a matrix.
pub fn frobenius_norm(matrix: &ArrayView2<f64>) -> f64 {
    matrix.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Computes orthogonality error ||I - Q^T Q||_F of a basis with columns as vectors.
pub fn orthogonality_error(basis: &ArrayView2<f64>) -> Option<f64> {
    if basis.nrows() == 0 || basis.ncols() == 0 {
        return None;
    }
    let qtq = basis.t().dot(basis);
    let diff = Array2::<f64>::eye(qtq.nrows()) - qtq;
    Some(frobenius_norm(&diff.view()))
}

/// Mean squared error between centered data and its rank-k reconstruction
/// `(Xc · B) · Bᵀ`.
pub fn reconstruction_mse(centered: &ArrayView2<f64>, basis: &ArrayView2<f64>) -> Option<f64> {
    if centered.is_empty() || basis.is_empty() {
        return None;
    }
    if centered.ncols() != basis.nrows() {
        return None;
    }
    let reconstructed = centered.dot(basis).dot(&basis.t());
    let diff = centered - &reconstructed;
    Some(diff.iter().map(|&x| x * x).sum::<f64>() / diff.len() as f64)
}

/// Rayleigh quotients `vᵀ S v` for each unit column `v` of `basis`.
///
/// For eigenvectors of `S` these are the eigenvalues, so the result can be used
/// to check the ordering of a fitted basis against its scatter matrix.
pub fn rayleigh_quotients(scatter: &ArrayView2<f64>, basis: &ArrayView2<f64>) -> Option<Array1<f64>> {
    if scatter.nrows() != scatter.ncols() || scatter.nrows() != basis.nrows() || basis.is_empty() {
        return None;
    }
    let sb = scatter.dot(basis);
    Some(Array1::from_shape_fn(basis.ncols(), |j| basis.column(j).dot(&sb.column(j))))
}
