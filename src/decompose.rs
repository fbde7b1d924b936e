// src/decompose.rs
//
// The four pure steps of the PCA pipeline: centering, scatter matrix,
// eigendecomposition with top-k selection, and projection.

use float_cmp::approx_eq;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::PcaError;
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};

/// Relative threshold below which an eigenvalue is treated as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Eigenpairs kept by [`top_eigenvectors`], sorted by descending eigenvalue.
#[derive(Debug, Clone)]
pub struct SelectedEigenpairs {
    /// Shape: (k)
    pub eigenvalues: Array1<f64>,
    /// Unit-norm eigenvectors as columns. Shape: (n_features, k)
    pub vectors: Array2<f64>,
}

fn ensure_non_empty(x: &ArrayView2<f64>) -> Result<(), PcaError> {
    let (n_samples, n_features) = x.dim();
    if n_samples == 0 || n_features == 0 {
        return Err(PcaError::EmptyInput { n_samples, n_features });
    }
    Ok(())
}

/// Subtracts each column's mean, returning a new matrix of the same shape.
///
/// # Errors
/// `PcaError::EmptyInput` if `x` has zero rows or zero columns.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use eigen_pca::decompose::center;
///
/// let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
/// let centered = center(x.view()).unwrap();
/// assert_eq!(centered, array![[-2.0, -2.0], [0.0, 0.0], [2.0, 2.0]]);
/// ```
pub fn center(x: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
    ensure_non_empty(&x)?;
    let (n_samples, n_features) = x.dim();
    let mean_vector = x
        .mean_axis(Axis(0))
        .ok_or(PcaError::EmptyInput { n_samples, n_features })?;
    Ok(&x - &mean_vector)
}

/// Computes the unnormalized scatter matrix `Xcᵀ · Xc` of an already centered matrix.
///
/// No `1/(m-1)` factor is applied; eigenvectors and their order are unaffected
/// by that scaling. The result is mirrored from its upper triangle so it is
/// exactly symmetric.
///
/// # Errors
/// - `PcaError::EmptyInput` on an empty matrix.
/// - `PcaError::NonSymmetricOrDegenerateInput` if the product contains NaN or infinity.
pub fn scatter_matrix(centered: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
    ensure_non_empty(&centered)?;
    let mut scatter = centered.t().dot(&centered);

    if scatter.iter().any(|v| !v.is_finite()) {
        return Err(PcaError::NonSymmetricOrDegenerateInput(
            "scatter matrix contains non-finite values".to_string(),
        ));
    }

    let n = scatter.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let upper = scatter[[i, j]];
            scatter[[j, i]] = upper;
        }
    }
    Ok(scatter)
}

/// Selects the `n_components` eigenvectors of a symmetric matrix with the largest
/// eigenvalues, using the backend chosen by Cargo features.
///
/// See [`top_eigenvectors_with`] for the selection rules.
pub fn top_eigenvectors(
    scatter: &Array2<f64>,
    n_components: usize,
) -> Result<SelectedEigenpairs, PcaError> {
    top_eigenvectors_with(&LinAlgBackendProvider::<f64>::new(), scatter, n_components)
}

/// Selects the `n_components` eigenvectors of a symmetric matrix with the largest
/// eigenvalues.
///
/// Every eigenvalue stays paired with its own eigenvector column while sorting.
/// The sort is stable and descending. Within a tied eigenspace the vectors are
/// only defined up to sign and rotation, and no canonical choice is made.
///
/// # Errors
/// - `PcaError::NonSymmetricOrDegenerateInput` if `scatter` is not square.
/// - `PcaError::InvalidComponentCount` unless `1 <= n_components <= n`.
/// - `PcaError::LinalgError` if the backend fails, returns a non-finite eigenvalue
///   or a zero vector.
pub fn top_eigenvectors_with<B: BackendEigh<f64>>(
    backend: &B,
    scatter: &Array2<f64>,
    n_components: usize,
) -> Result<SelectedEigenpairs, PcaError> {
    let (rows, cols) = scatter.dim();
    if rows != cols {
        return Err(PcaError::NonSymmetricOrDegenerateInput(format!(
            "expected a square matrix, got {}x{}",
            rows, cols
        )));
    }
    if n_components == 0 || n_components > rows {
        return Err(PcaError::InvalidComponentCount {
            requested: n_components,
            n_features: rows,
        });
    }

    let eig = backend.eigh_upper(scatter).map_err(PcaError::from_backend)?;
    if eig.eigenvalues.len() != rows || eig.eigenvectors.dim() != (rows, rows) {
        return Err(PcaError::LinalgError(format!(
            "backend returned {} eigenvalues and a {:?} eigenvector matrix for a {}x{} input",
            eig.eigenvalues.len(),
            eig.eigenvectors.dim(),
            rows,
            cols
        )));
    }
    if let Some(bad) = eig.eigenvalues.iter().find(|v| !v.is_finite()) {
        return Err(PcaError::LinalgError(format!(
            "backend returned a non-finite eigenvalue ({})",
            bad
        )));
    }

    let mut eig_pairs: Vec<(f64, ArrayView1<f64>)> = eig
        .eigenvalues
        .iter()
        .copied()
        .zip(eig.eigenvectors.columns())
        .collect();
    eig_pairs.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    debug!(
        "Scatter spectrum (descending): {:?}",
        eig_pairs.iter().map(|(v, _)| *v).collect::<Vec<_>>()
    );

    let largest = eig_pairs[0].0.abs().max(1.0);
    log_ties(&eig_pairs, n_components, largest);

    let mut vectors = Array2::<f64>::zeros((rows, n_components));
    let mut eigenvalues = Array1::<f64>::zeros(n_components);
    for (i, (eig_val, eig_vec)) in eig_pairs.iter().take(n_components).enumerate() {
        let norm = eig_vec.dot(eig_vec).sqrt();
        if norm.is_nan() || norm <= 1e-12 {
            return Err(PcaError::LinalgError(format!(
                "eigenvector {} has near-zero norm ({})",
                i, norm
            )));
        }
        if *eig_val <= RANK_TOLERANCE * largest {
            warn!(
                "Component {} has eigenvalue {:e}; the scatter matrix is rank-deficient and this direction carries no variance.",
                i, eig_val
            );
        }
        vectors.column_mut(i).assign(&eig_vec.mapv(|x| x / norm));
        eigenvalues[i] = *eig_val;
    }

    Ok(SelectedEigenpairs { eigenvalues, vectors })
}

// Ties inside the selection only rotate the basis; a tie across the cut
// also makes the selected subspace itself ambiguous.
fn log_ties(eig_pairs: &[(f64, ArrayView1<f64>)], n_components: usize, scale: f64) {
    let epsilon = 1e-10 * scale;
    let upper = n_components.min(eig_pairs.len() - 1);
    for i in 0..upper {
        let (a, b) = (eig_pairs[i].0, eig_pairs[i + 1].0);
        if approx_eq!(f64, a, b, epsilon = epsilon, ulps = 4) {
            if i + 1 == n_components {
                debug!(
                    "Eigenvalue {:e} is tied across the component cut ({} / {}); the retained subspace is not unique.",
                    a, i, i + 1
                );
            } else {
                debug!(
                    "Eigenvalues of components {} and {} are tied ({:e}); their vectors are defined up to rotation.",
                    i, i + 1, a
                );
            }
        }
    }
}

/// Projects `x` onto `basis`: returns `x · basis`, shape (n_samples, k).
///
/// `x` is used as given; it is not centered first.
///
/// # Errors
/// `PcaError::ShapeMismatch` if `x.ncols() != basis.nrows()`.
pub fn project(x: ArrayView2<f64>, basis: ArrayView2<f64>) -> Result<Array2<f64>, PcaError> {
    if x.ncols() != basis.nrows() {
        return Err(PcaError::ShapeMismatch {
            expected: basis.nrows(),
            found: x.ncols(),
        });
    }
    Ok(x.dot(&basis))
}
