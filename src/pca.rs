// Principal component analysis (PCA) estimator

use log::{debug, info};
use ndarray::{Array2, ArrayView2, AsArray, Ix2};
use std::time::Instant;

use crate::decompose::{center, project, scatter_matrix, top_eigenvectors};
use crate::error::PcaError;

/// Principal component analysis (PCA) structure.
///
/// Holds the number of retained components and the projection basis, both
/// `None` until a successful [`PCA::fit`]. The basis has one unit-norm column per
/// component, ordered by descending eigenvalue of the training scatter matrix.
///
/// The column means of the training data are not stored, so [`PCA::transform`]
/// projects its input as given, without centering it.
#[derive(Debug, Clone)]
pub struct PCA {
    /// Number of retained components.
    n_components: Option<usize>,
    /// The projection basis (principal axes).
    /// Shape: (n_features, n_components)
    basis: Option<Array2<f64>>,
}

impl Default for PCA {
    fn default() -> Self {
        Self::new()
    }
}

impl PCA {
    /// Creates a new, unfitted PCA struct.
    ///
    /// # Examples
    ///
    /// ```
    /// use eigen_pca::PCA;
    /// let pca = PCA::new();
    /// assert!(!pca.is_fitted());
    /// ```
    pub fn new() -> Self {
        Self {
            n_components: None,
            basis: None,
        }
    }

    /// Returns the number of retained components, if fitted.
    pub fn n_components(&self) -> Option<usize> {
        self.n_components
    }

    /// Returns a reference to the basis matrix, shape (n_features, n_components), if fitted.
    pub fn basis(&self) -> Option<&Array2<f64>> {
        self.basis.as_ref()
    }

    /// Returns the number of features seen at fit time, if fitted.
    pub fn n_features(&self) -> Option<usize> {
        self.basis.as_ref().map(|b| b.nrows())
    }

    /// Returns `true` once a fit has succeeded.
    ///
    /// ```
    /// use ndarray::array;
    /// use eigen_pca::PCA;
    ///
    /// let mut pca = PCA::new();
    /// pca.fit(&array![[1.0, 0.0], [0.0, 1.0]], 1).unwrap();
    /// assert!(pca.is_fitted());
    /// ```
    pub fn is_fitted(&self) -> bool {
        self.basis.is_some()
    }

    /// Drops any fitted state.
    pub fn reset(&mut self) {
        self.n_components = None;
        self.basis = None;
    }

    /// Fits the basis to `data_matrix` (shape (n_samples, n_features)).
    ///
    /// The data is centered column-wise, its scatter matrix `Xcᵀ · Xc` is
    /// eigendecomposed, and the `n_components` eigenvectors with the largest
    /// eigenvalues become the basis. The input is not modified. A second call
    /// replaces the previous fit; a failed call leaves it untouched.
    ///
    /// # Errors
    /// - `PcaError::EmptyInput` if the matrix has zero samples or zero features.
    /// - `PcaError::InvalidComponentCount` unless `1 <= n_components <= n_features`.
    /// - `PcaError::NonSymmetricOrDegenerateInput` if the data holds non-finite values.
    /// - `PcaError::LinalgError` if the eigendecomposition fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::array;
    /// use eigen_pca::PCA;
    ///
    /// let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    /// let mut pca = PCA::new();
    /// pca.fit(&data, 1).unwrap();
    /// assert_eq!(pca.basis().unwrap().dim(), (2, 1));
    /// ```
    pub fn fit<'a, V>(&mut self, data_matrix: V, n_components: usize) -> Result<(), PcaError>
    where
        V: AsArray<'a, f64, Ix2>,
    {
        let data_matrix: ArrayView2<'a, f64> = data_matrix.into();
        let (n_samples, n_features) = data_matrix.dim();

        if n_samples == 0 || n_features == 0 {
            return Err(PcaError::EmptyInput { n_samples, n_features });
        }
        if n_components == 0 || n_components > n_features {
            return Err(PcaError::InvalidComponentCount {
                requested: n_components,
                n_features,
            });
        }

        info!(
            "Fitting PCA: {} samples x {} features, {} components.",
            n_samples, n_features, n_components
        );
        let start_time = Instant::now();

        let centered = center(data_matrix)?;
        let scatter = scatter_matrix(centered.view())?;
        debug!("Computed scatter matrix. Shape: {:?}", scatter.dim());

        let selected = top_eigenvectors(&scatter, n_components)?;
        debug!("Selected eigenvalues: {:?}", selected.eigenvalues);

        self.n_components = Some(n_components);
        self.basis = Some(selected.vectors);

        info!("Fitted PCA in {:?}", start_time.elapsed());
        Ok(())
    }

    /// Projects `x` onto the fitted basis, returning shape (n_samples, n_components).
    ///
    /// `x` is multiplied by the basis as given; the training means are not subtracted.
    ///
    /// # Errors
    /// - `PcaError::Unfitted` if no fit has succeeded yet.
    /// - `PcaError::ShapeMismatch` if `x` does not have `n_features` columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::array;
    /// use eigen_pca::PCA;
    ///
    /// let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    /// let mut pca = PCA::new();
    /// pca.fit(&x, 1).unwrap();
    /// let scores = pca.transform(&x).unwrap();
    /// assert_eq!(scores.dim(), (3, 1));
    /// ```
    pub fn transform<'a, V>(&self, x: V) -> Result<Array2<f64>, PcaError>
    where
        V: AsArray<'a, f64, Ix2>,
    {
        let basis = self.basis.as_ref().ok_or(PcaError::Unfitted)?;
        project(x.into(), basis.view())
    }

    /// Fits the basis to `x` and projects the same `x` onto it.
    ///
    /// Equivalent to [`PCA::fit`] followed by [`PCA::transform`] on the same data,
    /// so the scores are those of the uncentered input.
    pub fn fit_transform<'a, V>(&mut self, x: V, n_components: usize) -> Result<Array2<f64>, PcaError>
    where
        V: AsArray<'a, f64, Ix2>,
    {
        let x: ArrayView2<'a, f64> = x.into();
        self.fit(x, n_components)?;
        self.transform(x)
    }
}
