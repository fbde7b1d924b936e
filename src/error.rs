// src/error.rs

use thiserror::Error;

/// The error type for PCA operations.
#[derive(Debug, Error)]
pub enum PcaError {
    /// `n_components` outside `[1, n_features]`.
    #[error("n_components must be in [1, {n_features}], got {requested}")]
    InvalidComponentCount { requested: usize, n_features: usize },

    /// `transform` called before a successful `fit`.
    #[error("PCA not fitted yet")]
    Unfitted,

    /// Input column count differs from the number of features seen at fit time.
    #[error("input has {found} features but the fitted basis expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Zero samples or zero features.
    #[error("input matrix is empty ({n_samples} samples x {n_features} features)")]
    EmptyInput { n_samples: usize, n_features: usize },

    #[error("malformed matrix: {0}")]
    NonSymmetricOrDegenerateInput(String),

    #[error("linear algebra operation failed: {0}")]
    LinalgError(String),
}

impl PcaError {
    pub(crate) fn from_backend(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        PcaError::LinalgError(e.to_string())
    }
}
