// Principal component analysis (PCA)

#![doc = include_str!("../README.md")]

pub mod decompose;
pub mod diagnostics;
pub mod error;
pub mod linalg_backends;
pub mod pca;

pub use error::PcaError;
pub use pca::PCA;
