//! Dimensionality reduction.

mod eigen;
mod pca;

pub use eigen::{MAX_SWEEPS, SymmetricEigen, symmetric_eigen};
pub use pca::{FittedPca, Pca};
