//! Principal component analysis.
//!
//! Exact PCA on mean-centered data. With at least as many samples as
//! features the `d x d` covariance matrix is decomposed; otherwise the
//! smaller `n x n` Gram matrix is decomposed and its eigenvectors are
//! mapped back to feature space.
//!
//! Components are normalized so that the loading with the largest
//! magnitude is positive, which makes the output deterministic.
//!
//! # Example
//!
//! ```rust,ignore
//! use housing_transform::decomposition::Pca;
//!
//! let fitted = Pca::with_components(4).fit(&train)?;
//! let projected = fitted.transform(&test)?;
//! println!("{:?}", fitted.cumulative_explained_variance_ratio());
//! ```

use super::eigen::symmetric_eigen;
use crate::error::{Result, TransformError};
use crate::types::{FeatureMatrix, component_names};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unfitted PCA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pca {
    /// Number of components kept; `None` keeps `min(n_samples, n_features)`.
    pub n_components: Option<usize>,
}

impl Pca {
    /// PCA that keeps every component.
    pub fn new() -> Self {
        Self::default()
    }

    /// PCA that keeps exactly `k` components.
    pub fn with_components(k: usize) -> Self {
        Self {
            n_components: Some(k),
        }
    }

    pub fn fit(&self, data: &FeatureMatrix) -> Result<FittedPca> {
        let (n_samples, n_features) = data.values.dim();
        if n_samples < 2 {
            return Err(TransformError::InsufficientData(format!(
                "PCA needs at least 2 samples, got {}",
                n_samples
            )));
        }
        if n_features == 0 {
            return Err(TransformError::InsufficientData(
                "PCA needs at least one feature".to_string(),
            ));
        }

        let available = n_samples.min(n_features);
        let k = self.n_components.unwrap_or(available);
        if k == 0 || k > available {
            return Err(TransformError::InvalidComponents {
                requested: k,
                available,
            });
        }

        let mean = data
            .values
            .mean_axis(Axis(0))
            .ok_or_else(|| TransformError::InsufficientData("empty matrix".to_string()))?;
        let centered = &data.values - &mean;

        let denom = (n_samples - 1) as f64;
        let total_variance = centered.iter().map(|v| v * v).sum::<f64>() / denom;

        let (mut components, eigenvalues) = if n_features <= n_samples {
            covariance_components(&centered, k)?
        } else {
            gram_components(&centered, k)?
        };
        flip_signs(&mut components);

        let explained_variance = eigenvalues.mapv(|v| v.max(0.0));
        let explained_variance_ratio = if total_variance > 0.0 {
            explained_variance.mapv(|v| v / total_variance)
        } else {
            Array1::zeros(k)
        };

        debug!(
            n_samples,
            n_features,
            n_components = k,
            "Fitted PCA"
        );

        Ok(FittedPca {
            feature_names_in: data.names.clone(),
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
            n_samples_seen: n_samples,
        })
    }
}

/// Top `k` eigenvectors of the covariance matrix, as rows.
fn covariance_components(centered: &Array2<f64>, k: usize) -> Result<(Array2<f64>, Array1<f64>)> {
    let denom = (centered.nrows() - 1) as f64;
    let covariance = centered.t().dot(centered) / denom;
    let eig = symmetric_eigen(&covariance)?;

    let components = eig
        .eigenvectors
        .slice(ndarray::s![.., ..k])
        .t()
        .to_owned();
    let eigenvalues = eig.eigenvalues.slice(ndarray::s![..k]).to_owned();
    Ok((components, eigenvalues))
}

/// Top `k` principal axes recovered from the Gram matrix, as rows.
fn gram_components(centered: &Array2<f64>, k: usize) -> Result<(Array2<f64>, Array1<f64>)> {
    let n_samples = centered.nrows();
    let n_features = centered.ncols();
    let denom = (n_samples - 1) as f64;

    let gram = centered.dot(&centered.t()) / denom;
    let eig = symmetric_eigen(&gram)?;

    let mut components = Array2::<f64>::zeros((k, n_features));
    for i in 0..k {
        let mut axis = centered.t().dot(&eig.eigenvectors.column(i));
        let norm = axis.dot(&axis).sqrt();
        // a null direction of the data has no defined axis
        if norm > 1e-12 {
            axis.mapv_inplace(|x| x / norm);
        } else {
            axis.fill(0.0);
        }
        components.row_mut(i).assign(&axis);
    }

    let eigenvalues = eig.eigenvalues.slice(ndarray::s![..k]).to_owned();
    Ok((components, eigenvalues))
}

/// Make the largest-magnitude loading of every component positive.
fn flip_signs(components: &mut Array2<f64>) {
    for mut row in components.rows_mut() {
        let pivot = row
            .iter()
            .copied()
            .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
        if pivot < 0.0 {
            row.mapv_inplace(|x| -x);
        }
    }
}

/// PCA learned from training features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPca {
    /// Column names seen during fit; transform requires the same names.
    pub feature_names_in: Vec<String>,
    pub mean: Array1<f64>,
    /// Principal axes, one per row (`k x n_features`).
    pub components: Array2<f64>,
    pub explained_variance: Array1<f64>,
    pub explained_variance_ratio: Array1<f64>,
    pub n_samples_seen: usize,
}

impl FittedPca {
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features_in(&self) -> usize {
        self.components.ncols()
    }

    /// Running sum of the explained-variance ratios.
    pub fn cumulative_explained_variance_ratio(&self) -> Vec<f64> {
        self.explained_variance_ratio
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect()
    }

    /// Project features onto the principal axes: `(X - mean) · componentsᵀ`.
    pub fn transform(&self, data: &FeatureMatrix) -> Result<FeatureMatrix> {
        if data.n_features() != self.n_features_in() {
            return Err(TransformError::FeatureMismatch {
                expected: self.n_features_in(),
                got: data.n_features(),
            });
        }
        if let Some((position, (expected, got))) = self
            .feature_names_in
            .iter()
            .zip(data.names.iter())
            .enumerate()
            .find(|(_, (expected, got))| expected != got)
        {
            return Err(TransformError::FeatureNamesMismatch {
                position,
                expected: expected.clone(),
                got: got.clone(),
            });
        }

        let centered = &data.values - &self.mean;
        let projected = centered.dot(&self.components.t());
        Ok(FeatureMatrix::new(
            component_names(self.n_components()),
            projected,
        ))
    }
}
