//! Shared data types for the transformation pipeline.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which split of the dataset a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSplit {
    Train,
    Test,
}

impl fmt::Display for DataSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Stages of the transformation driver, in execution order.
///
/// Errors raised by the driver carry the stage that was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStage {
    /// Reading the train and test CSV files
    LoadData,
    /// Separating features from the target column
    SplitTarget,
    /// Wiring the column groups into a column transformer
    BuildPreprocessor,
    /// Fitting the preprocessor on train features and transforming them
    FitPreprocessor,
    /// Fitting the unconstrained PCA for the variance report
    ExploreVariance,
    /// Fitting the fixed-size PCA and projecting train features
    FitPca,
    /// Transforming and projecting test features
    TransformTest,
    /// Joining principal components with the target column
    AssembleArrays,
    /// Writing fitted objects to disk
    PersistArtifacts,
}

impl TransformStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LoadData => "Loading data",
            Self::SplitTarget => "Splitting target",
            Self::BuildPreprocessor => "Building preprocessor",
            Self::FitPreprocessor => "Fitting preprocessor",
            Self::ExploreVariance => "Exploring explained variance",
            Self::FitPca => "Fitting PCA",
            Self::TransformTest => "Transforming test features",
            Self::AssembleArrays => "Assembling arrays",
            Self::PersistArtifacts => "Persisting artifacts",
        }
    }
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A dense numeric matrix with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(names.len(), values.ncols());
        Self { names, values }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Replace the column names with `c1..cN`.
    ///
    /// The column transformer's output names are not stable across
    /// vocabularies, so both splits are renamed to the same positional
    /// scheme before PCA sees them.
    pub fn with_canonical_names(mut self) -> Self {
        self.names = canonical_column_names(self.values.ncols());
        self
    }
}

/// Positional column names `c1..cN`.
pub fn canonical_column_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("c{}", i)).collect()
}

/// Principal component names `PC1..PCk`.
pub fn component_names(k: usize) -> Vec<String> {
    (1..=k).map(|i| format!("PC{}", i)).collect()
}

/// Result of [`DataTransformation::initiate_data_transformation`](crate::DataTransformation::initiate_data_transformation).
///
/// Each array row is `[PC1, .., PCk, target]`.
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
    pub pca_path: PathBuf,
    pub pca_components_path: PathBuf,
    /// Cumulative explained-variance ratio of the unconstrained PCA.
    pub cumulative_explained_variance: Vec<f64>,
}

impl TransformationOutput {
    /// Column names of the output arrays.
    pub fn column_names(&self, target_column: &str) -> Vec<String> {
        let k = self.train.ncols().saturating_sub(1);
        let mut names = component_names(k);
        names.push(target_column.to_string());
        names
    }
}

/// Serializable run summary printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationSummary {
    pub train_shape: (usize, usize),
    pub test_shape: (usize, usize),
    pub n_components: usize,
    pub cumulative_explained_variance: Vec<f64>,
    pub preprocessor_path: PathBuf,
    pub pca_path: PathBuf,
    pub pca_components_path: PathBuf,
}

impl From<&TransformationOutput> for TransformationSummary {
    fn from(output: &TransformationOutput) -> Self {
        Self {
            train_shape: output.train.dim(),
            test_shape: output.test.dim(),
            n_components: output.train.ncols().saturating_sub(1),
            cumulative_explained_variance: output.cumulative_explained_variance.clone(),
            preprocessor_path: output.preprocessor_path.clone(),
            pca_path: output.pca_path.clone(),
            pca_components_path: output.pca_components_path.clone(),
        }
    }
}
