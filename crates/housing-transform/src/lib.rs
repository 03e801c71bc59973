//! Housing Feature Transformation Library
//!
//! Preprocessing and dimensionality reduction for a housing-price regression
//! workflow, built with Rust, Polars and ndarray.
//!
//! # Overview
//!
//! - **Column groups**: outlier-prone numeric, outlier-free numeric and
//!   categorical features, each with its own imputation and scaling
//! - **Column transformer**: median/robust, mean/standard and
//!   most-frequent/one-hot pipelines combined into one feature matrix
//! - **PCA**: exact principal component analysis with an explained-variance report
//! - **Fit on train only**: every statistic is learned from the training
//!   split and re-applied, never refitted, to the test split
//! - **Artifacts**: fitted objects persisted as JSON and reloadable for inference
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use housing_transform::{DataTransformation, TransformationConfig};
//!
//! let config = TransformationConfig::builder()
//!     .artifacts_dir("artifacts")
//!     .n_components(4)
//!     .build()?;
//!
//! let output = DataTransformation::new(config)
//!     .initiate_data_transformation("data/train.csv", "data/test.csv")?;
//!
//! // Each row is [PC1, PC2, PC3, PC4, SalePrice]
//! println!("train: {:?}, test: {:?}", output.train.dim(), output.test.dim());
//! ```
//!
//! # Reusing fitted artifacts
//!
//! ```rust,ignore
//! use housing_transform::{ArtifactPaths, FittedArtifacts};
//!
//! let artifacts = FittedArtifacts::load(&ArtifactPaths::in_dir("artifacts"))?;
//! let projected = artifacts.project(&new_houses)?;
//! ```
//!
//! # Errors
//!
//! Every failure is a [`TransformError`]. [`TransformError::kind`] tells I/O
//! problems from schema problems and transformer failures, and
//! [`TransformError::stage`] names the driver step that failed.

pub mod artifacts;
pub mod config;
pub mod decomposition;
pub mod encoding;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod scaling;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use artifacts::{ArtifactPaths, FittedArtifacts, load_object, save_object, write_array_csv};
pub use config::{
    ConfigValidationError, RemainderPolicy, TransformationConfig, TransformationConfigBuilder,
    UnknownCategoryPolicy,
};
pub use decomposition::{FittedPca, Pca};
pub use encoding::{FittedOneHotEncoder, OneHotEncoder};
pub use error::{ErrorKind, Result as TransformResult, ResultExt, TransformError};
pub use imputers::{ImputationStrategy, StatisticalImputer};
pub use pipeline::{
    ColumnGroup, ColumnTransformer, DataTransformation, FeatureEncoding,
    FittedColumnTransformer, PreprocessorBuilder,
};
pub use scaling::{RobustScaler, StandardScaler};
pub use schema::{FeatureSchema, GroupKind};
pub use types::{
    DataSplit, FeatureMatrix, TransformStage, TransformationOutput, TransformationSummary,
};
