//! Configuration types for the transformation pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Everything the pipeline writes or reads is named here rather than
//! hard-coded, so callers choose where artifacts land.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do with input columns that belong to no column group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemainderPolicy {
    /// Silently leave them out of the transformed output
    #[default]
    Drop,
    /// Fail when any such column is present
    Error,
}

/// What to do with categorical values not seen during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnknownCategoryPolicy {
    /// Fail the transform
    #[default]
    Error,
    /// Encode the value as all zeros
    Ignore,
}

/// Tokens read as missing values, matching the pandas defaults.
pub const DEFAULT_NULL_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Configuration for the transformation pipeline.
///
/// Use [`TransformationConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use housing_transform::config::{TransformationConfig, RemainderPolicy};
///
/// let config = TransformationConfig::builder()
///     .artifacts_dir("build/artifacts")
///     .remainder(RemainderPolicy::Error)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Directory receiving all artifacts.
    /// Default: "artifacts"
    pub artifacts_dir: PathBuf,

    /// File name of the serialized preprocessor.
    /// Default: "preprocessor.json"
    pub preprocessor_file: String,

    /// File name of the serialized PCA.
    /// Default: "pca.json"
    pub pca_file: String,

    /// File name of the serialized component count.
    /// Default: "pca_components.json"
    pub pca_components_file: String,

    /// Name of the regression target column.
    /// Default: "SalePrice"
    pub target_column: String,

    /// Number of principal components kept.
    /// Default: 4
    pub n_components: usize,

    /// Handling of columns outside every group.
    /// Default: Drop
    pub remainder: RemainderPolicy,

    /// Handling of unseen categorical values.
    /// Default: Error
    pub handle_unknown: UnknownCategoryPolicy,

    /// CSV tokens read as missing values.
    pub null_values: Vec<String>,

    /// Rows scanned to infer CSV column types. `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Whether fitted objects are written to disk.
    /// Default: true
    pub save_to_disk: bool,

    /// Whether the cumulative explained variance is printed to stdout.
    /// Default: true
    #[serde(default = "default_true")]
    pub print_variance: bool,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            preprocessor_file: "preprocessor.json".to_string(),
            pca_file: "pca.json".to_string(),
            pca_components_file: "pca_components.json".to_string(),
            target_column: "SalePrice".to_string(),
            n_components: 4,
            remainder: RemainderPolicy::default(),
            handle_unknown: UnknownCategoryPolicy::default(),
            null_values: default_null_values(),
            infer_schema_length: None,
            save_to_disk: true,
            print_variance: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_null_values() -> Vec<String> {
    DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect()
}

impl TransformationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransformationConfigBuilder {
        TransformationConfigBuilder::default()
    }

    /// Path of the serialized preprocessor.
    pub fn preprocessor_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.preprocessor_file)
    }

    /// Path of the serialized PCA.
    pub fn pca_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.pca_file)
    }

    /// Path of the serialized component count.
    pub fn pca_components_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.pca_components_file)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.n_components == 0 {
            return Err(ConfigValidationError::InvalidComponents(self.n_components));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("target_column".to_string()));
        }

        let files = [
            ("preprocessor_file", &self.preprocessor_file),
            ("pca_file", &self.pca_file),
            ("pca_components_file", &self.pca_components_file),
        ];
        for (field, value) in files {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyField(field.to_string()));
            }
        }
        for (i, (_, a)) in files.iter().enumerate() {
            if files[i + 1..].iter().any(|(_, b)| a == b) {
                return Err(ConfigValidationError::DuplicateArtifact(a.to_string()));
            }
        }

        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidInferLength);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid number of components: {0} (must be at least 1)")]
    InvalidComponents(usize),

    #[error("Field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Artifact file name '{0}' is used more than once")]
    DuplicateArtifact(String),

    #[error("Schema inference length must be at least 1 row")]
    InvalidInferLength,
}

/// Builder for [`TransformationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct TransformationConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    preprocessor_file: Option<String>,
    pca_file: Option<String>,
    pca_components_file: Option<String>,
    target_column: Option<String>,
    n_components: Option<usize>,
    remainder: Option<RemainderPolicy>,
    handle_unknown: Option<UnknownCategoryPolicy>,
    null_values: Option<Vec<String>>,
    infer_schema_length: Option<Option<usize>>,
    save_to_disk: Option<bool>,
    print_variance: Option<bool>,
}

impl TransformationConfigBuilder {
    /// Set the directory that receives all artifacts.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the preprocessor artifact file name.
    pub fn preprocessor_file(mut self, name: impl Into<String>) -> Self {
        self.preprocessor_file = Some(name.into());
        self
    }

    /// Set the PCA artifact file name.
    pub fn pca_file(mut self, name: impl Into<String>) -> Self {
        self.pca_file = Some(name.into());
        self
    }

    /// Set the component-count artifact file name.
    pub fn pca_components_file(mut self, name: impl Into<String>) -> Self {
        self.pca_components_file = Some(name.into());
        self
    }

    /// Set the target column name.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the number of principal components kept.
    pub fn n_components(mut self, n: usize) -> Self {
        self.n_components = Some(n);
        self
    }

    /// Set the handling of columns outside every group.
    pub fn remainder(mut self, policy: RemainderPolicy) -> Self {
        self.remainder = Some(policy);
        self
    }

    /// Set the handling of unseen categorical values.
    pub fn handle_unknown(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.handle_unknown = Some(policy);
        self
    }

    /// Replace the CSV tokens read as missing values.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Limit schema inference to the first `rows` rows (`None` scans everything).
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Enable or disable writing artifacts to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Enable or disable the explained-variance line on stdout.
    pub fn print_variance(mut self, print: bool) -> Self {
        self.print_variance = Some(print);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `TransformationConfig` or an error if validation fails.
    pub fn build(self) -> Result<TransformationConfig, ConfigValidationError> {
        let defaults = TransformationConfig::default();
        let config = TransformationConfig {
            artifacts_dir: self.artifacts_dir.unwrap_or(defaults.artifacts_dir),
            preprocessor_file: self.preprocessor_file.unwrap_or(defaults.preprocessor_file),
            pca_file: self.pca_file.unwrap_or(defaults.pca_file),
            pca_components_file: self
                .pca_components_file
                .unwrap_or(defaults.pca_components_file),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            n_components: self.n_components.unwrap_or(defaults.n_components),
            remainder: self.remainder.unwrap_or_default(),
            handle_unknown: self.handle_unknown.unwrap_or_default(),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            save_to_disk: self.save_to_disk.unwrap_or(true),
            print_variance: self.print_variance.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
