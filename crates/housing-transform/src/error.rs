//! Error types for the housing feature transformation.
//!
//! Every failure is returned as a [`TransformError`]. Errors raised by the
//! driver are wrapped with the [`TransformStage`] that was running, and
//! every variant maps onto an [`ErrorKind`] so callers can tell I/O
//! failures from schema problems and transformer failures.
//!
//! Errors are serializable so the CLI can emit them as JSON.

use crate::types::{DataSplit, TransformStage};
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Reading or writing files failed.
    Io,
    /// Input data does not match the declared column schema.
    Schema,
    /// A transformer could not be fitted or applied.
    Transformer,
    /// The configuration or column groups are invalid.
    Config,
}

/// The main error type for the transformation pipeline.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A CSV file could not be opened or parsed.
    #[error("Failed to read CSV '{}': {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// The target column is absent from one of the splits.
    #[error("Target column '{column}' not found in {split} data")]
    MissingTarget { column: String, split: DataSplit },

    /// The target column holds missing or non-numeric values.
    #[error("Target column '{column}' has {count} missing or non-numeric value(s)")]
    InvalidTarget { column: String, count: usize },

    /// Declared feature columns are absent from the input frame.
    #[error("Missing {} declared feature column(s): {}", .0.len(), .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Input columns that belong to no group, rejected under the strict remainder policy.
    #[error("Column(s) not assigned to any group: {}", .0.join(", "))]
    UnassignedColumns(Vec<String>),

    /// A categorical value was not seen during fitting.
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Column groups are malformed (duplicates, overlaps, empty names).
    #[error("Invalid column groups: {0}")]
    InvalidSchema(String),

    /// Feature count differs from the one seen during fitting.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Feature names differ from the ones seen during fitting.
    #[error("Feature names differ from those seen during fit (first difference at position {position}: expected '{expected}', got '{got}')")]
    FeatureNamesMismatch {
        position: usize,
        expected: String,
        got: String,
    },

    /// The requested number of principal components cannot be produced.
    #[error("Cannot keep {requested} components: at most {available} available")]
    InvalidComponents { requested: usize, available: usize },

    /// Not enough rows to fit a transformer.
    #[error("Not enough data: {0}")]
    InsufficientData(String),

    /// The eigensolver did not reach the convergence tolerance.
    #[error("Eigen decomposition did not converge after {0} sweeps")]
    NoConvergence(usize),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised while a pipeline stage was running.
    #[error("{} failed: {source}", .stage.display_name())]
    Stage {
        stage: TransformStage,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    /// Tag an error with the stage that produced it.
    ///
    /// An error that already carries a stage keeps the innermost one.
    pub fn with_stage(self, stage: TransformStage) -> Self {
        match self {
            already @ TransformError::Stage { .. } => already,
            other => TransformError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage that failed, if the error was raised by the driver.
    pub fn stage(&self) -> Option<TransformStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage wrapper removed.
    pub fn root(&self) -> &TransformError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadFailed { .. } | Self::Io(_) | Self::Json(_) => ErrorKind::Io,
            Self::MissingTarget { .. }
            | Self::InvalidTarget { .. }
            | Self::MissingColumns(_)
            | Self::UnassignedColumns(_)
            | Self::FeatureMismatch { .. }
            | Self::FeatureNamesMismatch { .. } => ErrorKind::Schema,
            Self::UnknownCategory { .. }
            | Self::InvalidComponents { .. }
            | Self::InsufficientData(_)
            | Self::NoConvergence(_)
            | Self::Polars(_) => ErrorKind::Transformer,
            Self::InvalidSchema(_) | Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Stage { source, .. } => source.kind(),
        }
    }

    /// Get error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ReadFailed { .. } => "READ_FAILED",
            Self::MissingTarget { .. } => "MISSING_TARGET",
            Self::InvalidTarget { .. } => "INVALID_TARGET",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::UnassignedColumns(_) => "UNASSIGNED_COLUMNS",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::InvalidSchema(_) => "INVALID_SCHEMA",
            Self::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            Self::FeatureNamesMismatch { .. } => "FEATURE_NAMES_MISMATCH",
            Self::InvalidComponents { .. } => "INVALID_COMPONENTS",
            Self::InsufficientData(_) => "INSUFFICIENT_DATA",
            Self::NoConvergence(_) => "NO_CONVERGENCE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Stage { source, .. } => source.error_code(),
        }
    }
}

/// Errors are serialized as `{code, kind, stage, message}`.
impl Serialize for TransformError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TransformError", 4)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("stage", &self.stage())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Extension trait for tagging results with the stage that produced them.
pub trait ResultExt<T> {
    /// Wrap an error result with the given stage.
    fn stage(self, stage: TransformStage) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn stage(self, stage: TransformStage) -> Result<T> {
        self.map_err(|e| e.with_stage(stage))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn stage(self, stage: TransformStage) -> Result<T> {
        self.map_err(|e| TransformError::Polars(e).with_stage(stage))
    }
}
