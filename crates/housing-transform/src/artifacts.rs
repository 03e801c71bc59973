//! Persistence of fitted objects and output arrays.
//!
//! Fitted objects are stored as pretty-printed JSON. [`FittedArtifacts`]
//! loads a complete set back and re-applies it to new feature frames.

use crate::config::TransformationConfig;
use crate::decomposition::FittedPca;
use crate::error::{Result, TransformError};
use crate::pipeline::FittedColumnTransformer;
use crate::types::FeatureMatrix;
use ndarray::Array2;
use polars::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialize an object to `path`, creating parent directories.
pub fn save_object<T: Serialize>(path: &Path, object: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(object)?;
    fs::write(path, json)?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// Deserialize an object previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    pub pca: PathBuf,
    pub pca_components: PathBuf,
}

impl ArtifactPaths {
    pub fn from_config(config: &TransformationConfig) -> Self {
        Self {
            preprocessor: config.preprocessor_path(),
            pca: config.pca_path(),
            pca_components: config.pca_components_path(),
        }
    }

    /// Default file names under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let config = TransformationConfig {
            artifacts_dir: dir.into(),
            ..TransformationConfig::default()
        };
        Self::from_config(&config)
    }
}

/// A fitted preprocessor and PCA loaded from disk.
#[derive(Debug, Clone)]
pub struct FittedArtifacts {
    pub preprocessor: FittedColumnTransformer,
    pub pca: FittedPca,
    pub n_components: usize,
    /// Column ignored by [`FittedArtifacts::project`] when present.
    pub target_column: String,
}

static_assertions::assert_impl_all!(FittedArtifacts: Send, Sync);

impl FittedArtifacts {
    /// Load all three artifacts.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let preprocessor: FittedColumnTransformer = load_object(&paths.preprocessor)?;
        let pca: FittedPca = load_object(&paths.pca)?;
        let n_components: usize = load_object(&paths.pca_components)?;

        if n_components != pca.n_components() {
            return Err(TransformError::InvalidComponents {
                requested: n_components,
                available: pca.n_components(),
            });
        }
        if preprocessor.n_features_out() != pca.n_features_in() {
            return Err(TransformError::FeatureMismatch {
                expected: pca.n_features_in(),
                got: preprocessor.n_features_out(),
            });
        }

        info!(
            "Loaded artifacts: {} features -> {} components",
            pca.n_features_in(),
            n_components
        );
        Ok(Self {
            preprocessor,
            pca,
            n_components,
            target_column: TransformationConfig::default().target_column,
        })
    }

    /// Load the artifacts named by a configuration.
    pub fn from_config(config: &TransformationConfig) -> Result<Self> {
        let mut artifacts = Self::load(&ArtifactPaths::from_config(config))?;
        artifacts.target_column = config.target_column.clone();
        Ok(artifacts)
    }

    /// Preprocess, rename and project a feature frame.
    pub fn project(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let features = if df.column(&self.target_column).is_ok() {
            df.drop(&self.target_column)?
        } else {
            df.clone()
        };
        let transformed = self.preprocessor.transform(&features)?.with_canonical_names();
        self.pca.transform(&transformed)
    }
}

/// Write a numeric array as CSV with a header row.
pub fn write_array_csv(path: &Path, array: &Array2<f64>, names: &[String]) -> Result<()> {
    if names.len() != array.ncols() {
        return Err(TransformError::FeatureMismatch {
            expected: array.ncols(),
            got: names.len(),
        });
    }

    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let values: Vec<f64> = array.column(j).to_vec();
            Series::new(name.as_str().into(), &values).into()
        })
        .collect();
    let mut df = DataFrame::new(columns)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;

    info!("Array saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("k.json");

        save_object(&path, &4usize).unwrap();
        let loaded: usize = load_object(&path).unwrap();
        assert_eq!(loaded, 4);
    }

    #[test]
    fn test_load_missing_object_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_object::<usize>(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_artifact_paths_in_dir() {
        let paths = ArtifactPaths::in_dir("out");
        assert_eq!(paths.preprocessor, PathBuf::from("out").join("preprocessor.json"));
        assert_eq!(paths.pca, PathBuf::from("out").join("pca.json"));
        assert_eq!(
            paths.pca_components,
            PathBuf::from("out").join("pca_components.json")
        );
    }

    #[test]
    fn test_write_array_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train_array.csv");
        let array = array![[1.0, 2.0], [3.0, 4.5]];
        let names = vec!["PC1".to_string(), "SalePrice".to_string()];

        write_array_csv(&path, &array, &names).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("PC1,SalePrice"));

        let rows: Vec<Vec<f64>> = lines
            .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows, vec![vec![1.0, 2.0], vec![3.0, 4.5]]);
    }

    #[test]
    fn test_write_array_csv_name_mismatch() {
        let dir = TempDir::new().unwrap();
        let array = array![[1.0, 2.0]];
        let err = write_array_csv(&dir.path().join("a.csv"), &array, &["PC1".to_string()]);
        assert!(matches!(err.unwrap_err(), TransformError::FeatureMismatch { .. }));
    }
}
