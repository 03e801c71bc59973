//! The transformation driver.
//!
//! Fits the preprocessor and PCA on the training split only, applies both
//! to the test split, and persists the fitted objects.

use crate::artifacts::save_object;
use crate::config::TransformationConfig;
use crate::decomposition::Pca;
use crate::error::{Result, ResultExt, TransformError};
use crate::pipeline::builder::PreprocessorBuilder;
use crate::pipeline::column_transformer::ColumnTransformer;
use crate::schema::FeatureSchema;
use crate::types::{DataSplit, FeatureMatrix, TransformStage, TransformationOutput};
use crate::utils::numeric_values;
use ndarray::{Array1, Array2, s};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the full fit-on-train / transform-on-test sequence.
///
/// # Example
///
/// ```rust,ignore
/// use housing_transform::{DataTransformation, TransformationConfig};
///
/// let output = DataTransformation::new(TransformationConfig::default())
///     .initiate_data_transformation("data/train.csv", "data/test.csv")?;
///
/// assert_eq!(output.train.ncols(), 5);
/// println!("preprocessor saved to {}", output.preprocessor_path.display());
/// ```
#[derive(Debug, Clone)]
pub struct DataTransformation {
    config: TransformationConfig,
    schema: FeatureSchema,
}

static_assertions::assert_impl_all!(DataTransformation: Send, Sync);

impl DataTransformation {
    /// Create a driver for the housing schema.
    pub fn new(config: TransformationConfig) -> Self {
        Self {
            config,
            schema: FeatureSchema::housing(),
        }
    }

    /// Use custom column groups.
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build the unfitted preprocessor.
    pub fn get_data_transformer_object(&self) -> Result<ColumnTransformer> {
        PreprocessorBuilder::from_config(&self.config)
            .schema(self.schema.clone())
            .build()
            .stage(TransformStage::BuildPreprocessor)
    }

    /// Read both CSV files and run [`transform_frames`](Self::transform_frames).
    pub fn initiate_data_transformation(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
    ) -> Result<TransformationOutput> {
        info!("Step 1: Loading train and test data...");
        let train_df = load_csv(train_path.as_ref(), &self.config).stage(TransformStage::LoadData)?;
        let test_df = load_csv(test_path.as_ref(), &self.config).stage(TransformStage::LoadData)?;
        debug!("Train shape: {:?}, test shape: {:?}", train_df.shape(), test_df.shape());

        self.transform_frames(&train_df, &test_df)
    }

    /// Fit on `train_df`, apply to both frames, and persist the fitted objects.
    pub fn transform_frames(
        &self,
        train_df: &DataFrame,
        test_df: &DataFrame,
    ) -> Result<TransformationOutput> {
        let start_time = Instant::now();
        let target = self.config.target_column.as_str();

        info!("Step 2: Separating target column '{}'...", target);
        let (train_features, train_target) =
            split_target(train_df, target, DataSplit::Train).stage(TransformStage::SplitTarget)?;
        let (test_features, test_target) =
            split_target(test_df, target, DataSplit::Test).stage(TransformStage::SplitTarget)?;

        info!("Step 3: Fitting preprocessor on training features...");
        let preprocessor = self.get_data_transformer_object()?;
        let (preprocessor, train_matrix) = preprocessor
            .fit_transform(&train_features)
            .stage(TransformStage::FitPreprocessor)?;
        let train_matrix = train_matrix.with_canonical_names();
        info!(
            "Preprocessed training features: {} rows x {} columns",
            train_matrix.n_rows(),
            train_matrix.n_features()
        );

        info!("Step 4: Exploring explained variance...");
        let cumulative_explained_variance = Pca::new()
            .fit(&train_matrix)
            .stage(TransformStage::ExploreVariance)?
            .cumulative_explained_variance_ratio();
        if self.config.print_variance {
            println!(
                "Cumulative explained variance ratio: {:?}",
                cumulative_explained_variance
            );
        }
        info!(
            "Cumulative explained variance over {} components",
            cumulative_explained_variance.len()
        );

        info!(
            "Step 5: Fitting PCA with {} components...",
            self.config.n_components
        );
        let pca = Pca::with_components(self.config.n_components)
            .fit(&train_matrix)
            .stage(TransformStage::FitPca)?;
        let train_pcs = pca.transform(&train_matrix).stage(TransformStage::FitPca)?;

        info!("Step 6: Transforming test features...");
        let test_pcs = preprocessor
            .transform(&test_features)
            .map(FeatureMatrix::with_canonical_names)
            .and_then(|m| pca.transform(&m))
            .stage(TransformStage::TransformTest)?;

        info!("Step 7: Assembling output arrays...");
        let train = attach_target(&train_pcs, &train_target).stage(TransformStage::AssembleArrays)?;
        let test = attach_target(&test_pcs, &test_target).stage(TransformStage::AssembleArrays)?;

        let preprocessor_path = self.config.preprocessor_path();
        let pca_path = self.config.pca_path();
        let pca_components_path = self.config.pca_components_path();
        if self.config.save_to_disk {
            info!(
                "Step 8: Saving artifacts to {}...",
                self.config.artifacts_dir.display()
            );
            save_object(&preprocessor_path, &preprocessor)
                .and_then(|_| save_object(&pca_path, &pca))
                .and_then(|_| save_object(&pca_components_path, &self.config.n_components))
                .stage(TransformStage::PersistArtifacts)?;
        } else {
            info!("Step 8: Skipping artifact persistence (disabled)");
        }

        info!(
            "Data transformation completed in {:.2?}: train {:?}, test {:?}",
            start_time.elapsed(),
            train.dim(),
            test.dim()
        );

        Ok(TransformationOutput {
            train,
            test,
            preprocessor_path,
            pca_path,
            pca_components_path,
            cumulative_explained_variance,
        })
    }
}

/// Read a CSV file with a header row.
pub fn load_csv(path: &Path, config: &TransformationConfig) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(
        config
            .null_values
            .iter()
            .map(|s| PlSmallStr::from(s.as_str()))
            .collect(),
    );

    CsvReadOptions::default()
        .with_infer_schema_length(config.infer_schema_length)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| TransformError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Separate the target column from the features.
///
/// The target must be present and fully numeric.
pub fn split_target(
    df: &DataFrame,
    target: &str,
    split: DataSplit,
) -> Result<(DataFrame, Array1<f64>)> {
    let column = df.column(target).map_err(|_| TransformError::MissingTarget {
        column: target.to_string(),
        split,
    })?;

    let values = numeric_values(column.as_materialized_series())?;
    let invalid = values.iter().filter(|v| v.is_none()).count();
    if invalid > 0 {
        return Err(TransformError::InvalidTarget {
            column: target.to_string(),
            count: invalid,
        });
    }

    let target_values: Array1<f64> = values.into_iter().flatten().collect();
    let features = df.drop(target)?;
    Ok((features, target_values))
}

/// Append the target as the last column of the projected features.
fn attach_target(projected: &FeatureMatrix, target: &Array1<f64>) -> Result<Array2<f64>> {
    let (rows, k) = projected.values.dim();
    if rows != target.len() {
        return Err(TransformError::FeatureMismatch {
            expected: rows,
            got: target.len(),
        });
    }

    let mut out = Array2::<f64>::zeros((rows, k + 1));
    out.slice_mut(s![.., ..k]).assign(&projected.values);
    out.column_mut(k).assign(target);
    Ok(out)
}
