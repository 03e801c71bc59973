//! Integration tests for the housing feature transformation.
//!
//! These tests run the full driver on generated CSV files with the real
//! housing schema.

use housing_transform::pipeline::load_csv;
use housing_transform::schema::{CATEGORICAL, OUTLIER_FREE_NUMERIC, OUTLIER_PRONE_NUMERIC};
use housing_transform::{
    ArtifactPaths, DataTransformation, ErrorKind, FittedArtifacts, FittedColumnTransformer,
    RemainderPolicy, TransformStage, TransformationConfig, UnknownCategoryPolicy, load_object,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const CATEGORIES: [&str; 3] = ["A", "B", "C"];

/// Deterministic housing-like frame with a few missing cells and one
/// column outside every group.
fn housing_frame(rows: usize, offset: usize) -> DataFrame {
    let mut columns: Vec<Column> = Vec::new();

    let numeric = OUTLIER_PRONE_NUMERIC.iter().chain(OUTLIER_FREE_NUMERIC.iter());
    for (j, name) in numeric.enumerate() {
        let values: Vec<Option<f64>> = (0..rows)
            .map(|i| {
                let r = i + offset;
                if r == 2 && j % 5 == 0 {
                    None
                } else {
                    Some(((r * 7 + j * 3) % 11) as f64 + (j as f64) * 0.5 + (r * r) as f64 * 0.1)
                }
            })
            .collect();
        columns.push(Series::new((*name).into(), values).into());
    }

    for (j, name) in CATEGORICAL.iter().enumerate() {
        let values: Vec<Option<&str>> = (0..rows)
            .map(|i| {
                let r = i + offset;
                if r == 3 && j % 7 == 0 {
                    None
                } else {
                    Some(CATEGORIES[(r + j) % 3])
                }
            })
            .collect();
        columns.push(Series::new((*name).into(), values).into());
    }

    let price: Vec<f64> = (0..rows)
        .map(|i| 100_000.0 + ((i + offset) as f64) * 1_500.0)
        .collect();
    columns.push(Series::new("SalePrice".into(), price).into());

    let extra: Vec<f64> = (0..rows).map(|i| (i * 13 % 5) as f64).collect();
    columns.push(Series::new("Extra_Unlisted".into(), extra).into());

    DataFrame::new(columns).expect("Failed to build frame")
}

fn write_csv(path: &Path, df: &mut DataFrame) {
    let mut file = File::create(path).expect("Failed to create CSV file");
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .expect("Failed to write CSV file");
}

struct Fixture {
    dir: TempDir,
    train: PathBuf,
    test: PathBuf,
}

impl Fixture {
    fn new(mut train: DataFrame, mut test: DataFrame) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        write_csv(&train_path, &mut train);
        write_csv(&test_path, &mut test);
        Self {
            dir,
            train: train_path,
            test: test_path,
        }
    }

    fn standard() -> Self {
        Self::new(housing_frame(10, 0), housing_frame(5, 10))
    }

    fn artifacts_dir(&self) -> PathBuf {
        self.dir.path().join("artifacts")
    }

    fn config(&self) -> TransformationConfig {
        TransformationConfig::builder()
            .artifacts_dir(self.artifacts_dir())
            .print_variance(false)
            .build()
            .unwrap()
    }
}

fn set_column(df: &mut DataFrame, name: &str, values: Vec<&str>) {
    df.replace(name, Series::new(name.into(), values))
        .expect("Failed to replace column");
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[test]
fn test_output_shapes_and_artifacts() {
    let fixture = Fixture::standard();
    let config = fixture.config();

    let output = DataTransformation::new(config.clone())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(output.train.dim(), (10, 5));
    assert_eq!(output.test.dim(), (5, 5));

    assert_eq!(output.preprocessor_path, config.preprocessor_path());
    assert!(output.preprocessor_path.exists());
    assert!(output.pca_path.exists());
    assert!(output.pca_components_path.exists());

    let n_components: usize = load_object(&output.pca_components_path).unwrap();
    assert_eq!(n_components, 4);
}

#[test]
fn test_target_is_last_column() {
    let fixture = Fixture::standard();
    let output = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    let expected: Vec<f64> = (10..15).map(|r| 100_000.0 + r as f64 * 1_500.0).collect();
    assert_eq!(output.test.column(4).to_vec(), expected);
    assert_eq!(
        output.column_names("SalePrice"),
        vec!["PC1", "PC2", "PC3", "PC4", "SalePrice"]
    );
}

#[test]
fn test_cumulative_variance_is_monotonic() {
    let fixture = Fixture::standard();
    let output = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    let cumulative = &output.cumulative_explained_variance;
    assert_eq!(cumulative.len(), 10);
    assert!(cumulative.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    assert!((cumulative[cumulative.len() - 1] - 1.0).abs() < 1e-9);
}

#[test]
fn test_rerun_is_deterministic() {
    let fixture = Fixture::standard();
    let transformation = DataTransformation::new(fixture.config());

    let first = transformation
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    let second = transformation
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    assert_eq!(first.train, second.train);
    assert_eq!(first.test, second.test);
}

// ============================================================================
// Schema Tests
// ============================================================================

#[test]
fn test_missing_target_in_train() {
    let train = housing_frame(10, 0).drop("SalePrice").unwrap();
    let fixture = Fixture::new(train, housing_frame(5, 10));

    let err = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.error_code(), "MISSING_TARGET");
    assert!(!fixture.artifacts_dir().exists());
}

#[test]
fn test_missing_target_in_test() {
    let test = housing_frame(5, 10).drop("SalePrice").unwrap();
    let fixture = Fixture::new(housing_frame(10, 0), test);

    let err = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.stage(), Some(TransformStage::SplitTarget));
}

#[test]
fn test_missing_feature_column() {
    let test = housing_frame(5, 10).drop("Lot_Area").unwrap();
    let fixture = Fixture::new(housing_frame(10, 0), test);

    let err = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.error_code(), "MISSING_COLUMNS");
    assert_eq!(err.stage(), Some(TransformStage::TransformTest));
}

#[test]
fn test_unlisted_column_is_excluded() {
    let fixture = Fixture::standard();
    let output = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    let preprocessor: FittedColumnTransformer = load_object(&output.preprocessor_path).unwrap();
    let names = preprocessor.feature_names_out();
    assert!(names.iter().all(|n| !n.contains("Extra_Unlisted")));
    // 36 numeric columns plus three categories for each of 39 columns
    assert_eq!(names.len(), 36 + 39 * 3);

    let without_extra = Fixture::new(
        housing_frame(10, 0).drop("Extra_Unlisted").unwrap(),
        housing_frame(5, 10).drop("Extra_Unlisted").unwrap(),
    );
    let baseline = DataTransformation::new(without_extra.config())
        .initiate_data_transformation(&without_extra.train, &without_extra.test)
        .unwrap();
    assert_eq!(output.train, baseline.train);
    assert_eq!(output.test, baseline.test);
}

#[test]
fn test_strict_remainder_rejects_unlisted_column() {
    let fixture = Fixture::standard();
    let config = TransformationConfig::builder()
        .artifacts_dir(fixture.artifacts_dir())
        .remainder(RemainderPolicy::Error)
        .print_variance(false)
        .build()
        .unwrap();

    let err = DataTransformation::new(config)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();
    assert_eq!(err.error_code(), "UNASSIGNED_COLUMNS");
    assert_eq!(err.stage(), Some(TransformStage::FitPreprocessor));
    assert!(err.to_string().contains("Extra_Unlisted"));
}

// ============================================================================
// Fit-on-Train Tests
// ============================================================================

#[test]
fn test_unknown_category_in_test() {
    let mut test = housing_frame(5, 10);
    set_column(&mut test, "Street", vec!["A", "B", "Z", "C", "A"]);
    let fixture = Fixture::new(housing_frame(10, 0), test);

    let err = DataTransformation::new(fixture.config())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transformer);
    assert_eq!(err.error_code(), "UNKNOWN_CATEGORY");
    assert_eq!(err.stage(), Some(TransformStage::TransformTest));

    let config = TransformationConfig::builder()
        .artifacts_dir(fixture.artifacts_dir())
        .handle_unknown(UnknownCategoryPolicy::Ignore)
        .print_variance(false)
        .build()
        .unwrap();
    let output = DataTransformation::new(config)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    assert_eq!(output.test.dim(), (5, 5));
}

#[test]
fn test_test_data_never_changes_fitted_state() {
    let baseline = Fixture::standard();
    let baseline_output = DataTransformation::new(baseline.config())
        .initiate_data_transformation(&baseline.train, &baseline.test)
        .unwrap();

    let mut perturbed_test = housing_frame(5, 10);
    let scaled: Vec<f64> = (0..5).map(|i| 1_000_000.0 + i as f64).collect();
    perturbed_test
        .replace("Gr_Liv_Area", Series::new("Gr_Liv_Area".into(), scaled))
        .unwrap();
    set_column(&mut perturbed_test, "Neighborhood", vec!["C", "C", "C", "C", "C"]);
    let perturbed = Fixture::new(housing_frame(10, 0), perturbed_test);
    let perturbed_output = DataTransformation::new(perturbed.config())
        .initiate_data_transformation(&perturbed.train, &perturbed.test)
        .unwrap();

    assert_eq!(baseline_output.train, perturbed_output.train);
    assert_ne!(baseline_output.test, perturbed_output.test);

    let before: FittedColumnTransformer = load_object(&baseline_output.preprocessor_path).unwrap();
    let after: FittedColumnTransformer = load_object(&perturbed_output.preprocessor_path).unwrap();
    assert_eq!(before.groups, after.groups);
}

// ============================================================================
// Artifact Tests
// ============================================================================

#[test]
fn test_loaded_artifacts_reproduce_projection() {
    let fixture = Fixture::standard();
    let config = fixture.config();
    let output = DataTransformation::new(config.clone())
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();

    let artifacts = FittedArtifacts::load(&ArtifactPaths::from_config(&config)).unwrap();
    assert_eq!(artifacts.n_components, 4);

    let test_df = load_csv(&fixture.test, &config).unwrap();
    let projected = artifacts.project(&test_df).unwrap();
    assert_eq!(projected.names, vec!["PC1", "PC2", "PC3", "PC4"]);

    for i in 0..5 {
        for k in 0..4 {
            let diff = (projected.values[[i, k]] - output.test[[i, k]]).abs();
            assert!(diff < 1e-9, "row {} component {} differs by {}", i, k, diff);
        }
    }
}

#[test]
fn test_no_save_writes_nothing() {
    let fixture = Fixture::standard();
    let config = TransformationConfig::builder()
        .artifacts_dir(fixture.artifacts_dir())
        .save_to_disk(false)
        .print_variance(false)
        .build()
        .unwrap();

    let output = DataTransformation::new(config)
        .initiate_data_transformation(&fixture.train, &fixture.test)
        .unwrap();
    assert_eq!(output.train.dim(), (10, 5));
    assert!(!fixture.artifacts_dir().exists());
}

#[test]
fn test_missing_input_file() {
    let fixture = Fixture::standard();
    let err = DataTransformation::new(fixture.config())
        .initiate_data_transformation(fixture.dir.path().join("absent.csv"), &fixture.test)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.stage(), Some(TransformStage::LoadData));
}
