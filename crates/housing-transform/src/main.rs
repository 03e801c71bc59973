//! CLI entry point for the housing feature transformation.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use housing_transform::{
    DataTransformation, RemainderPolicy, TransformationConfig, TransformationOutput,
    TransformationSummary, UnknownCategoryPolicy, write_array_csv,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible log level enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl CliLogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Housing feature preprocessing and PCA",
    long_about = "Fits the housing preprocessor and PCA on a training split, applies them \
                  to a test split, and saves the fitted objects.\n\n\
                  EXAMPLES:\n  \
                  # Default run, artifacts under ./artifacts\n  \
                  housing-transform --train data/train.csv --test data/test.csv\n\n  \
                  # Keep 6 components and write the output arrays\n  \
                  housing-transform --train train.csv --test test.csv --components 6 --output-dir out/\n\n  \
                  # Machine-readable summary\n  \
                  housing-transform --train train.csv --test test.csv --json"
)]
struct Args {
    /// Path to the training CSV file
    #[arg(long)]
    train: PathBuf,

    /// Path to the test CSV file
    #[arg(long)]
    test: PathBuf,

    /// Directory receiving the fitted preprocessor and PCA
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Name of the regression target column
    #[arg(long, default_value = "SalePrice")]
    target: String,

    /// Number of principal components kept
    #[arg(long, default_value = "4")]
    components: usize,

    /// Reject input columns that belong to no column group
    #[arg(long)]
    strict_schema: bool,

    /// Encode categories unseen during fitting as all zeros instead of failing
    #[arg(long)]
    ignore_unknown_categories: bool,

    /// Do not write the fitted objects to disk
    #[arg(long)]
    no_save: bool,

    /// Write train_array.csv and test_array.csv to this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON summary.
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: CliLogLevel,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: CliLogLevel, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level.as_str() };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let transformation = DataTransformation::new(config);

    info!("{}", "=".repeat(80));
    info!("Starting housing feature transformation...");
    info!("{}", "=".repeat(80));

    let output = match transformation.initiate_data_transformation(&args.train, &args.test) {
        Ok(output) => output,
        Err(e) => {
            if args.json {
                let body = serde_json::json!({ "success": false, "error": e });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                error!("Transformation failed: {}", e);
            }
            return Err(anyhow!("Transformation failed: {}", e));
        }
    };

    if let Some(dir) = &args.output_dir {
        write_arrays(dir, &output, &args.target)?;
    }

    let summary = TransformationSummary::from(&output);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human_readable_summary(&summary, &args);
    Ok(())
}

fn build_config(args: &Args) -> Result<TransformationConfig> {
    let remainder = if args.strict_schema {
        RemainderPolicy::Error
    } else {
        RemainderPolicy::Drop
    };
    let handle_unknown = if args.ignore_unknown_categories {
        UnknownCategoryPolicy::Ignore
    } else {
        UnknownCategoryPolicy::Error
    };

    let config = TransformationConfig::builder()
        .artifacts_dir(&args.artifacts_dir)
        .target_column(&args.target)
        .n_components(args.components)
        .remainder(remainder)
        .handle_unknown(handle_unknown)
        .save_to_disk(!args.no_save)
        .print_variance(!args.json)
        .build()?;
    Ok(config)
}

fn write_arrays(dir: &Path, output: &TransformationOutput, target: &str) -> Result<()> {
    let names = output.column_names(target);
    write_array_csv(&dir.join("train_array.csv"), &output.train, &names)?;
    write_array_csv(&dir.join("test_array.csv"), &output.test, &names)?;
    Ok(())
}

/// Print a human-readable summary of the run.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(summary: &TransformationSummary, args: &Args) {
    println!("\n{}", "=".repeat(80));
    println!("TRANSFORMATION SUMMARY");
    println!("{}", "=".repeat(80));
    println!(
        "  Train array: {} rows x {} columns",
        summary.train_shape.0, summary.train_shape.1
    );
    println!(
        "  Test array:  {} rows x {} columns",
        summary.test_shape.0, summary.test_shape.1
    );
    println!("  Components:  {}", summary.n_components);

    if let Some(&kept) = summary
        .cumulative_explained_variance
        .get(summary.n_components.saturating_sub(1))
    {
        println!(
            "  Variance explained by kept components: {:.1}%",
            kept * 100.0
        );
    }

    println!();
    if args.no_save {
        println!("Artifacts were not saved (--no-save)");
    } else {
        println!("Artifacts:");
        println!("  - {}", summary.preprocessor_path.display());
        println!("  - {}", summary.pca_path.display());
        println!("  - {}", summary.pca_components_path.display());
    }

    if let Some(dir) = &args.output_dir {
        println!("Arrays:");
        println!("  - {}", dir.join("train_array.csv").display());
        println!("  - {}", dir.join("test_array.csv").display());
    }

    println!("{}", "=".repeat(80));
    println!("Use --json for machine-readable output");
}
