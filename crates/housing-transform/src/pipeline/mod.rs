//! Pipeline module.
//!
//! This module provides the column transformer, the builder that wires the
//! feature groups into it, and the driver that runs the whole sequence.

mod builder;
pub mod column_transformer;
mod transformation;

pub use builder::{PreprocessorBuilder, group_treatment};
pub use column_transformer::{
    ColumnGroup, ColumnTransformer, FeatureEncoding, FittedColumn, FittedColumnGroup,
    FittedColumnTransformer,
};
pub use transformation::{DataTransformation, load_csv, split_target};
