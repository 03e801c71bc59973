//! Imputation module for handling missing values.
//!
//! Statistical imputation (median, mean, most frequent) fitted per column.

mod statistical;

pub use statistical::{
    FittedCategoricalImputer, FittedNumericImputer, ImputationStrategy, StatisticalImputer,
};
