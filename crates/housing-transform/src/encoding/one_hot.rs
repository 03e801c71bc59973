//! One-hot encoding for categorical columns.
//!
//! Categories are the sorted distinct training values of a column. Each
//! category becomes one output feature named `{column}_{category}`.

use crate::config::UnknownCategoryPolicy;
use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unfitted one-hot encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// How to handle unknown categories during transform.
    pub handle_unknown: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// Learn the vocabulary of an imputed column.
    pub fn fit(&self, column: &str, values: &[String]) -> Result<FittedOneHotEncoder> {
        let categories: Vec<String> = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if categories.is_empty() {
            return Err(TransformError::InsufficientData(format!(
                "cannot fit one-hot encoder on empty column '{}'",
                column
            )));
        }

        Ok(FittedOneHotEncoder {
            column: column.to_string(),
            categories,
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Vocabulary learned for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    pub column: String,
    /// Sorted distinct training values.
    pub categories: Vec<String>,
    pub handle_unknown: UnknownCategoryPolicy,
}

impl FittedOneHotEncoder {
    pub fn n_features_out(&self) -> usize {
        self.categories.len()
    }

    /// Output feature names, one per category.
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }

    /// Encode values as rows of indicator columns.
    ///
    /// Returns one `Vec` per output feature (column-major), each as long as
    /// `values`.
    pub fn transform(&self, values: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut encoded = vec![vec![0.0; values.len()]; self.categories.len()];

        for (row, value) in values.iter().enumerate() {
            match self.categories.binary_search(value) {
                Ok(index) => encoded[index][row] = 1.0,
                Err(_) => match self.handle_unknown {
                    UnknownCategoryPolicy::Ignore => {}
                    UnknownCategoryPolicy::Error => {
                        return Err(TransformError::UnknownCategory {
                            column: self.column.clone(),
                            value: value.clone(),
                        });
                    }
                },
            }
        }

        Ok(encoded)
    }
}
