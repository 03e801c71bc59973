//! Standard scaling: `(x - mean) / std` with the population standard deviation.

use super::handle_zero_scale;
use crate::error::{Result, TransformError};
use crate::utils::{mean, population_std};
use serde::{Deserialize, Serialize};

/// Unfitted standard scaler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }

    /// Learn mean and standard deviation from imputed training values.
    ///
    /// A zero standard deviation is replaced by 1, and a constant column
    /// is centered on its exact value.
    pub fn fit(&self, column: &str, values: &[f64]) -> Result<FittedStandardScaler> {
        let mean = mean(values).ok_or_else(|| {
            TransformError::InsufficientData(format!(
                "cannot fit standard scaler on empty column '{}'",
                column
            ))
        })?;
        let mean = match values.first() {
            Some(&first) if values.iter().all(|&v| v == first) => first,
            _ => mean,
        };
        let scale = handle_zero_scale(population_std(values, mean), mean);

        Ok(FittedStandardScaler { mean, scale })
    }
}

/// Mean and standard deviation learned for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl FittedStandardScaler {
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.mean) / self.scale).collect()
    }
}
