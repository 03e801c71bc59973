//! Robust scaling.
//!
//! Centers a column on its median and divides by the interquartile range:
//!
//! ```text
//! x_scaled = (x - median) / (Q3 - Q1)
//! ```
//!
//! Quartiles use linear interpolation between closest ranks. A zero range
//! is replaced by 1 so constant columns are only centered.

use super::handle_zero_scale;
use crate::error::{Result, TransformError};
use crate::utils::{percentile, sorted_copy};
use serde::{Deserialize, Serialize};

/// Unfitted robust scaler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    /// Quantile range for the scale (default: (25.0, 75.0)).
    pub quantile_range: (f64, f64),
}

impl Default for RobustScaler {
    fn default() -> Self {
        Self {
            quantile_range: (25.0, 75.0),
        }
    }
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn center and scale from imputed training values.
    pub fn fit(&self, column: &str, values: &[f64]) -> Result<FittedRobustScaler> {
        if values.is_empty() {
            return Err(TransformError::InsufficientData(format!(
                "cannot fit robust scaler on empty column '{}'",
                column
            )));
        }

        let sorted = sorted_copy(values);
        let (q_low, q_high) = self.quantile_range;
        // sorted is non-empty, so every percentile exists
        let center = percentile(&sorted, 50.0).unwrap_or_default();
        let low = percentile(&sorted, q_low).unwrap_or_default();
        let high = percentile(&sorted, q_high).unwrap_or_default();

        let scale = handle_zero_scale(high - low, low.abs().max(high.abs()));

        Ok(FittedRobustScaler { center, scale })
    }
}

/// Median and interquartile range learned for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedRobustScaler {
    pub center: f64,
    pub scale: f64,
}

impl FittedRobustScaler {
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.center) / self.scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robust_scaler_median_and_iqr() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let fitted = RobustScaler::new().fit("Lot_Area", &values).unwrap();
        assert_eq!(fitted.center, 3.0);
        assert_eq!(fitted.scale, 2.0);
        assert_eq!(fitted.transform(&values), vec![-1.0, -0.5, 0.0, 0.5, 48.5]);
    }

    #[test]
    fn test_robust_scaler_constant_column() {
        let fitted = RobustScaler::new().fit("Pool_Area", &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(fitted.center, 0.0);
        assert_eq!(fitted.scale, 1.0);
        assert_eq!(fitted.transform(&[5.0]), vec![5.0]);
    }

    #[test]
    fn test_robust_scaler_inexact_constant_column() {
        let values = [0.1, 0.1, 0.1];
        let fitted = RobustScaler::new().fit("Lot_Frontage", &values).unwrap();
        assert_eq!(fitted.scale, 1.0);
        assert_eq!(fitted.transform(&values), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_robust_scaler_empty_column() {
        assert!(RobustScaler::new().fit("Lot_Area", &[]).is_err());
    }
}
