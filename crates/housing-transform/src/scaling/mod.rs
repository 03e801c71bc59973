//! Scaling for numeric columns.

mod robust;
mod standard;

pub use robust::{FittedRobustScaler, RobustScaler};
pub use standard::{FittedStandardScaler, StandardScaler};

use serde::{Deserialize, Serialize};

/// A fitted scaler of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    Robust(FittedRobustScaler),
    Standard(FittedStandardScaler),
}

/// Scale used for a column whose spread is zero up to rounding.
///
/// A spread at or below a few ULPs of `magnitude` is treated as a
/// constant column and replaced by 1.
pub(crate) fn handle_zero_scale(scale: f64, magnitude: f64) -> f64 {
    if scale <= 10.0 * f64::EPSILON * magnitude.abs().max(1.0) {
        1.0
    } else {
        scale
    }
}

impl FittedScaler {
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Self::Robust(scaler) => scaler.transform(values),
            Self::Standard(scaler) => scaler.transform(values),
        }
    }
}
