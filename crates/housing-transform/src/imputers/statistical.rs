//! Statistical imputation methods.
//!
//! Provides median, mean and most-frequent fill values learned from
//! training data.

use crate::error::{Result, TransformError};
use crate::utils::{most_frequent, most_frequent_f64};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Statistic used to fill missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    Median,
    Mean,
    MostFrequent,
}

impl ImputationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
            Self::MostFrequent => "most_frequent",
        }
    }
}

/// Unfitted imputer for one column at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticalImputer {
    pub strategy: ImputationStrategy,
}

impl StatisticalImputer {
    pub fn new(strategy: ImputationStrategy) -> Self {
        Self { strategy }
    }

    /// Learn the fill value of a numeric column.
    ///
    /// Returns `None` when every value is missing; such a column has no
    /// fill value and is left out of the transformed output.
    ///
    /// [`ImputationStrategy::MostFrequent`] is never chosen for the housing
    /// numeric groups but is available to custom [`ColumnGroup`]s.
    ///
    /// [`ColumnGroup`]: crate::pipeline::ColumnGroup
    pub fn fit_numeric(&self, column: &str, values: &[Option<f64>]) -> Option<FittedNumericImputer> {
        let series = Series::new(column.into(), values);

        let fill_value = match self.strategy {
            ImputationStrategy::Median => series.median(),
            ImputationStrategy::Mean => series.mean(),
            ImputationStrategy::MostFrequent => {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                most_frequent_f64(&present)
            }
        }?;

        Some(FittedNumericImputer {
            column: column.to_string(),
            strategy: self.strategy,
            fill_value,
        })
    }

    /// Learn the fill value of a categorical column.
    ///
    /// Only [`ImputationStrategy::MostFrequent`] applies to text values.
    pub fn fit_categorical(
        &self,
        column: &str,
        values: &[Option<String>],
    ) -> Result<Option<FittedCategoricalImputer>> {
        if self.strategy != ImputationStrategy::MostFrequent {
            return Err(TransformError::InvalidConfig(format!(
                "'{}' imputation cannot be applied to categorical column '{}'",
                self.strategy.as_str(),
                column
            )));
        }

        Ok(
            most_frequent(values.iter().flatten().cloned()).map(|fill_value| {
                FittedCategoricalImputer {
                    column: column.to_string(),
                    fill_value,
                }
            }),
        )
    }
}

/// Fill value learned for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNumericImputer {
    pub column: String,
    pub strategy: ImputationStrategy,
    pub fill_value: f64,
}

impl FittedNumericImputer {
    pub fn transform(&self, values: &[Option<f64>]) -> Vec<f64> {
        values.iter().map(|v| v.unwrap_or(self.fill_value)).collect()
    }
}

/// Fill value learned for a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedCategoricalImputer {
    pub column: String,
    pub fill_value: String,
}

impl FittedCategoricalImputer {
    pub fn transform(&self, values: &[Option<String>]) -> Vec<String> {
        values
            .iter()
            .map(|v| v.clone().unwrap_or_else(|| self.fill_value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let imputer = StatisticalImputer::new(ImputationStrategy::Median);
        let values = [Some(1.0), None, Some(10.0), Some(2.0), Some(3.0)];
        let fitted = imputer.fit_numeric("Lot_Area", &values).unwrap();
        assert_eq!(fitted.fill_value, 2.5);
        assert_eq!(fitted.transform(&values), vec![1.0, 2.5, 10.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mean_imputation() {
        let imputer = StatisticalImputer::new(ImputationStrategy::Mean);
        let fitted = imputer
            .fit_numeric("Mo_Sold", &[Some(2.0), None, Some(4.0)])
            .unwrap();
        assert_eq!(fitted.fill_value, 3.0);
        assert_eq!(fitted.transform(&[None]), vec![3.0]);
    }

    #[test]
    fn test_most_frequent_numeric_imputation() {
        let imputer = StatisticalImputer::new(ImputationStrategy::MostFrequent);
        let values = [Some(3.0), None, Some(1.0), Some(3.0), Some(1.0)];
        let fitted = imputer.fit_numeric("Garage_Cars", &values).unwrap();
        assert_eq!(fitted.fill_value, 1.0);
        assert_eq!(fitted.transform(&values)[1], 1.0);
    }

    #[test]
    fn test_all_missing_column_has_no_fill_value() {
        let imputer = StatisticalImputer::new(ImputationStrategy::Median);
        assert!(imputer.fit_numeric("Pool_Area", &[None, None]).is_none());

        let imputer = StatisticalImputer::new(ImputationStrategy::MostFrequent);
        assert!(imputer.fit_categorical("Street", &[None]).unwrap().is_none());
    }

    #[test]
    fn test_most_frequent_categorical() {
        let imputer = StatisticalImputer::new(ImputationStrategy::MostFrequent);
        let values = vec![
            Some("Pave".to_string()),
            None,
            Some("Grvl".to_string()),
            Some("Pave".to_string()),
        ];
        let fitted = imputer.fit_categorical("Street", &values).unwrap().unwrap();
        assert_eq!(fitted.fill_value, "Pave");
        assert_eq!(fitted.transform(&values)[1], "Pave");
    }

    #[test]
    fn test_numeric_strategy_rejected_for_categorical() {
        let imputer = StatisticalImputer::new(ImputationStrategy::Mean);
        let err = imputer
            .fit_categorical("Street", &[Some("Pave".to_string())])
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidConfig(_)));
    }
}
