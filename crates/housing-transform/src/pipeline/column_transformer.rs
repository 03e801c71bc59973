//! Column-wise transformer.
//!
//! Routes each declared column group through its own imputer and
//! scaler or encoder, and concatenates the results into one dense matrix.
//! Output features are named `{group}__{feature}` and appear in group
//! order, then column order within a group.

use crate::config::{RemainderPolicy, UnknownCategoryPolicy};
use crate::encoding::{FittedOneHotEncoder, OneHotEncoder};
use crate::error::{Result, TransformError};
use crate::imputers::{
    FittedCategoricalImputer, FittedNumericImputer, ImputationStrategy, StatisticalImputer,
};
use crate::scaling::{FittedScaler, RobustScaler, StandardScaler};
use crate::types::FeatureMatrix;
use crate::utils::{is_numeric_dtype, numeric_values, string_values};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Scaling or encoding applied after imputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureEncoding {
    RobustScale,
    StandardScale,
    OneHot,
}

impl FeatureEncoding {
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::OneHot)
    }

    /// Fit the numeric scaler for this encoding on imputed values.
    pub fn fit_scaler(&self, column: &str, values: &[f64]) -> Result<FittedScaler> {
        match self {
            Self::RobustScale => Ok(FittedScaler::Robust(RobustScaler::new().fit(column, values)?)),
            Self::StandardScale => Ok(FittedScaler::Standard(
                StandardScaler::new().fit(column, values)?,
            )),
            Self::OneHot => Err(TransformError::InvalidConfig(format!(
                "one-hot encoding has no numeric scaler (column '{}')",
                column
            ))),
        }
    }
}

/// A named set of columns sharing one imputation and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub name: String,
    pub columns: Vec<String>,
    pub imputer: StatisticalImputer,
    pub encoding: FeatureEncoding,
}

impl ColumnGroup {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        imputation: ImputationStrategy,
        encoding: FeatureEncoding,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            imputer: StatisticalImputer::new(imputation),
            encoding,
        }
    }
}

/// Unfitted column transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub groups: Vec<ColumnGroup>,
    pub remainder: RemainderPolicy,
    pub handle_unknown: UnknownCategoryPolicy,
}

impl ColumnTransformer {
    pub fn new(groups: Vec<ColumnGroup>) -> Self {
        Self {
            groups,
            remainder: RemainderPolicy::default(),
            handle_unknown: UnknownCategoryPolicy::default(),
        }
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    pub fn with_handle_unknown(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// All declared columns, in output order.
    pub fn declared_columns(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.columns.iter().map(String::as_str))
            .collect()
    }

    /// Learn every column's statistics from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedColumnTransformer> {
        if df.height() == 0 {
            return Err(TransformError::InsufficientData(
                "cannot fit preprocessor on an empty frame".to_string(),
            ));
        }
        check_columns(df, &self.declared_columns(), self.remainder)?;

        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut columns = Vec::with_capacity(group.columns.len());
            for name in &group.columns {
                let series = df.column(name)?.as_materialized_series();
                let fitted = self.fit_column(group, name, series)?;
                if let FittedColumn::Dropped { .. } = fitted {
                    warn!(
                        "Column '{}' in group '{}' has no observed values; dropping it",
                        name, group.name
                    );
                }
                columns.push(fitted);
            }
            groups.push(FittedColumnGroup {
                name: group.name.clone(),
                columns,
            });
        }

        let fitted = FittedColumnTransformer {
            groups,
            feature_names_in: df
                .get_column_names()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            remainder: self.remainder,
            n_samples_seen: df.height(),
            fitted_at: Utc::now(),
        };
        debug!(
            "Fitted column transformer: {} input columns -> {} features",
            fitted.feature_names_in.len(),
            fitted.n_features_out()
        );
        Ok(fitted)
    }

    /// Fit on `df` and transform it.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedColumnTransformer, FeatureMatrix)> {
        let fitted = self.fit(df)?;
        let transformed = fitted.transform(df)?;
        Ok((fitted, transformed))
    }

    fn fit_column(&self, group: &ColumnGroup, name: &str, series: &Series) -> Result<FittedColumn> {
        let dropped = FittedColumn::Dropped {
            column: name.to_string(),
        };

        if group.encoding.is_categorical() {
            let values = string_values(series)?;
            let Some(imputer) = group.imputer.fit_categorical(name, &values)? else {
                return Ok(dropped);
            };
            let encoder = OneHotEncoder::new()
                .with_handle_unknown(self.handle_unknown)
                .fit(name, &imputer.transform(&values))?;
            return Ok(FittedColumn::Categorical {
                column: name.to_string(),
                imputer,
                encoder,
            });
        }

        if !is_numeric_dtype(series.dtype()) {
            debug!(
                "Column '{}' has dtype {}; unparseable values are treated as missing",
                name,
                series.dtype()
            );
        }
        let values = numeric_values(series)?;
        let Some(imputer) = group.imputer.fit_numeric(name, &values) else {
            return Ok(dropped);
        };
        let imputed = imputer.transform(&values);
        let scaler = group.encoding.fit_scaler(name, &imputed)?;
        Ok(FittedColumn::Numeric {
            column: name.to_string(),
            imputer,
            scaler,
        })
    }
}

/// Verify declared columns exist and apply the remainder policy.
fn check_columns(df: &DataFrame, declared: &[&str], remainder: RemainderPolicy) -> Result<()> {
    let present: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.as_str())
        .collect();

    let missing: Vec<String> = declared
        .iter()
        .filter(|c| !present.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::MissingColumns(missing));
    }

    let declared: HashSet<&str> = declared.iter().copied().collect();
    let unassigned: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.as_str())
        .filter(|c| !declared.contains(c))
        .map(str::to_string)
        .collect();
    if !unassigned.is_empty() {
        match remainder {
            RemainderPolicy::Drop => {
                debug!("Dropping unassigned columns: {}", unassigned.join(", "));
            }
            RemainderPolicy::Error => return Err(TransformError::UnassignedColumns(unassigned)),
        }
    }

    Ok(())
}

/// Fitted state of one input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FittedColumn {
    Numeric {
        column: String,
        imputer: FittedNumericImputer,
        scaler: FittedScaler,
    },
    Categorical {
        column: String,
        imputer: FittedCategoricalImputer,
        encoder: FittedOneHotEncoder,
    },
    /// Entirely missing during fit; contributes no output features.
    Dropped { column: String },
}

impl FittedColumn {
    pub fn column(&self) -> &str {
        match self {
            Self::Numeric { column, .. }
            | Self::Categorical { column, .. }
            | Self::Dropped { column } => column,
        }
    }

    /// Output feature names before the group prefix.
    pub fn feature_names(&self) -> Vec<String> {
        match self {
            Self::Numeric { column, .. } => vec![column.clone()],
            Self::Categorical { encoder, .. } => encoder.feature_names(),
            Self::Dropped { .. } => Vec::new(),
        }
    }

    /// Transform one column into its output features (column-major).
    fn transform(&self, series: &Series) -> Result<Vec<Vec<f64>>> {
        match self {
            Self::Numeric {
                imputer, scaler, ..
            } => {
                let imputed = imputer.transform(&numeric_values(series)?);
                Ok(vec![scaler.transform(&imputed)])
            }
            Self::Categorical {
                imputer, encoder, ..
            } => {
                let imputed = imputer.transform(&string_values(series)?);
                encoder.transform(&imputed)
            }
            Self::Dropped { .. } => Ok(Vec::new()),
        }
    }
}

/// Fitted columns of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnGroup {
    pub name: String,
    pub columns: Vec<FittedColumn>,
}

/// Column transformer learned from training features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    pub groups: Vec<FittedColumnGroup>,
    /// Columns of the frame seen during fit, remainder included.
    pub feature_names_in: Vec<String>,
    pub remainder: RemainderPolicy,
    pub n_samples_seen: usize,
    pub fitted_at: DateTime<Utc>,
}

static_assertions::assert_impl_all!(FittedColumnTransformer: Send, Sync);

impl FittedColumnTransformer {
    /// Output feature names, `{group}__{feature}`.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.columns.iter().flat_map(move |column| {
                    column
                        .feature_names()
                        .into_iter()
                        .map(move |feature| format!("{}__{}", group.name, feature))
                })
            })
            .collect()
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names_out().len()
    }

    /// Declared columns, in output order.
    pub fn declared_columns(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.columns.iter().map(FittedColumn::column))
            .collect()
    }

    /// Apply the fitted statistics to `df`. Never refits.
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        check_columns(df, &self.declared_columns(), self.remainder)?;

        let mut outputs: Vec<Vec<f64>> = Vec::new();
        for group in &self.groups {
            for column in &group.columns {
                let series = df.column(column.column())?.as_materialized_series();
                outputs.extend(column.transform(series)?);
            }
        }

        let mut values = Array2::<f64>::zeros((df.height(), outputs.len()));
        for (j, output) in outputs.into_iter().enumerate() {
            values.column_mut(j).assign(&Array1::from(output));
        }

        Ok(FeatureMatrix::new(self.feature_names_out(), values))
    }
}
