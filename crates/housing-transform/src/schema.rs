//! Column groups of the housing dataset.
//!
//! Every feature column the preprocessor uses belongs to exactly one of
//! three groups, each with its own imputation and scaling treatment.

use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numeric columns with heavy tails; imputed with the median and robust-scaled.
pub const OUTLIER_PRONE_NUMERIC: [&str; 32] = [
    "MS_SubClass",
    "Lot_Frontage",
    "Lot_Area",
    "Overall_Qual",
    "Overall_Cond",
    "Year_Built",
    "Mas_Vnr_Area",
    "BsmtFin_SF_One",
    "BsmtFin_SF_Two",
    "Bsmt_Unf_SF",
    "Total_Bsmt_SF",
    "First_Flr_SF",
    "Second_Flr_SF",
    "Low_Qual_Fin_SF",
    "Gr_Liv_Area",
    "Bsmt_Full_Bath",
    "Bsmt_Half_Bath",
    "Full_Bath",
    "Bedroom_AbvGr",
    "Kitchen_AbvGr",
    "TotRms_AbvGrd",
    "Fireplaces",
    "Garage_Yr_Blt",
    "Garage_Cars",
    "Garage_Area",
    "Wood_Deck_SF",
    "Open_Porch_SF",
    "Enclosed_Porch",
    "Ssn_Porch",
    "Screen_Porch",
    "Pool_Area",
    "Misc_Val",
];

/// Numeric columns without notable outliers; imputed with the mean and standardized.
pub const OUTLIER_FREE_NUMERIC: [&str; 4] = ["Year_Remod", "Half_Bath", "Mo_Sold", "Yr_Sold"];

/// Categorical columns; imputed with the most frequent value and one-hot encoded.
///
/// `Conition_One` is spelled the way the dataset spells it.
pub const CATEGORICAL: [&str; 39] = [
    "MS_Zoning",
    "Street",
    "Lot_Shape",
    "Land_Contour",
    "Utilities",
    "Lot_Config",
    "Land_Slope",
    "Neighborhood",
    "Conition_One",
    "Condition_Two",
    "Bldg_Type",
    "House_Style",
    "Roof_Style",
    "Roof_Matl",
    "Exterior_First",
    "Exterior_Second",
    "Mas_Vnr_Type",
    "Exter_Qual",
    "Exter_Cond",
    "Foundation",
    "Bsmt_Qual",
    "Bsmt_Cond",
    "Bsmt_Exposure",
    "BsmtFin_Type_One",
    "BsmtFin_Type_Two",
    "Heating",
    "Heating_QC",
    "Central_Air",
    "Electrical",
    "Kitchen_Qual",
    "Functional",
    "Fireplace_Qu",
    "Garage_Type",
    "Garage_Finish",
    "Garage_Qual",
    "Garage_Cond",
    "Paved_Drive",
    "Sale_Type",
    "Sale_Condition",
];

/// The three disjoint feature groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    OutlierProneNumeric,
    OutlierFreeNumeric,
    Categorical,
}

impl GroupKind {
    /// Group name used as the prefix of output feature names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OutlierProneNumeric => "outlier_numeric",
            Self::OutlierFreeNumeric => "standard_numeric",
            Self::Categorical => "categorical",
        }
    }

    /// All groups, in output order.
    pub fn all() -> [GroupKind; 3] {
        [
            Self::OutlierProneNumeric,
            Self::OutlierFreeNumeric,
            Self::Categorical,
        ]
    }
}

/// Assignment of feature columns to groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub outlier_prone: Vec<String>,
    pub outlier_free: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::housing()
    }
}

impl FeatureSchema {
    /// Build a schema from custom column lists.
    pub fn new<S: Into<String>>(
        outlier_prone: impl IntoIterator<Item = S>,
        outlier_free: impl IntoIterator<Item = S>,
        categorical: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            outlier_prone: outlier_prone.into_iter().map(Into::into).collect(),
            outlier_free: outlier_free.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
        }
    }

    /// The housing dataset's column groups.
    pub fn housing() -> Self {
        Self::new(OUTLIER_PRONE_NUMERIC, OUTLIER_FREE_NUMERIC, CATEGORICAL)
    }

    /// Columns of one group.
    pub fn columns(&self, kind: GroupKind) -> &[String] {
        match kind {
            GroupKind::OutlierProneNumeric => &self.outlier_prone,
            GroupKind::OutlierFreeNumeric => &self.outlier_free,
            GroupKind::Categorical => &self.categorical,
        }
    }

    /// The group a column belongs to, if any.
    pub fn group_of(&self, column: &str) -> Option<GroupKind> {
        GroupKind::all()
            .into_iter()
            .find(|kind| self.columns(*kind).iter().any(|c| c == column))
    }

    /// All declared columns, in output order.
    pub fn all_columns(&self) -> impl Iterator<Item = &String> {
        self.outlier_prone
            .iter()
            .chain(self.outlier_free.iter())
            .chain(self.categorical.iter())
    }

    pub fn len(&self) -> usize {
        self.outlier_prone.len() + self.outlier_free.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that the groups are usable.
    ///
    /// Names must be non-empty and unique across all groups, and the target
    /// column must not be a feature.
    pub fn validate(&self, target_column: &str) -> Result<()> {
        if self.is_empty() {
            return Err(TransformError::InvalidSchema(
                "no feature columns declared".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.len());
        for kind in GroupKind::all() {
            for column in self.columns(kind) {
                if column.trim().is_empty() {
                    return Err(TransformError::InvalidSchema(format!(
                        "empty column name in group '{}'",
                        kind.name()
                    )));
                }
                if !seen.insert(column.as_str()) {
                    return Err(TransformError::InvalidSchema(format!(
                        "column '{}' is declared more than once",
                        column
                    )));
                }
            }
        }

        if seen.contains(target_column) {
            return Err(TransformError::InvalidSchema(format!(
                "target column '{}' is declared as a feature",
                target_column
            )));
        }

        Ok(())
    }
}
