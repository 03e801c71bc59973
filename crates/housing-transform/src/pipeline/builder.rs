//! Preprocessor construction.
//!
//! Wires the three feature groups of a [`FeatureSchema`] into a
//! [`ColumnTransformer`]:
//!
//! | Group | Imputation | Scaling / encoding |
//! |---|---|---|
//! | outlier-prone numeric | median | robust |
//! | outlier-free numeric | mean | standard |
//! | categorical | most frequent | one-hot |

use crate::config::{RemainderPolicy, TransformationConfig, UnknownCategoryPolicy};
use crate::error::Result;
use crate::imputers::ImputationStrategy;
use crate::pipeline::column_transformer::{ColumnGroup, ColumnTransformer, FeatureEncoding};
use crate::schema::{FeatureSchema, GroupKind};
use tracing::debug;

/// Builder for the unfitted preprocessor.
///
/// # Example
///
/// ```rust,ignore
/// use housing_transform::pipeline::PreprocessorBuilder;
///
/// let preprocessor = PreprocessorBuilder::default()
///     .remainder(RemainderPolicy::Error)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct PreprocessorBuilder {
    schema: FeatureSchema,
    target_column: String,
    remainder: RemainderPolicy,
    handle_unknown: UnknownCategoryPolicy,
}

static_assertions::assert_impl_all!(PreprocessorBuilder: Send);

impl Default for PreprocessorBuilder {
    fn default() -> Self {
        Self::from_config(&TransformationConfig::default())
    }
}

impl PreprocessorBuilder {
    /// Start from the policies of a configuration and the housing schema.
    pub fn from_config(config: &TransformationConfig) -> Self {
        Self {
            schema: FeatureSchema::housing(),
            target_column: config.target_column.clone(),
            remainder: config.remainder,
            handle_unknown: config.handle_unknown,
        }
    }

    /// Use custom column groups.
    pub fn schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the target column, which must not appear in any group.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn remainder(mut self, policy: RemainderPolicy) -> Self {
        self.remainder = policy;
        self
    }

    pub fn handle_unknown(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// Validate the schema and assemble the column transformer.
    pub fn build(self) -> Result<ColumnTransformer> {
        self.schema.validate(&self.target_column)?;

        let groups: Vec<ColumnGroup> = GroupKind::all()
            .into_iter()
            .filter(|kind| !self.schema.columns(*kind).is_empty())
            .map(|kind| {
                let (imputation, encoding) = group_treatment(kind);
                ColumnGroup::new(
                    kind.name(),
                    self.schema.columns(kind).to_vec(),
                    imputation,
                    encoding,
                )
            })
            .collect();

        for group in &groups {
            debug!(
                "Group '{}': {} columns, {} imputation, {:?}",
                group.name,
                group.columns.len(),
                group.imputer.strategy.as_str(),
                group.encoding
            );
        }

        Ok(ColumnTransformer::new(groups)
            .with_remainder(self.remainder)
            .with_handle_unknown(self.handle_unknown))
    }
}

/// Imputation and encoding of a feature group.
pub fn group_treatment(kind: GroupKind) -> (ImputationStrategy, FeatureEncoding) {
    match kind {
        GroupKind::OutlierProneNumeric => (ImputationStrategy::Median, FeatureEncoding::RobustScale),
        GroupKind::OutlierFreeNumeric => (ImputationStrategy::Mean, FeatureEncoding::StandardScale),
        GroupKind::Categorical => (ImputationStrategy::MostFrequent, FeatureEncoding::OneHot),
    }
}
