//! Operator contract and registry
//!
//! An operator maps each translation unit to zero or more units: none filters
//! the unit out, one rewrites it, several augment the corpus. Operators are
//! registered under a unique name with a configuration schema, a process-mode
//! gate and a constructor, and the pipeline instantiates them from its
//! configuration through [`find_operator`].

use serde_json::Value;

use crate::error::{PrepError, PrepResult};
use crate::noise::NoiseOperator;
use crate::pipeline::PipelineState;
use crate::process::ProcessType;
use crate::schema::Schema;
use crate::tokenization::TokenizationOperator;
use crate::unit::TranslationUnit;

/// A configured processing step
pub trait Operator {
    /// Registered name of the operator
    fn name(&self) -> &str;

    /// Process a single unit. The returned units replace it in the batch.
    fn process_unit(
        &self,
        tu: TranslationUnit,
        state: &mut PipelineState,
    ) -> PrepResult<Vec<TranslationUnit>>;

    /// Process a batch. Results keep the order of their input units.
    fn process(
        &self,
        batch: Vec<TranslationUnit>,
        state: &mut PipelineState,
    ) -> PrepResult<Vec<TranslationUnit>> {
        let mut output = Vec::with_capacity(batch.len());
        for tu in batch {
            output.extend(self.process_unit(tu, state)?);
        }
        Ok(output)
    }
}

/// Arguments available to operator constructors besides their own block
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub process_type: ProcessType,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

/// Registration entry of an operator
pub struct OperatorDescriptor {
    pub name: &'static str,
    /// Operator-specific schema fragment, merged with [`Schema::operator_base`]
    pub schema: fn() -> Schema,
    pub is_applied_for: fn(ProcessType) -> bool,
    pub build: fn(&Value, &BuildContext) -> PrepResult<Box<dyn Operator>>,
}

impl OperatorDescriptor {
    /// Full schema of a configuration block for this operator
    pub fn config_schema(&self) -> Schema {
        Schema::operator_base().merge((self.schema)())
    }
}

impl std::fmt::Debug for OperatorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

static REGISTRY: &[OperatorDescriptor] = &[
    OperatorDescriptor {
        name: TokenizationOperator::NAME,
        schema: TokenizationOperator::config_schema,
        is_applied_for: TokenizationOperator::is_applied_for,
        build: TokenizationOperator::build,
    },
    OperatorDescriptor {
        name: NoiseOperator::NAME,
        schema: NoiseOperator::config_schema,
        is_applied_for: NoiseOperator::is_applied_for,
        build: NoiseOperator::build,
    },
];

/// All registered operators
pub fn registered_operators() -> &'static [OperatorDescriptor] {
    REGISTRY
}

pub fn find_operator(name: &str) -> PrepResult<&'static OperatorDescriptor> {
    REGISTRY
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or_else(|| PrepError::UnknownOperator(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_names_are_unique() {
        let names: std::collections::HashSet<_> =
            registered_operators().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), registered_operators().len());
    }

    #[test]
    fn test_find_operator() {
        assert_eq!(find_operator("noise").unwrap().name, "noise");
        assert_eq!(find_operator("tokenization").unwrap().name, "tokenization");
        assert!(matches!(
            find_operator("length_filter"),
            Err(PrepError::UnknownOperator(name)) if name == "length_filter"
        ));
    }

    #[test]
    fn test_noise_applies_to_training_only() {
        let noise = find_operator("noise").unwrap();
        assert!((noise.is_applied_for)(ProcessType::Training));
        assert!(!(noise.is_applied_for)(ProcessType::Inference));

        let tokenization = find_operator("tokenization").unwrap();
        assert!((tokenization.is_applied_for)(ProcessType::Inference));
    }

    #[test]
    fn test_config_schema_includes_base() {
        let schema = find_operator("noise").unwrap().config_schema();
        assert!(
            schema
                .validate(&serde_json::json!({"op": "noise", "verbose": true}))
                .is_ok()
        );
    }
}
