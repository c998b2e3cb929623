use std::collections::BTreeSet;

use crate::collection::assert_collection_equivalence;
use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::{builtin, TypeRef};
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Sequences and one-dimensional arrays, compared item by item
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerableEquivalencyStep;

impl EquivalencyStep for EnumerableEquivalencyStep {
    fn name(&self) -> &str {
        "enumerable"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        context.subject().items().is_some()
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let item_types = context.runtime_type().enumerable_item_types();
        let distinct: BTreeSet<&str> = item_types.iter().map(|t| t.name()).collect();
        if distinct.len() > 1 {
            validator.scope().as_configuration_error().fail_with(
                "{context:Subject} is enumerable for more than one type ({0}). It is not known which type should be used for equivalence{reason}.",
                &[crate::model::Value::str(&distinct.into_iter().collect::<Vec<_>>().join(", "))],
            );
            return Ok(StepResult::Handled);
        }
        let item_type: TypeRef = item_types
            .first()
            .map(|t| (*t).clone())
            .unwrap_or_else(builtin::object);

        let Some(subject) = context.subject().items() else {
            return Ok(StepResult::Continue);
        };
        let Some(expectation) = context.expectation().items() else {
            validator.scope().fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        };

        assert_collection_equivalence(validator, context, &subject, &expectation, &item_type)?;
        Ok(StepResult::Handled)
    }
}
