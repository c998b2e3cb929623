use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::{Array, TypeKind, Value};
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Arrays of rank two or more: shapes must match exactly, then every index
/// tuple is compared as an item keyed `i,j,...`
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiDimensionalArrayEquivalencyStep;

impl EquivalencyStep for MultiDimensionalArrayEquivalencyStep {
    fn name(&self) -> &str {
        "multi-dimensional array"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Array(a) if a.rank() > 1)
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let Value::Array(subject) = context.subject() else {
            return Ok(StepResult::Continue);
        };
        let Value::Array(expectation) = context.expectation() else {
            validator.scope().fail_with(
                "Expected {context:array} to be {0}{reason}, but found a multi-dimensional array {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        };

        if !shapes_match(validator, subject, expectation) {
            return Ok(StepResult::Handled);
        }

        let item_type = match subject.type_ref().kind() {
            TypeKind::Array { element, .. } => element.clone(),
            _ => crate::model::builtin::object(),
        };

        let lengths = subject.lengths();
        let mut indices = vec![0usize; lengths.len()];
        for (s, e) in subject.items().iter().zip(expectation.items()) {
            let key = indices
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let item = context.for_collection_item(&key, s.clone(), e.clone(), &item_type);
            validator.assert_equality_using(&item)?;
            advance(&mut indices, lengths);
        }

        Ok(StepResult::Handled)
    }
}

/// Report a rank mismatch, or every mismatched dimension
fn shapes_match(validator: &mut EquivalencyValidator<'_>, subject: &Array, expectation: &Array) -> bool {
    if subject.rank() != expectation.rank() {
        validator.scope().fail_with(
            "Expected {context:array} to have {0} dimension(s){reason}, but it has {1}.",
            &[count(expectation.rank()), count(subject.rank())],
        );
        return false;
    }

    let mut matched = true;
    for (dimension, (s, e)) in subject.lengths().iter().zip(expectation.lengths()).enumerate() {
        if s != e {
            validator.scope().fail_with(
                "Expected dimension {0} of {context:array} to contain {1} item(s){reason}, but found {2}.",
                &[count(dimension), count(*e), count(*s)],
            );
            matched = false;
        }
    }
    matched
}

/// Mixed-radix increment, last dimension fastest
fn advance(indices: &mut [usize], lengths: &[usize]) {
    for d in (0..indices.len()).rev() {
        indices[d] += 1;
        if indices[d] < lengths[d] {
            return;
        }
        indices[d] = 0;
    }
}

fn count(n: usize) -> Value {
    Value::I64(i64::try_from(n).unwrap_or(i64::MAX))
}
