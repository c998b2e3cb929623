use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::Value;
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Strings compare by value and are never treated as collections
#[derive(Debug, Clone, Copy, Default)]
pub struct StringEqualityEquivalencyStep;

impl EquivalencyStep for StringEqualityEquivalencyStep {
    fn name(&self) -> &str {
        "string equality"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Str(_))
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let Value::Str(subject) = context.subject() else {
            return Ok(StepResult::Continue);
        };
        let Value::Str(expectation) = context.expectation() else {
            validator.scope().fail_with(
                "Expected {context:string} to be {0}{reason}, but found string {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        };

        if subject != expectation {
            let index = first_difference(subject, expectation);
            validator.scope().fail_with(
                "Expected {context:string} to be {0}{reason}, but {1} differs near index {2}.",
                &[
                    context.expectation().clone(),
                    context.subject().clone(),
                    Value::I64(i64::try_from(index).unwrap_or(i64::MAX)),
                ],
            );
        }
        Ok(StepResult::Handled)
    }
}

/// Character index of the first mismatch, or the shorter length
fn first_difference(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.chars().count().min(b.chars().count()))
}
