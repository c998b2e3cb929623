use crate::context::ValidationContext;
use crate::errors::Result;
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Last resort: leaf equality
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEqualityEquivalencyStep;

impl EquivalencyStep for SimpleEqualityEquivalencyStep {
    fn name(&self) -> &str {
        "simple equality"
    }

    fn can_handle(&self, _context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        true
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let equal = context.subject().leaf_equals(context.expectation());
        validator.scope().for_condition(equal).fail_with(
            "Expected {context:value} to be {0}{reason}, but found {1}.",
            &[context.expectation().clone(), context.subject().clone()],
        );
        Ok(StepResult::Handled)
    }
}
