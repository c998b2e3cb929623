use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::Value;
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Values that are themselves types compare by type name
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeEquivalencyStep;

impl EquivalencyStep for TypeEquivalencyStep {
    fn name(&self) -> &str {
        "type"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Type(_))
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let equal = match (context.subject(), context.expectation()) {
            (Value::Type(s), Value::Type(e)) => s.name() == e.name(),
            _ => false,
        };
        validator.scope().for_condition(equal).fail_with(
            "Expected {context:type} to be {0}{reason}, but found {1}.",
            &[context.expectation().clone(), context.subject().clone()],
        );
        Ok(StepResult::Handled)
    }
}
