use crate::context::ValidationContext;
use crate::errors::Result;
use crate::options::{AssertionAction, EquivalencyOptions};
use crate::rules::PositionPredicate;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Caller-registered replacement comparison for matching positions
pub struct RuleBasedStep {
    name: String,
    predicate: PositionPredicate,
    action: AssertionAction,
}

impl RuleBasedStep {
    pub fn new(description: &str, predicate: PositionPredicate, action: AssertionAction) -> Self {
        Self {
            name: format!("override: {description}"),
            predicate,
            action,
        }
    }
}

impl EquivalencyStep for RuleBasedStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        (self.predicate)(&context.position())
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        (self.action)(context, validator.scope());
        Ok(StepResult::Handled)
    }
}
