use crate::context::ValidationContext;
use crate::errors::Result;
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Settles identical references and null on either side
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceEqualityStep;

impl EquivalencyStep for ReferenceEqualityStep {
    fn name(&self) -> &str {
        "reference equality"
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
        let (subject, expectation) = (context.subject(), context.expectation());

        match (subject.is_null(), expectation.is_null()) {
            (true, true) => return Ok(StepResult::Handled),
            (false, true) => {
                validator.scope().fail_with(
                    "Expected {context:subject} to be <null>{reason}, but found {0}.",
                    &[subject.clone()],
                );
                return Ok(StepResult::Handled);
            }
            (true, false) => {
                validator.scope().fail_with(
                    "Expected {context:subject} to be {0}{reason}, but found <null>.",
                    &[expectation.clone()],
                );
                return Ok(StepResult::Handled);
            }
            (false, false) => {}
        }

        match (subject.identity(), expectation.identity()) {
            (Some(a), Some(b)) if a == b => Ok(StepResult::Handled),
            _ => Ok(StepResult::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sequence, Value};
    use crate::scope::Reason;

    fn run(subject: Value, expectation: Value) -> (StepResult, usize) {
        let options = EquivalencyOptions::default();
        let mut validator = EquivalencyValidator::new(&options);
        let ctx = ValidationContext::root(subject, expectation, Reason::none());
        let result = ReferenceEqualityStep
            .handle(&ctx, &mut validator, &options)
            .unwrap();
        (result, validator.failures().len())
    }

    #[test]
    fn test_same_reference_is_handled() {
        let seq = Value::from(Sequence::of(vec![Value::I32(1)]));
        let (result, failures) = run(seq.clone(), seq);
        assert!(matches!(result, StepResult::Handled));
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_null_mismatch_fails() {
        let (result, failures) = run(Value::I32(1), Value::Null);
        assert!(matches!(result, StepResult::Handled));
        assert_eq!(failures, 1);

        let (_, failures) = run(Value::Null, Value::I32(1));
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_distinct_values_continue() {
        let (result, _) = run(Value::I32(1), Value::I32(2));
        assert!(matches!(result, StepResult::Continue));
    }
}
