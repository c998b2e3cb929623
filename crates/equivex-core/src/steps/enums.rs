use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::Value;
use crate::options::{EnumEquivalenceHandling, EquivalencyOptions};
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Enums compare by numeric value or by variant name
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumEqualityStep;

impl EquivalencyStep for EnumEqualityStep {
    fn name(&self) -> &str {
        "enum equality"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Enum(_))
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let Value::Enum(subject) = context.subject() else {
            return Ok(StepResult::Continue);
        };
        let expectation = context.expectation();

        let equal = match options.enum_equivalence() {
            EnumEquivalenceHandling::ByValue => expectation.as_i64() == Some(subject.value),
            EnumEquivalenceHandling::ByName => match expectation {
                Value::Enum(e) => e.display_name() == subject.display_name(),
                Value::Str(s) => s.as_ref() == subject.display_name(),
                _ => false,
            },
        };

        validator.scope().for_condition(equal).fail_with(
            "Expected {context:enum} to be equivalent to {0}{reason}, but found {1}.",
            &[expectation.clone(), context.subject().clone()],
        );
        Ok(StepResult::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumValue, TypeDescriptor};
    use crate::scope::Reason;

    fn compare(subject: Value, expectation: Value, options: &EquivalencyOptions) -> usize {
        let root = ValidationContext::root(subject, expectation, Reason::none());
        let mut validator = EquivalencyValidator::new(options);
        validator.assert_equality_using(&root).unwrap();
        validator.failures().len()
    }

    #[test]
    fn test_by_value_ignores_names_and_by_name_ignores_values() {
        let color = TypeDescriptor::enumeration("Color", &[("Red", 0), ("Blue", 1)]);
        let shade = TypeDescriptor::enumeration("Shade", &[("Dark", 0), ("Red", 5)]);

        let red = Value::Enum(EnumValue::new(&color, 0));
        let dark = Value::Enum(EnumValue::new(&shade, 0));
        let shade_red = Value::Enum(EnumValue::new(&shade, 5));

        let by_value = EquivalencyOptions::default();
        let by_name = EquivalencyOptions::default().comparing_enums_by_name();

        assert_eq!(compare(red.clone(), dark.clone(), &by_value), 0);
        assert_eq!(compare(red.clone(), dark, &by_name), 1);
        assert_eq!(compare(red.clone(), shade_red.clone(), &by_value), 1);
        assert_eq!(compare(red, shade_red, &by_name), 0);
    }

    #[test]
    fn test_by_name_accepts_string_expectation() {
        let color = TypeDescriptor::enumeration("Color", &[("Red", 0)]);
        let options = EquivalencyOptions::default().comparing_enums_by_name();
        assert_eq!(
            compare(Value::Enum(EnumValue::new(&color, 0)), Value::str("Red"), &options),
            0
        );
    }
}
