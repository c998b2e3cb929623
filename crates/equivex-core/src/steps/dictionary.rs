use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::{Map, TypeRef, Value};
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Dictionaries: key sets must agree and values are compared per key
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryEquivalencyStep;

impl EquivalencyStep for DictionaryEquivalencyStep {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Map(_))
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let Value::Map(subject) = context.subject() else {
            return Ok(StepResult::Continue);
        };

        let interfaces = subject.type_ref().dictionary_interfaces();
        let (key_type, value_type) = match interfaces.as_slice() {
            [(key, value)] => ((*key).clone(), (*value).clone()),
            [] => {
                validator.scope().as_configuration_error().fail_with(
                    "{context:Subject} of type {0} is a map but declares no dictionary interface{reason}.",
                    &[Value::Type(subject.type_ref().clone())],
                );
                return Ok(StepResult::Handled);
            }
            _ => {
                validator.scope().as_configuration_error().fail_with(
                    "{context:Subject} implements multiple dictionary types. It is not known which type should be used for equivalence{reason}.",
                    &[],
                );
                return Ok(StepResult::Handled);
            }
        };

        let Value::Map(expectation) = context.expectation() else {
            validator.scope().fail_with(
                "Expected {context:subject} to be {0}{reason}, but found dictionary {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        };

        if !has_compatible_interface(validator, &key_type, expectation) {
            return Ok(StepResult::Handled);
        }

        let recursive = context.is_root() || options.is_recursive();
        for (key, subject_value) in subject.entries() {
            let Some(expectation_value) = lookup(expectation, &key) else {
                validator.scope().fail_with(
                    "Expected {context:dictionary} not to contain key {0}{reason}, but the expectation does not have it.",
                    &[key.clone()],
                );
                continue;
            };

            let label = key_label(validator, &key);
            let pair = context.for_dictionary_item(&label, subject_value, expectation_value, &value_type);
            if recursive {
                validator.assert_equality_using(&pair)?;
            } else if !pair.subject().leaf_equals(pair.expectation()) {
                validator.fail_at(
                    &pair,
                    "Expected {context:value} to be {0}{reason}, but found {1}.",
                    &[pair.expectation().clone(), pair.subject().clone()],
                );
            }
        }

        for key in expectation.keys() {
            if lookup(subject, &key).is_none() {
                validator.scope().fail_with(
                    "Expected {context:dictionary} to contain key {0}{reason}, but it was not found.",
                    &[key],
                );
            }
        }

        Ok(StepResult::Handled)
    }
}

/// The expectation must expose exactly one dictionary interface whose key
/// type is compatible with the subject's
fn has_compatible_interface(
    validator: &mut EquivalencyValidator<'_>,
    key_type: &TypeRef,
    expectation: &Map,
) -> bool {
    let compatible = expectation
        .type_ref()
        .dictionary_interfaces()
        .into_iter()
        .filter(|(key, _)| key.is_compatible_with(key_type))
        .count();

    match compatible {
        1 => true,
        0 => {
            validator.scope().as_configuration_error().fail_with(
                "The subject dictionary is keyed by {0}, but the expectation of type {1} has no dictionary interface with a compatible key type{reason}.",
                &[
                    Value::Type(key_type.clone()),
                    Value::Type(expectation.type_ref().clone()),
                ],
            );
            false
        }
        _ => {
            validator.scope().as_configuration_error().fail_with(
                "The expectation of type {0} has more than one dictionary interface keyed compatibly with {1}{reason}.",
                &[
                    Value::Type(expectation.type_ref().clone()),
                    Value::Type(key_type.clone()),
                ],
            );
            false
        }
    }
}

/// Entry whose key equals `key`, numerically when both are numbers
fn lookup(map: &Map, key: &Value) -> Option<Value> {
    map.get(key).or_else(|| {
        let wanted = key.as_f64()?;
        map.entries()
            .into_iter()
            .find(|(k, _)| k.as_f64() == Some(wanted))
            .map(|(_, v)| v)
    })
}

fn key_label(validator: &mut EquivalencyValidator<'_>, key: &Value) -> String {
    match key {
        Value::Str(s) => s.to_string(),
        other => validator.scope().formatter().format(other),
    }
}
