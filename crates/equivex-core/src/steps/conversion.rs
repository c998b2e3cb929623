use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::Value;
use crate::options::EquivalencyOptions;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Converts the subject to the expectation's scalar type when the
/// conversion loses nothing, so later steps compare like with like.
/// String subjects are parsed only when string conversion is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConversionStep;

impl EquivalencyStep for AutoConversionStep {
    fn name(&self) -> &str {
        "auto conversion"
    }

    fn can_handle(&self, context: &ValidationContext, options: &EquivalencyOptions) -> bool {
        let (subject, expectation) = (context.subject(), context.expectation());
        let string_ok = options.string_conversion();
        options.auto_conversion()
            && is_convertible(subject, string_ok)
            && is_convertible(expectation, false)
            && std::mem::discriminant(subject) != std::mem::discriminant(expectation)
    }

    fn handle(
        &self,
        context: &ValidationContext,
        _validator: &mut EquivalencyValidator<'_>,
        _options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        match convert(context.subject(), context.expectation()) {
            Some(converted) => {
                tracing::debug!(
                    path = context.path(),
                    from = context.subject().kind_name(),
                    to = converted.kind_name(),
                    "subject converted"
                );
                Ok(StepResult::Replace(context.with_subject(converted)))
            }
            None => Ok(StepResult::Continue),
        }
    }
}

fn is_convertible(value: &Value, parse_strings: bool) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Str(_) => parse_strings,
        other => other.is_numeric(),
    }
}

/// `value` as the scalar kind of `target`, if exact
fn convert(value: &Value, target: &Value) -> Option<Value> {
    if let Value::Str(s) = value {
        return parse(s.trim(), target);
    }
    match target {
        Value::I32(_) => value.as_i64().and_then(|v| i32::try_from(v).ok()).map(Value::I32),
        Value::I64(_) => value.as_i64().map(Value::I64),
        Value::U64(_) => match value {
            Value::U64(v) => Some(Value::U64(*v)),
            _ => value.as_i64().and_then(|v| u64::try_from(v).ok()).map(Value::U64),
        },
        Value::F64(_) => exact_f64(value).map(Value::F64),
        Value::F32(_) => exact_f64(value).and_then(narrow_f32).map(Value::F32),
        _ => None,
    }
}

fn parse(text: &str, target: &Value) -> Option<Value> {
    match target {
        Value::Bool(_) => text.parse().ok().map(Value::Bool),
        Value::I32(_) => text.parse().ok().map(Value::I32),
        Value::I64(_) => text.parse().ok().map(Value::I64),
        Value::U64(_) => text.parse().ok().map(Value::U64),
        Value::F32(_) => text.parse().ok().map(Value::F32),
        Value::F64(_) => text.parse().ok().map(Value::F64),
        _ => None,
    }
}

/// Integers up to 2^53 convert to `f64` without rounding
fn exact_f64(value: &Value) -> Option<f64> {
    const MAX_EXACT: u64 = 1 << 53;
    match value {
        Value::I64(v) if v.unsigned_abs() > MAX_EXACT => None,
        Value::U64(v) if *v > MAX_EXACT => None,
        other => other.as_f64(),
    }
}

fn narrow_f32(v: f64) -> Option<f32> {
    let narrowed = v as f32;
    if v.is_nan() || f64::from(narrowed) == v {
        Some(narrowed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converts(value: Value, target: Value) -> Option<Value> {
        convert(&value, &target)
    }

    #[test]
    fn test_widening_and_exact_narrowing() {
        assert!(converts(Value::I32(4), Value::F64(0.0))
            .unwrap()
            .leaf_equals(&Value::F64(4.0)));
        assert!(converts(Value::F64(4.0), Value::I32(0))
            .unwrap()
            .leaf_equals(&Value::I32(4)));
        assert!(converts(Value::F64(4.5), Value::I32(0)).is_none());
        assert!(converts(Value::I64(i64::MAX), Value::I32(0)).is_none());
        assert!(converts(Value::I64(-1), Value::U64(0)).is_none());
    }

    #[test]
    fn test_float_precision_is_preserved() {
        assert!(converts(Value::F64(0.1), Value::F32(0.0)).is_none());
        assert!(converts(Value::F64(0.5), Value::F32(0.0)).is_some());
        assert!(converts(Value::U64(u64::MAX), Value::F64(0.0)).is_none());
    }

    fn handled_by_step(subject: Value, expectation: Value, options: &EquivalencyOptions) -> bool {
        let context = ValidationContext::root(subject, expectation, crate::scope::Reason::none());
        AutoConversionStep.can_handle(&context, options)
    }

    #[test]
    fn test_strings_are_left_alone_by_default() {
        let options = EquivalencyOptions::default();
        assert!(handled_by_step(Value::I32(1), Value::I64(1), &options));
        assert!(!handled_by_step(Value::str("1"), Value::I32(1), &options));
        assert!(!handled_by_step(Value::I32(1), Value::str("1"), &options));

        let parsing = EquivalencyOptions::default().with_string_conversion();
        assert!(handled_by_step(Value::str("1"), Value::I32(1), &parsing));
        assert!(!handled_by_step(Value::I32(1), Value::str("1"), &parsing));

        let off = parsing.without_auto_conversion();
        assert!(!off.string_conversion());
        assert!(!handled_by_step(Value::str("1"), Value::I32(1), &off));
    }

    #[test]
    fn test_strings_parse_into_expectation_kind() {
        assert!(converts(Value::str(" 42 "), Value::I64(0))
            .unwrap()
            .leaf_equals(&Value::I64(42)));
        assert!(converts(Value::str("true"), Value::Bool(false))
            .unwrap()
            .leaf_equals(&Value::Bool(true)));
        assert!(converts(Value::str("abc"), Value::I32(0)).is_none());
        assert!(converts(Value::I32(1), Value::str("1")).is_none());
    }
}
