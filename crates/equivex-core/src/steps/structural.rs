use crate::context::ValidationContext;
use crate::errors::{ExError, Result};
use crate::model::{Member, MemberSet, Object, TypeRef, Value};
use crate::options::{EquivalencyOptions, MemberResolution};
use crate::rules::MemberSelectionContext;
use crate::steps::{EquivalencyStep, StepResult};
use crate::validator::EquivalencyValidator;

/// Objects compare member by member, recursing into every selected member
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEqualityEquivalencyStep;

impl EquivalencyStep for StructuralEqualityEquivalencyStep {
    fn name(&self) -> &str {
        "structural equality"
    }

    fn can_handle(&self, context: &ValidationContext, _options: &EquivalencyOptions) -> bool {
        matches!(context.subject(), Value::Object(_))
    }

    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        options: &EquivalencyOptions,
    ) -> Result<StepResult> {
        let Value::Object(subject) = context.subject() else {
            return Ok(StepResult::Continue);
        };
        if !matches!(context.expectation(), Value::Object(_)) {
            validator.scope().fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        }

        if !context.is_root() && !options.is_recursive() {
            let equal = context.subject().leaf_equals(context.expectation());
            validator.scope().for_condition(equal).fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[context.expectation().clone(), context.subject().clone()],
            );
            return Ok(StepResult::Handled);
        }

        let selected_type = selected_type(context, subject, options);
        let members = select_members(context, &selected_type, options);
        tracing::trace!(
            path = context.path(),
            selected_type = selected_type.name(),
            member_count = members.len(),
            "members selected"
        );

        if members.is_empty() {
            if context.is_root() {
                validator.scope().as_configuration_error().fail_with(
                    "No members were found for comparison. Please specify some members to include in the comparison or choose a more meaningful assertion{reason}.",
                    &[],
                );
            }
            return Ok(StepResult::Handled);
        }

        for member in members.iter() {
            compare_member(validator, context, member, options)?;
        }
        Ok(StepResult::Handled)
    }
}

/// Declared type at the position, unless run-time members were requested,
/// the declared type is not a class (e.g. `object`), or the subject's
/// run-time type does not derive from it
fn selected_type(context: &ValidationContext, subject: &Object, options: &EquivalencyOptions) -> TypeRef {
    let declared = context.compile_time_type();
    let runtime = subject.type_ref();
    let use_runtime = options.member_resolution() == MemberResolution::Runtime
        || !declared.is_class()
        || !runtime.is_assignable_to(declared);
    if use_runtime {
        runtime.clone()
    } else {
        declared.clone()
    }
}

fn select_members(context: &ValidationContext, selected_type: &TypeRef, options: &EquivalencyOptions) -> MemberSet {
    let selection = MemberSelectionContext {
        path: context.path(),
        selected_type,
        filter: options.member_filter(),
        is_root: context.is_root(),
    };
    options
        .selection_rules()
        .iter()
        .fold(MemberSet::new(), |current, rule| rule.select_members(current, &selection))
}

fn compare_member(
    validator: &mut EquivalencyValidator<'_>,
    context: &ValidationContext,
    member: &Member,
    options: &EquivalencyOptions,
) -> Result<()> {
    let matched = options.matching_rules().iter().find_map(|rule| {
        rule.match_member(
            member,
            context.expectation(),
            context,
            options.member_filter(),
            validator.scope(),
        )
    });
    let Some(expectation_member) = matched else {
        return Ok(());
    };

    let subject_value = read(member, context.subject(), context)?;
    let expectation_value = read(&expectation_member, context.expectation(), context)?;

    let nested = context.for_member(member, subject_value, expectation_value);
    validator.assert_equality_using(&nested)
}

fn read(member: &Member, instance: &Value, context: &ValidationContext) -> Result<Value> {
    member.read(instance, &[]).map_err(|e| {
        ExError::from(e)
            .with_path(crate::context::join_member_path(context.path(), member.name()))
            .with_member(member.name())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{builtin, TypeDescriptor};
    use crate::scope::{FailureKind, Reason};

    fn shapes() -> (TypeRef, TypeRef) {
        let shape = TypeDescriptor::class("Shape")
            .property("Name", &builtin::string())
            .build();
        let circle = TypeDescriptor::class("Circle")
            .base(&shape)
            .property("Radius", &builtin::i32())
            .build();
        (shape, circle)
    }

    #[test]
    fn test_declared_type_hides_derived_members() {
        let (shape, circle) = shapes();
        let holder = TypeDescriptor::class("Holder").property("Shape", &shape).build();

        let subject = Object::new(&holder).with(
            "Shape",
            Object::new(&circle).with("Name", "c").with("Radius", 1),
        );
        let expectation = Object::new(&holder).with(
            "Shape",
            Object::new(&circle).with("Name", "c").with("Radius", 2),
        );

        let declared = EquivalencyOptions::default();
        let root = ValidationContext::root(subject.clone().into(), expectation.clone().into(), Reason::none());
        let mut validator = EquivalencyValidator::new(&declared);
        validator.assert_equality_using(&root).unwrap();
        assert!(validator.failures().is_empty());

        let runtime = EquivalencyOptions::default().including_all_runtime_members();
        let mut validator = EquivalencyValidator::new(&runtime);
        validator.assert_equality_using(&root).unwrap();
        assert_eq!(validator.failures().len(), 1);
        assert_eq!(validator.failures()[0].path, "Shape.Radius");
    }

    #[test]
    fn test_empty_selection_at_root_is_a_configuration_failure() {
        let empty = TypeDescriptor::class("Empty").build();
        let options = EquivalencyOptions::default();
        let root = ValidationContext::root(
            Object::new(&empty).into(),
            Object::new(&empty).into(),
            Reason::none(),
        );
        let report = EquivalencyValidator::new(&options).assert_equality(&root).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Configuration);
        assert!(report.failures[0].message.starts_with("No members were found"));
    }
}
