//! Recursive graph walker and the public entry points
//!
//! ## Logging Ownership
//!
//! [`are_equivalent_because`] owns the lifecycle events of a session:
//! - `log_op_start!` at entry
//! - `log_op_end!` on completion, with the failure count
//! - `log_op_error!` when a host error aborts the walk
//!
//! The walker, steps and collection matcher use only `tracing::debug!` and
//! `tracing::trace!`.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::context::ValidationContext;
use crate::errors::{EquivError, ExError, Result};
use crate::model::Value;
use crate::options::{CyclicReferenceHandling, EquivalencyOptions};
use crate::scope::{AssertionScope, EquivalencyReport, Failure, Reason};
use crate::steps::{standard_pipeline, EquivalencyStep, StepResult};
use crate::tracker::{ObjectReference, ObjectTracker};
use crate::types::SessionId;
use crate::{log_op_end, log_op_error, log_op_start};

/// Compare `subject` against `expectation`.
///
/// Differences are collected in the returned report; an `Err` means the
/// comparison could not be carried out.
///
/// # Errors
///
/// - `MemberAccess`: a member getter failed
/// - `NoStepFound`: no step handled a position (engine defect)
pub fn are_equivalent(
    subject: &Value,
    expectation: &Value,
    options: &EquivalencyOptions,
) -> Result<EquivalencyReport> {
    are_equivalent_because(subject, expectation, options, Reason::none())
}

/// [`are_equivalent`] with a because-phrase rendered into every failure
///
/// # Errors
///
/// See [`are_equivalent`].
pub fn are_equivalent_because(
    subject: &Value,
    expectation: &Value,
    options: &EquivalencyOptions,
    reason: Reason,
) -> Result<EquivalencyReport> {
    let session_id = SessionId::new();
    let span = tracing::debug_span!("equivalency_session", session_id = %session_id);
    let _guard = span.enter();

    log_op_start!("assert_equivalence", session_id = %session_id);
    let start = Instant::now();

    let root = ValidationContext::root(subject.clone(), expectation.clone(), reason);
    let report = EquivalencyValidator::new(options)
        .assert_equality(&root)
        .map_err(|e| {
            let e = e.with_session_id(session_id.clone());
            log_op_error!(
                "assert_equivalence",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %session_id
            );
            e
        })?;

    log_op_end!(
        "assert_equivalence",
        duration_ms = start.elapsed().as_millis() as u64,
        session_id = %session_id,
        failure_count = report.failures.len()
    );

    Ok(report)
}

/// Like [`are_equivalent`], but any reported difference becomes an error
///
/// # Errors
///
/// `NotEquivalent` carrying every failure message, plus the errors of
/// [`are_equivalent`].
pub fn assert_equivalent(
    subject: &Value,
    expectation: &Value,
    options: &EquivalencyOptions,
) -> Result<()> {
    are_equivalent(subject, expectation, options)?.into_result()
}

/// Position in the session to roll back to after a speculative comparison
#[derive(Debug, Clone, Copy)]
pub struct ValidatorMark {
    failures: usize,
    visited: usize,
}

/// State of one comparison session: the report scope, the visited set and
/// the step pipeline
pub struct EquivalencyValidator<'a> {
    options: &'a EquivalencyOptions,
    scope: AssertionScope,
    tracker: ObjectTracker,
    pipeline: Rc<[Arc<dyn EquivalencyStep>]>,
}

impl<'a> EquivalencyValidator<'a> {
    pub fn new(options: &'a EquivalencyOptions) -> Self {
        Self::with_steps(options, standard_pipeline(options))
    }

    /// Validator running a custom pipeline
    pub fn with_steps(options: &'a EquivalencyOptions, steps: Vec<Arc<dyn EquivalencyStep>>) -> Self {
        Self {
            options,
            scope: AssertionScope::new(options.value_formatter()),
            tracker: ObjectTracker::new(),
            pipeline: steps.into(),
        }
    }

    pub fn options(&self) -> &'a EquivalencyOptions {
        self.options
    }

    pub fn scope(&mut self) -> &mut AssertionScope {
        &mut self.scope
    }

    pub fn failures(&self) -> &[Failure] {
        self.scope.failures()
    }

    pub fn checkpoint(&self) -> ValidatorMark {
        ValidatorMark {
            failures: self.scope.checkpoint(),
            visited: self.tracker.checkpoint(),
        }
    }

    pub fn failures_since(&self, mark: ValidatorMark) -> usize {
        self.scope.failure_count().saturating_sub(mark.failures)
    }

    /// Undo everything since `mark`, returning the failures it removed
    pub fn rollback(&mut self, mark: ValidatorMark) -> Vec<Failure> {
        self.tracker.rollback(mark.visited);
        self.scope.rollback(mark.failures)
    }

    /// Report a failure at `context` without walking it
    pub fn fail_at(&mut self, context: &ValidationContext, template: &str, args: &[Value]) {
        let saved = self
            .scope
            .enter(context.path(), context.description(), context.reason());
        self.scope.fail_with(template, args);
        self.scope.restore(saved);
    }

    /// Walk the whole graph from `root` and close the session
    ///
    /// # Errors
    ///
    /// See [`are_equivalent`].
    pub fn assert_equality(mut self, root: &ValidationContext) -> Result<EquivalencyReport> {
        self.assert_equality_using(root)?;
        tracing::debug!(
            visited = self.tracker.len(),
            failure_count = self.scope.failure_count(),
            "walk complete"
        );
        Ok(EquivalencyReport {
            failures: self.scope.into_failures(),
        })
    }

    /// Compare one position, recursing through the pipeline
    ///
    /// # Errors
    ///
    /// See [`are_equivalent`].
    pub fn assert_equality_using(&mut self, context: &ValidationContext) -> Result<()> {
        let saved = self
            .scope
            .enter(context.path(), context.description(), context.reason());
        let result = if self.continue_recursion(context) && !self.is_cyclic_reference(context) {
            self.run_pipeline(context)
        } else {
            Ok(())
        };
        self.scope.restore(saved);
        result
    }

    fn continue_recursion(&mut self, context: &ValidationContext) -> bool {
        let max = self.options.max_recursion_depth();
        if self.options.allows_infinite_recursion() || context.depth() <= max {
            return true;
        }

        tracing::debug!(path = context.path(), depth = context.depth(), "recursion depth limit reached");
        self.scope.as_guard().fail_with(
            "The maximum recursion depth of {0} was reached at {context:subject}{reason}.",
            &[Value::I64(i64::try_from(max).unwrap_or(i64::MAX))],
        );
        false
    }

    fn is_cyclic_reference(&mut self, context: &ValidationContext) -> bool {
        let Some(identity) = context.subject().identity() else {
            return false;
        };
        if !self
            .tracker
            .is_cyclic_reference(ObjectReference::new(identity, context.path()))
        {
            return false;
        }

        match self.options.cyclic_reference_handling() {
            CyclicReferenceHandling::ThrowException => {
                tracing::debug!(path = context.path(), "cyclic reference reported");
                self.scope.as_guard().fail_with(
                    "Expected {context:subject} to be {0}{reason}, but it contains a cyclic reference.",
                    &[context.expectation().clone()],
                );
            }
            CyclicReferenceHandling::Ignore => {
                tracing::debug!(path = context.path(), "cyclic reference ignored");
            }
        }
        true
    }

    fn run_pipeline(&mut self, context: &ValidationContext) -> Result<()> {
        let pipeline = Rc::clone(&self.pipeline);
        let options = self.options;
        let mut replaced: Option<ValidationContext> = None;

        for step in pipeline.iter() {
            let current = replaced.as_ref().unwrap_or(context);
            if !step.can_handle(current, options) {
                continue;
            }

            tracing::trace!(step = step.name(), path = current.path(), "step dispatched");
            match step.handle(current, self, options)? {
                StepResult::Handled => return Ok(()),
                StepResult::Continue => {}
                StepResult::Replace(next) => replaced = Some(next),
            }
        }

        Err(ExError::from(EquivError::NoStepFound {
            path: display_path(context.path()),
        }))
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "the root".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::{builtin, Object, TypeDescriptor};
    use crate::steps::StringEqualityEquivalencyStep;

    #[test]
    fn test_missing_step_is_a_defect() {
        let options = EquivalencyOptions::default();
        let validator = EquivalencyValidator::with_steps(
            &options,
            vec![Arc::new(StringEqualityEquivalencyStep)],
        );
        let root = ValidationContext::root(Value::I32(1), Value::I32(1), Reason::none());

        let err = validator.assert_equality(&root).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NoStepFound);
        assert!(err.kind().is_defect());
        assert_eq!(err.path(), Some("the root"));
    }

    #[test]
    fn test_rollback_restores_failures_and_visited_set() {
        let options = EquivalencyOptions::default();
        let mut validator = EquivalencyValidator::new(&options);
        let ty = TypeDescriptor::class("Leaf")
            .property("Value", &builtin::i32())
            .build();
        let subject = Object::new(&ty).with("Value", 1);
        let root = ValidationContext::root(
            subject.clone().into(),
            Object::new(&ty).with("Value", 2).into(),
            Reason::none(),
        );

        let mark = validator.checkpoint();
        validator.assert_equality_using(&root).unwrap();
        assert_eq!(validator.failures().len(), 1);

        let removed = validator.rollback(mark);
        assert_eq!(removed.len(), 1);
        assert!(validator.failures().is_empty());

        // The same node at the same path is not mistaken for a cycle.
        validator.assert_equality_using(&root).unwrap();
        assert_eq!(validator.failures().len(), 1);
    }

    #[test]
    fn test_getter_errors_propagate() {
        let ty = TypeDescriptor::class("Broken")
            .member(
                crate::model::MemberDef::property("Value", &builtin::i32()).computed(|_, _| {
                    Err(EquivError::MemberReadFailed {
                        type_name: "Broken".to_string(),
                        member: "Value".to_string(),
                        reason: "boom".to_string(),
                    })
                }),
            )
            .build();
        let options = EquivalencyOptions::default();
        let err = are_equivalent(
            &Object::new(&ty).into(),
            &Object::new(&ty).into(),
            &options,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MemberAccess);
        assert!(err.session_id().is_some());
    }
}
