//! Condition-reporting sink
//!
//! Steps and rules never raise on a mismatch. They report into an
//! [`AssertionScope`], which renders the message template at the current
//! position and accumulates the failure. Failures recorded after a
//! [`AssertionScope::checkpoint`] can be rolled back, which is how
//! speculative collection matches are tried without polluting the report.
//!
//! # Message templates
//!
//! - `{0}`, `{1}`, ...: positional arguments, rendered by the scope's
//!   [`ValueFormatter`]
//! - `{reason}`: the because-phrase of the current position, with a leading
//!   space, or nothing
//! - `{context:label}`: description of the current position, or `label`
//!   when at the root
//! - `{{` and `}}`: literal braces

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::{ExError, ExErrorKind};
use crate::formatter::{DefaultValueFormatter, ValueFormatter};
use crate::model::Value;

/// A "because" phrase and its format arguments
#[derive(Debug, Clone, Default)]
pub struct Reason {
    template: String,
    args: Vec<Value>,
}

impl Reason {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(template: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }

    pub fn because(template: impl Into<String>) -> Self {
        Self::new(template, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.template.trim().is_empty()
    }

    /// `" because ..."`, or an empty string when there is no reason
    pub fn render(&self, formatter: &dyn ValueFormatter) -> String {
        if self.is_empty() {
            return String::new();
        }
        let text = substitute(&self.template, &self.args, formatter, &|_| None);
        let text = text.trim();
        if text.to_ascii_lowercase().starts_with("because") {
            format!(" {text}")
        } else {
            format!(" because {text}")
        }
    }
}

/// What a failure says about the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Subject and expectation differ
    Mismatch,
    /// The comparison request itself is ill-posed
    Configuration,
    /// Depth limit or cyclic reference guard
    Guard,
}

/// One reported difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: String,
    pub description: String,
    pub message: String,
    pub kind: FailureKind,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Position restored by [`AssertionScope::restore`]
pub struct SavedPosition {
    path: String,
    description: Option<String>,
    reason: Rc<Reason>,
}

/// Accumulates failures for one comparison session
pub struct AssertionScope {
    failures: Vec<Failure>,
    formatter: Arc<dyn ValueFormatter>,
    path: String,
    description: Option<String>,
    reason: Rc<Reason>,
    condition: bool,
    kind: FailureKind,
}

impl Default for AssertionScope {
    fn default() -> Self {
        Self::new(Arc::new(DefaultValueFormatter::default()))
    }
}

impl AssertionScope {
    pub fn new(formatter: Arc<dyn ValueFormatter>) -> Self {
        Self {
            failures: Vec::new(),
            formatter,
            path: String::new(),
            description: None,
            reason: Rc::new(Reason::none()),
            condition: false,
            kind: FailureKind::Mismatch,
        }
    }

    /// Whether the next `fail_with` is suppressed
    pub fn for_condition(&mut self, condition: bool) -> &mut Self {
        self.condition = condition;
        self
    }

    /// Record the next failure as a configuration problem
    pub fn as_configuration_error(&mut self) -> &mut Self {
        self.kind = FailureKind::Configuration;
        self
    }

    /// Record the next failure as a depth or cycle guard trip
    pub fn as_guard(&mut self) -> &mut Self {
        self.kind = FailureKind::Guard;
        self
    }

    /// Record a failure unless the pending condition holds.
    ///
    /// Returns the condition. Both the condition and the failure kind reset
    /// afterwards, so a bare `fail_with` always fails.
    pub fn fail_with(&mut self, template: &str, args: &[Value]) -> bool {
        let condition = std::mem::replace(&mut self.condition, false);
        let kind = std::mem::replace(&mut self.kind, FailureKind::Mismatch);
        if condition {
            return true;
        }

        let message = self.render(template, args);
        tracing::trace!(path = %self.path, ?kind, "failure recorded");
        self.failures.push(Failure {
            path: self.path.clone(),
            description: self.description.clone().unwrap_or_else(|| "root".to_string()),
            message,
            kind,
        });
        false
    }

    /// Render a template at the current position without recording it
    pub fn render(&self, template: &str, args: &[Value]) -> String {
        let reason = self.reason.render(self.formatter.as_ref());
        let description = self.description.as_deref();
        substitute(template, args, self.formatter.as_ref(), &|name| {
            if name == "reason" {
                Some(reason.clone())
            } else {
                name.strip_prefix("context:")
                    .map(|label| description.unwrap_or(label).to_string())
            }
        })
    }

    /// Move to a new position, returning the one to restore afterwards
    pub fn enter(
        &mut self,
        path: &str,
        description: Option<&str>,
        reason: &Rc<Reason>,
    ) -> SavedPosition {
        SavedPosition {
            path: std::mem::replace(&mut self.path, path.to_string()),
            description: std::mem::replace(&mut self.description, description.map(str::to_string)),
            reason: std::mem::replace(&mut self.reason, Rc::clone(reason)),
        }
    }

    pub fn restore(&mut self, saved: SavedPosition) {
        self.path = saved.path;
        self.description = saved.description;
        self.reason = saved.reason;
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn formatter(&self) -> &dyn ValueFormatter {
        self.formatter.as_ref()
    }

    /// Mark for a later [`rollback`](Self::rollback)
    pub fn checkpoint(&self) -> usize {
        self.failures.len()
    }

    /// Remove and return every failure recorded since `mark`
    pub fn rollback(&mut self, mark: usize) -> Vec<Failure> {
        if mark >= self.failures.len() {
            return Vec::new();
        }
        self.failures.split_off(mark)
    }

    pub fn add_failures(&mut self, failures: Vec<Failure>) {
        self.failures.extend(failures);
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

fn substitute(
    template: &str,
    args: &[Value],
    formatter: &dyn ValueFormatter,
    named: &dyn Fn(&str) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let name = &tail[1..end];
        let replacement = match name.parse::<usize>() {
            Ok(index) => args.get(index).map(|v| formatter.format(v)),
            Err(_) => named(name),
        };
        match replacement {
            Some(text) => out.push_str(&text),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Outcome of one comparison session
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquivalencyReport {
    pub failures: Vec<Failure>,
}

impl EquivalencyReport {
    pub fn is_equivalent(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures of the given kind
    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// Convert into a `Result`, failing with `NotEquivalent` when any
    /// failure was reported.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::NotEquivalent` carrying every message, one per
    /// line.
    pub fn into_result(self) -> Result<(), ExError> {
        if self.is_equivalent() {
            return Ok(());
        }
        let message = self
            .failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let first_path = self.failures[0].path.clone();
        Err(ExError::new(ExErrorKind::NotEquivalent)
            .with_op("assert_equivalence")
            .with_path(first_path)
            .with_message(message))
    }
}

impl fmt::Display for EquivalencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("equivalent");
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", failure.message)?;
        }
        Ok(())
    }
}
