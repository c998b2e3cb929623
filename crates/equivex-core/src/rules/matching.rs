use std::fmt;

use crate::context::{join_member_path, ValidationContext};
use crate::model::{find_member, Member, MemberFilter, Value};
use crate::scope::AssertionScope;

/// Finds the expectation member that corresponds to a subject member
pub trait MemberMatchingRule: Send + Sync {
    /// `None` when this rule has no match. A rule may also report a
    /// failure into `scope` before returning `None`.
    fn match_member(
        &self,
        subject_member: &Member,
        expectation: &Value,
        context: &ValidationContext,
        filter: MemberFilter,
        scope: &mut AssertionScope,
    ) -> Option<Member>;

    fn describe(&self) -> String;
}

impl fmt::Debug for dyn MemberMatchingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Same-named expectation member whose type is compatible
fn find_by_name(subject_member: &Member, expectation: &Value, filter: MemberFilter) -> Option<Member> {
    let Value::Object(object) = expectation else {
        return None;
    };
    find_member(object.type_ref(), subject_member.name(), filter)
        .filter(|m| m.declared_type().is_compatible_with(subject_member.declared_type()))
}

/// Matches by name and reports a failure when the expectation lacks the member
#[derive(Debug, Clone, Copy, Default)]
pub struct MustMatchByNameRule;

impl MemberMatchingRule for MustMatchByNameRule {
    fn match_member(
        &self,
        subject_member: &Member,
        expectation: &Value,
        context: &ValidationContext,
        filter: MemberFilter,
        scope: &mut AssertionScope,
    ) -> Option<Member> {
        let found = find_by_name(subject_member, expectation, filter);
        if found.is_none() {
            let path = join_member_path(context.path(), subject_member.name());
            let description = format!("member {path}");
            let saved = scope.enter(&path, Some(&description), context.reason());
            scope.fail_with(
                "Subject has member {0} that the other object does not have{reason}.",
                &[Value::str(&path)],
            );
            scope.restore(saved);
        }
        found
    }

    fn describe(&self) -> String {
        "Match member by name (or throw)".to_string()
    }
}

/// Matches by name and silently skips members the expectation lacks
#[derive(Debug, Clone, Copy, Default)]
pub struct TryMatchByNameRule;

impl MemberMatchingRule for TryMatchByNameRule {
    fn match_member(
        &self,
        subject_member: &Member,
        expectation: &Value,
        _context: &ValidationContext,
        filter: MemberFilter,
        _scope: &mut AssertionScope,
    ) -> Option<Member> {
        find_by_name(subject_member, expectation, filter)
    }

    fn describe(&self) -> String {
        "Try to match member by name".to_string()
    }
}
