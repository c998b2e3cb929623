use std::fmt;

use crate::context::{join_member_path, PositionInfo};
use crate::model::{get_members, Member, MemberFilter, MemberSet, TypeRef};
use crate::rules::{is_same_or_ancestor, normalize_for, PositionPredicate};

/// The object whose members are being selected
pub struct MemberSelectionContext<'a> {
    /// Path of the object itself
    pub path: &'a str,
    /// Declared or run-time type, depending on options
    pub selected_type: &'a TypeRef,
    pub filter: MemberFilter,
    pub is_root: bool,
}

impl MemberSelectionContext<'_> {
    /// Every selectable member of the selected type
    pub fn members(&self) -> Vec<Member> {
        get_members(self.selected_type, self.filter)
    }

    pub fn candidate_path(&self, member: &Member) -> String {
        join_member_path(self.path, member.name())
    }

    pub fn candidate_position(&self, member: &Member) -> PositionInfo {
        PositionInfo::for_candidate(self.path, member)
    }
}

/// Transforms the running set of selected members
pub trait MemberSelectionRule: Send + Sync {
    fn select_members(&self, current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet;

    /// The blanket inclusion that explicit inclusions replace
    fn is_default_inclusion(&self) -> bool {
        false
    }

    fn describe(&self) -> String;
}

impl fmt::Debug for dyn MemberSelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Adds every member of the selected type
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllMembersRule;

impl MemberSelectionRule for IncludeAllMembersRule {
    fn select_members(&self, mut current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet {
        for member in context.members() {
            current.insert(member);
        }
        current
    }

    fn is_default_inclusion(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "Include all non-private members".to_string()
    }
}

/// Removes the member at a literal path
#[derive(Debug, Clone)]
pub struct ExcludeMemberByPathRule {
    path: String,
}

impl ExcludeMemberByPathRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl MemberSelectionRule for ExcludeMemberByPathRule {
    fn select_members(&self, mut current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet {
        current.remove_where(|m| normalize_for(&self.path, &context.candidate_path(m)) == self.path);
        current
    }

    fn describe(&self) -> String {
        format!("Exclude member {}", self.path)
    }
}

/// Removes every member matching a predicate
pub struct ExcludeMemberByPredicateRule {
    predicate: PositionPredicate,
    description: String,
}

impl ExcludeMemberByPredicateRule {
    pub fn new(predicate: PositionPredicate, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }
}

impl MemberSelectionRule for ExcludeMemberByPredicateRule {
    fn select_members(&self, mut current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet {
        current.remove_where(|m| (self.predicate)(&context.candidate_position(m)));
        current
    }

    fn describe(&self) -> String {
        format!("Exclude members where {}", self.description)
    }
}

/// Adds the member at a literal path, along with the members leading to it
/// and every member below it
#[derive(Debug, Clone)]
pub struct IncludeMemberByPathRule {
    path: String,
}

impl IncludeMemberByPathRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl MemberSelectionRule for IncludeMemberByPathRule {
    fn select_members(&self, mut current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet {
        for member in context.members() {
            let candidate = normalize_for(&self.path, &context.candidate_path(&member));
            if is_same_or_ancestor(&candidate, &self.path) || is_same_or_ancestor(&self.path, &candidate) {
                current.insert(member);
            }
        }
        current
    }

    fn describe(&self) -> String {
        format!("Include member {}", self.path)
    }
}

/// Adds every member matching a predicate
pub struct IncludeMemberByPredicateRule {
    predicate: PositionPredicate,
    description: String,
}

impl IncludeMemberByPredicateRule {
    pub fn new(predicate: PositionPredicate, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }
}

impl MemberSelectionRule for IncludeMemberByPredicateRule {
    fn select_members(&self, mut current: MemberSet, context: &MemberSelectionContext<'_>) -> MemberSet {
        for member in context.members() {
            if (self.predicate)(&context.candidate_position(&member)) {
                current.insert(member);
            }
        }
        current
    }

    fn describe(&self) -> String {
        format!("Include members where {}", self.description)
    }
}
