//! Positions within the two graphs being compared

use std::rc::Rc;

use crate::model::{builtin, Member, TypeRef, Value};
use crate::scope::Reason;

/// Where a pair of values sits in the walk, plus the pair itself.
///
/// Contexts are immutable. Descending creates a child through
/// [`for_member`](Self::for_member),
/// [`for_collection_item`](Self::for_collection_item) or
/// [`for_dictionary_item`](Self::for_dictionary_item).
#[derive(Debug, Clone)]
pub struct ValidationContext {
    member: Option<Member>,
    path: String,
    description: Option<String>,
    compile_time_type: TypeRef,
    runtime_type: TypeRef,
    subject: Value,
    expectation: Value,
    is_root: bool,
    root_is_collection: bool,
    depth: usize,
    reason: Rc<Reason>,
}

impl ValidationContext {
    /// Root position. Its compile-time type is the subject's run-time type.
    pub fn root(subject: Value, expectation: Value, reason: Reason) -> Self {
        let compile_time_type = subject
            .runtime_type()
            .or_else(|| expectation.runtime_type())
            .unwrap_or_else(builtin::object);
        let root_is_collection = subject.items().is_some();
        Self::build(
            None,
            String::new(),
            None,
            compile_time_type,
            subject,
            expectation,
            true,
            root_is_collection,
            0,
            Rc::new(reason),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        member: Option<Member>,
        path: String,
        description: Option<String>,
        compile_time_type: TypeRef,
        subject: Value,
        expectation: Value,
        is_root: bool,
        root_is_collection: bool,
        depth: usize,
        reason: Rc<Reason>,
    ) -> Self {
        let runtime_type = subject
            .runtime_type()
            .unwrap_or_else(|| compile_time_type.clone());
        Self {
            member,
            path,
            description,
            compile_time_type,
            runtime_type,
            subject,
            expectation,
            is_root,
            root_is_collection,
            depth,
            reason,
        }
    }

    /// Child position for a member of the current object
    pub fn for_member(&self, member: &Member, subject: Value, expectation: Value) -> Self {
        let path = join_member_path(&self.path, member.name());
        Self::build(
            Some(member.clone()),
            path.clone(),
            Some(format!("member {path}")),
            member.declared_type().clone(),
            subject,
            expectation,
            false,
            false,
            self.child_depth(),
            Rc::clone(&self.reason),
        )
    }

    /// Child position for a collection element; `index` is the rendered
    /// index, e.g. `3` or `1,2`.
    ///
    /// Items of a root collection are themselves treated as roots.
    pub fn for_collection_item(
        &self,
        index: &str,
        subject: Value,
        expectation: Value,
        item_type: &TypeRef,
    ) -> Self {
        let path = format!("{}[{}]", self.path, index);
        Self::build(
            None,
            path.clone(),
            Some(format!("item {path}")),
            item_type.clone(),
            subject,
            expectation,
            self.is_root && self.root_is_collection,
            false,
            self.child_depth(),
            Rc::clone(&self.reason),
        )
    }

    /// Child position for a dictionary value; `key` is the rendered key
    pub fn for_dictionary_item(
        &self,
        key: &str,
        subject: Value,
        expectation: Value,
        value_type: &TypeRef,
    ) -> Self {
        let path = format!("{}[{}]", self.path, key);
        Self::build(
            None,
            path.clone(),
            Some(format!("pair {path}")),
            value_type.clone(),
            subject,
            expectation,
            false,
            false,
            self.child_depth(),
            Rc::clone(&self.reason),
        )
    }

    /// Same position holding a converted subject
    pub fn with_subject(&self, subject: Value) -> Self {
        let mut next = self.clone();
        next.runtime_type = subject
            .runtime_type()
            .unwrap_or_else(|| next.compile_time_type.clone());
        next.subject = subject;
        next
    }

    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    /// Dotted path from the root, empty at the root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable position, `None` at the root
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn compile_time_type(&self) -> &TypeRef {
        &self.compile_time_type
    }

    /// Run-time type of the subject, or the compile-time type if it is null
    pub fn runtime_type(&self) -> &TypeRef {
        &self.runtime_type
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn expectation(&self) -> &Value {
        &self.expectation
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Number of separator boundaries in the path: `Name` and `[0]` are at
    /// depth 0, `Orders[0].Id` is at depth 2
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn child_depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.depth + 1
        }
    }

    pub fn reason(&self) -> &Rc<Reason> {
        &self.reason
    }

    /// Position summary handed to rule predicates
    pub fn position(&self) -> PositionInfo {
        PositionInfo {
            path: self.path.clone(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "root".to_string()),
            compile_time_type: self.compile_time_type.clone(),
            runtime_type: self.runtime_type.clone(),
            declaring_type: self.member.as_ref().map(|m| m.declaring_type().to_string()),
            member_name: self.member.as_ref().map(|m| m.name().to_string()),
        }
    }
}

/// What rule predicates can see about a position
#[derive(Debug, Clone)]
pub struct PositionInfo {
    pub path: String,
    pub description: String,
    pub compile_time_type: TypeRef,
    pub runtime_type: TypeRef,
    pub declaring_type: Option<String>,
    pub member_name: Option<String>,
}

impl PositionInfo {
    /// Position of a candidate member below `parent_path`, before any value
    /// has been read
    pub fn for_candidate(parent_path: &str, member: &Member) -> Self {
        let path = join_member_path(parent_path, member.name());
        Self {
            description: format!("member {path}"),
            path,
            compile_time_type: member.declared_type().clone(),
            runtime_type: member.declared_type().clone(),
            declaring_type: Some(member.declaring_type().to_string()),
            member_name: Some(member.name().to_string()),
        }
    }
}

/// `parent.name`, or `name` at the root
pub fn join_member_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Remove every `[...]` index qualifier, dropping the separator that
/// follows a leading one: `[0].Orders[2].Id` becomes `Orders.Id`.
pub fn strip_index_qualifiers(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            '.' if out.is_empty() || out.ends_with('.') => {}
            _ => out.push(c),
        }
    }
    out
}
