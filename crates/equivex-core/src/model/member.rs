//! Members of host types
//!
//! A [`Member`] is a named, typed accessor on a type: a field or a
//! property. Members are identified by `(declaring type, name)`.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::EquivError;
use crate::model::types::{TypeDescriptor, TypeRef};
use crate::model::value::{Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

/// Getter for computed members: receives the instance and index arguments
pub type MemberGetter =
    Arc<dyn Fn(&Object, &[Value]) -> Result<Value, EquivError> + Send + Sync>;

struct MemberInfo {
    name: String,
    declared_type: TypeRef,
    declaring_type: String,
    kind: MemberKind,
    visibility: Visibility,
    index_parameters: usize,
    getter: Option<MemberGetter>,
}

/// A resolved member of a type
#[derive(Clone)]
pub struct Member(Arc<MemberInfo>);

/// Identity of a member: `(declaring type, name)`
pub type MemberKey = (String, String);

impl Member {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.0.declared_type
    }

    /// Name of the type that declares this member
    pub fn declaring_type(&self) -> &str {
        &self.0.declaring_type
    }

    pub fn kind(&self) -> MemberKind {
        self.0.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.0.visibility
    }

    pub fn is_indexed(&self) -> bool {
        self.0.index_parameters > 0
    }

    /// Public or internal, and not indexed
    pub fn is_selectable(&self) -> bool {
        self.0.visibility != Visibility::Private && !self.is_indexed()
    }

    pub fn key(&self) -> MemberKey {
        (self.0.declaring_type.clone(), self.0.name.clone())
    }

    /// Read this member's value from `instance`.
    ///
    /// Stored members that were never assigned read as `Null`.
    ///
    /// # Errors
    ///
    /// Fails when `instance` is not an object, when the number of index
    /// arguments does not match, or when a computed getter fails.
    pub fn read(&self, instance: &Value, index_args: &[Value]) -> Result<Value, EquivError> {
        let Value::Object(object) = instance else {
            return Err(EquivError::NotAnObject {
                member: self.0.name.clone(),
                found: instance.kind_name().to_string(),
            });
        };

        if index_args.len() != self.0.index_parameters {
            return Err(EquivError::IndexArgumentMismatch {
                type_name: self.0.declaring_type.clone(),
                member: self.0.name.clone(),
                expected: self.0.index_parameters,
                actual: index_args.len(),
            });
        }

        match &self.0.getter {
            Some(getter) => getter(object, index_args),
            None => Ok(object.get(&self.0.name).unwrap_or(Value::Null)),
        }
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.0.declaring_type == other.0.declaring_type && self.0.name == other.0.name
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.declaring_type.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.0.name)
            .field("declaring_type", &self.0.declaring_type)
            .field("declared_type", &self.0.declared_type.name())
            .field("kind", &self.0.kind)
            .finish()
    }
}

/// Unresolved member description used while building a type
pub struct MemberDef {
    name: String,
    declared_type: Option<TypeRef>,
    kind: MemberKind,
    visibility: Visibility,
    index_parameters: usize,
    getter: Option<MemberGetter>,
}

impl MemberDef {
    pub fn property(name: &str, ty: &TypeRef) -> Self {
        Self::new(name, Some(ty.clone()), MemberKind::Property)
    }

    pub fn field(name: &str, ty: &TypeRef) -> Self {
        Self::new(name, Some(ty.clone()), MemberKind::Field)
    }

    /// Property typed as the declaring type itself
    pub fn self_property(name: &str) -> Self {
        Self::new(name, None, MemberKind::Property)
    }

    fn new(name: &str, declared_type: Option<TypeRef>, kind: MemberKind) -> Self {
        Self {
            name: name.to_string(),
            declared_type,
            kind,
            visibility: Visibility::Public,
            index_parameters: 0,
            getter: None,
        }
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as an indexer taking `parameters` arguments
    pub fn indexed(mut self, parameters: usize) -> Self {
        self.index_parameters = parameters;
        self
    }

    /// Compute the value instead of reading stored state
    pub fn computed<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, EquivError> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub(crate) fn resolve(self, declaring: &TypeRef) -> Member {
        Member(Arc::new(MemberInfo {
            name: self.name,
            declared_type: self.declared_type.unwrap_or_else(|| declaring.clone()),
            declaring_type: declaring.name().to_string(),
            kind: self.kind,
            visibility: self.visibility,
            index_parameters: self.index_parameters,
            getter: self.getter,
        }))
    }
}

/// Which member kinds participate in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFilter {
    pub fields: bool,
    pub properties: bool,
}

impl MemberFilter {
    pub const ALL: MemberFilter = MemberFilter {
        fields: true,
        properties: true,
    };

    fn admits(&self, member: &Member) -> bool {
        match member.kind() {
            MemberKind::Field => self.fields,
            MemberKind::Property => self.properties,
        }
    }
}

/// Selectable members of `ty`: the type's own first, then inherited ones
/// not hidden by a same-named member of a more derived type.
pub fn get_members(ty: &TypeDescriptor, filter: MemberFilter) -> Vec<Member> {
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();
    let mut current = Some(ty);
    while let Some(t) = current {
        for member in t.declared_members() {
            if !seen.insert(member.name().to_string()) {
                continue;
            }
            if member.is_selectable() && filter.admits(member) {
                result.push(member.clone());
            }
        }
        current = t.base().map(|b| b.as_ref());
    }
    result
}

/// Selectable member of `ty` named `name`, if any
pub fn find_member(ty: &TypeDescriptor, name: &str, filter: MemberFilter) -> Option<Member> {
    get_members(ty, filter).into_iter().find(|m| m.name() == name)
}

/// Insertion-ordered set of members keyed by member identity
#[derive(Debug, Clone, Default)]
pub struct MemberSet {
    members: Vec<Member>,
    keys: BTreeSet<MemberKey>,
}

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the member was already present
    pub fn insert(&mut self, member: Member) -> bool {
        if self.keys.insert(member.key()) {
            self.members.push(member);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, member: &Member) -> bool {
        self.keys.contains(&member.key())
    }

    /// Drop every member matching `predicate`
    pub fn remove_where<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&Member) -> bool,
    {
        let keys = &mut self.keys;
        self.members.retain(|m| {
            if predicate(m) {
                keys.remove(&m.key());
                false
            } else {
                true
            }
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_vec(self) -> Vec<Member> {
        self.members
    }
}

impl FromIterator<Member> for MemberSet {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        let mut set = MemberSet::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}
