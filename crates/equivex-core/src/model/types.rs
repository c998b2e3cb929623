//! Type descriptors for the host object model
//!
//! A [`TypeDescriptor`] is the engine's stand-in for runtime reflection: it
//! names a type, classifies it, records its base type and the generic
//! collection interfaces it exposes, and carries its member table. Type
//! identity is the type name.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::errors::EquivError;
use crate::model::member::{Member, MemberDef};

/// Shared handle to a type descriptor
pub type TypeRef = Arc<TypeDescriptor>;

/// Primitive scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Bool | PrimitiveKind::Char)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

/// A named enum constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

/// Classification of a type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// The root of the type hierarchy; every type is assignable to it
    Object,
    Primitive(PrimitiveKind),
    String,
    Enum(Vec<EnumVariant>),
    /// The type of values that are themselves types
    Type,
    /// A reference type with members
    Class,
    /// A sequence or dictionary type; element shapes come from its interfaces
    Collection,
    Array { rank: usize, element: TypeRef },
}

/// A generic collection interface a type exposes
///
/// A type may expose several, which the collection steps report as an
/// ambiguity rather than guessing.
#[derive(Debug, Clone)]
pub enum Interface {
    Enumerable { item: TypeRef },
    Dictionary { key: TypeRef, value: TypeRef },
}

pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    base: Option<TypeRef>,
    interfaces: Vec<Interface>,
    members: OnceLock<Vec<Member>>,
}

impl TypeDescriptor {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            interfaces: Vec::new(),
            members: OnceLock::new(),
        }
    }

    /// Start describing a class
    pub fn class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Class)
    }

    /// Start describing a custom collection type
    ///
    /// Declare its element shape with [`TypeBuilder::implements`].
    pub fn collection(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Collection)
    }

    /// `List<T>`
    pub fn list(item: &TypeRef) -> TypeRef {
        let mut desc = Self::new(format!("List<{}>", item.name), TypeKind::Collection);
        desc.interfaces.push(Interface::Enumerable { item: item.clone() });
        Arc::new(desc)
    }

    /// `Dictionary<K, V>`
    pub fn dictionary(key: &TypeRef, value: &TypeRef) -> TypeRef {
        let mut desc = Self::new(
            format!("Dictionary<{}, {}>", key.name, value.name),
            TypeKind::Collection,
        );
        desc.interfaces.push(Interface::Dictionary {
            key: key.clone(),
            value: value.clone(),
        });
        Arc::new(desc)
    }

    /// `T[]`, `T[,]`, ...
    pub fn array(element: &TypeRef, rank: usize) -> TypeRef {
        let rank = rank.max(1);
        let commas = ",".repeat(rank - 1);
        let mut desc = Self::new(
            format!("{}[{}]", element.name, commas),
            TypeKind::Array {
                rank,
                element: element.clone(),
            },
        );
        desc.interfaces.push(Interface::Enumerable {
            item: element.clone(),
        });
        Arc::new(desc)
    }

    /// An enum type with the given `(name, value)` constants
    pub fn enumeration(name: impl Into<String>, variants: &[(&str, i64)]) -> TypeRef {
        let variants = variants
            .iter()
            .map(|(n, v)| EnumVariant {
                name: (*n).to_string(),
                value: *v,
            })
            .collect();
        Arc::new(Self::new(name, TypeKind::Enum(variants)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(p) if p.is_numeric())
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class)
    }

    /// Enum constants, empty for non-enum types
    pub fn enum_variants(&self) -> &[EnumVariant] {
        match &self.kind {
            TypeKind::Enum(variants) => variants,
            _ => &[],
        }
    }

    /// Name of the first enum constant with the given value
    pub fn variant_name(&self, value: i64) -> Option<&str> {
        self.enum_variants()
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    /// Members declared directly on this type
    pub fn declared_members(&self) -> &[Member] {
        self.members.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attach the member table to a type created with
    /// [`TypeBuilder::build_pending`].
    ///
    /// Member tables are write-once; this is how mutually recursive types
    /// are described.
    ///
    /// # Errors
    ///
    /// Returns `EquivError::Internal` if the type already has members.
    pub fn define_members(self: &Arc<Self>, defs: Vec<MemberDef>) -> Result<(), EquivError> {
        let members = defs.into_iter().map(|d| d.resolve(self)).collect();
        self.members.set(members).map_err(|_| EquivError::Internal {
            message: format!("members of {} are already defined", self.name),
        })
    }

    /// Item types of every `Enumerable` interface
    pub fn enumerable_item_types(&self) -> Vec<&TypeRef> {
        self.interfaces
            .iter()
            .filter_map(|i| match i {
                Interface::Enumerable { item } => Some(item),
                Interface::Dictionary { .. } => None,
            })
            .collect()
    }

    /// `(key, value)` types of every `Dictionary` interface
    pub fn dictionary_interfaces(&self) -> Vec<(&TypeRef, &TypeRef)> {
        self.interfaces
            .iter()
            .filter_map(|i| match i {
                Interface::Dictionary { key, value } => Some((key, value)),
                Interface::Enumerable { .. } => None,
            })
            .collect()
    }

    /// Whether a value of this type can be stored in a slot of `target`
    pub fn is_assignable_to(&self, target: &TypeDescriptor) -> bool {
        if target.is_object() || self.name == target.name {
            return true;
        }
        let mut current = self.base.as_ref();
        while let Some(base) = current {
            if base.name == target.name {
                return true;
            }
            current = base.base.as_ref();
        }
        false
    }

    /// Loose compatibility used when pairing members by name.
    ///
    /// Assignable in either direction, or both numeric-like (numbers and
    /// enums), since the conversion and enum steps reconcile those.
    pub fn is_compatible_with(&self, other: &TypeDescriptor) -> bool {
        let numeric_like = |t: &TypeDescriptor| t.is_numeric() || t.is_enum();
        self.is_assignable_to(other)
            || other.is_assignable_to(self)
            || (numeric_like(self) && numeric_like(other))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for class and custom collection types
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    base: Option<TypeRef>,
    interfaces: Vec<Interface>,
    members: Vec<MemberDef>,
}

impl TypeBuilder {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn base(mut self, base: &TypeRef) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn implements(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Public read/write property
    pub fn property(self, name: &str, ty: &TypeRef) -> Self {
        self.member(MemberDef::property(name, ty))
    }

    /// Public field
    pub fn field(self, name: &str, ty: &TypeRef) -> Self {
        self.member(MemberDef::field(name, ty))
    }

    /// Public property whose declared type is the type being built
    pub fn self_property(self, name: &str) -> Self {
        self.member(MemberDef::self_property(name))
    }

    pub fn member(mut self, def: MemberDef) -> Self {
        self.members.push(def);
        self
    }

    /// Finish the type, resolving self-typed members
    pub fn build(self) -> TypeRef {
        let (ty, members) = self.split();
        let resolved = members.into_iter().map(|d| d.resolve(&ty)).collect();
        // The cell is fresh, so this cannot fail.
        let _ = ty.members.set(resolved);
        ty
    }

    /// Finish the type without a member table; attach one later with
    /// [`TypeDescriptor::define_members`].
    pub fn build_pending(self) -> TypeRef {
        self.split().0
    }

    fn split(self) -> (TypeRef, Vec<MemberDef>) {
        let mut desc = TypeDescriptor::new(self.name, self.kind);
        desc.base = self.base;
        desc.interfaces = self.interfaces;
        (Arc::new(desc), self.members)
    }
}

/// Process-wide descriptors for the builtin types
pub mod builtin {
    use super::*;

    macro_rules! builtin_type {
        ($fn_name:ident, $name:expr, $kind:expr) => {
            pub fn $fn_name() -> TypeRef {
                static CELL: OnceLock<TypeRef> = OnceLock::new();
                CELL.get_or_init(|| Arc::new(TypeDescriptor::new($name, $kind)))
                    .clone()
            }
        };
    }

    builtin_type!(object, "object", TypeKind::Object);
    builtin_type!(bool, "bool", TypeKind::Primitive(PrimitiveKind::Bool));
    builtin_type!(char, "char", TypeKind::Primitive(PrimitiveKind::Char));
    builtin_type!(i32, "i32", TypeKind::Primitive(PrimitiveKind::I32));
    builtin_type!(i64, "i64", TypeKind::Primitive(PrimitiveKind::I64));
    builtin_type!(u64, "u64", TypeKind::Primitive(PrimitiveKind::U64));
    builtin_type!(f32, "f32", TypeKind::Primitive(PrimitiveKind::F32));
    builtin_type!(f64, "f64", TypeKind::Primitive(PrimitiveKind::F64));
    builtin_type!(string, "string", TypeKind::String);
    builtin_type!(type_type, "Type", TypeKind::Type);

    /// Descriptor for a primitive kind
    pub fn primitive(kind: PrimitiveKind) -> TypeRef {
        match kind {
            PrimitiveKind::Bool => bool(),
            PrimitiveKind::Char => char(),
            PrimitiveKind::I32 => i32(),
            PrimitiveKind::I64 => i64(),
            PrimitiveKind::U64 => u64(),
            PrimitiveKind::F32 => f32(),
            PrimitiveKind::F64 => f64(),
        }
    }
}
