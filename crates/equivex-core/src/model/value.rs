//! Dynamic values compared by the engine
//!
//! Scalars are held inline. Objects, sequences, maps and arrays are
//! reference nodes behind `Rc`: cloning a [`Value`] shares the node, and the
//! node's address is its identity for reference-equality and cycle checks.
//! Object, sequence and map nodes are interior-mutable so cyclic graphs can
//! be built by assigning a member after construction.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::EquivError;
use crate::model::types::{builtin, TypeDescriptor, TypeRef};

/// A value of an enum type
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub ty: TypeRef,
    pub value: i64,
}

impl EnumValue {
    pub fn new(ty: &TypeRef, value: i64) -> Self {
        Self {
            ty: ty.clone(),
            value,
        }
    }

    /// Value of the named constant of `ty`
    pub fn named(ty: &TypeRef, name: &str) -> Option<Self> {
        ty.enum_variants()
            .iter()
            .find(|v| v.name == name)
            .map(|v| Self::new(ty, v.value))
    }

    pub fn name(&self) -> Option<&str> {
        self.ty.variant_name(self.value)
    }

    /// Constant name, or the number for values without one
    pub fn display_name(&self) -> String {
        self.name()
            .map(str::to_string)
            .unwrap_or_else(|| self.value.to_string())
    }
}

struct ObjectNode {
    ty: TypeRef,
    values: RefCell<BTreeMap<String, Value>>,
}

/// Instance of a class type
#[derive(Clone)]
pub struct Object(Rc<ObjectNode>);

impl Object {
    pub fn new(ty: &TypeRef) -> Self {
        Object(Rc::new(ObjectNode {
            ty: ty.clone(),
            values: RefCell::new(BTreeMap::new()),
        }))
    }

    /// Assign a stored member and return the object, for building literals
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.0
            .values
            .borrow_mut()
            .insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.values.borrow().get(name).cloned()
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

struct SequenceNode {
    ty: TypeRef,
    items: RefCell<Vec<Value>>,
}

/// Ordered collection exposing an `Enumerable` interface
#[derive(Clone)]
pub struct Sequence(Rc<SequenceNode>);

impl Sequence {
    pub fn new(ty: &TypeRef, items: Vec<Value>) -> Self {
        Sequence(Rc::new(SequenceNode {
            ty: ty.clone(),
            items: RefCell::new(items),
        }))
    }

    /// `List<T>` where `T` is the common runtime type of the items
    pub fn of(items: Vec<Value>) -> Self {
        let item = common_type(items.iter());
        Self::new(&TypeDescriptor::list(&item), items)
    }

    pub fn push(&self, item: impl Into<Value>) {
        self.0.items.borrow_mut().push(item.into());
    }

    /// Snapshot of the items
    pub fn items(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

struct MapNode {
    ty: TypeRef,
    entries: RefCell<Vec<(Value, Value)>>,
}

/// Insertion-ordered dictionary keyed by leaf equality
#[derive(Clone)]
pub struct Map(Rc<MapNode>);

impl Map {
    pub fn new(ty: &TypeRef) -> Self {
        Map(Rc::new(MapNode {
            ty: ty.clone(),
            entries: RefCell::new(Vec::new()),
        }))
    }

    /// `Dictionary<K, V>` inferred from the entries
    pub fn of(entries: Vec<(Value, Value)>) -> Self {
        let key = common_type(entries.iter().map(|(k, _)| k));
        let value = common_type(entries.iter().map(|(_, v)| v));
        let map = Self::new(&TypeDescriptor::dictionary(&key, &value));
        for (k, v) in entries {
            map.insert(k, v);
        }
        map
    }

    /// Insert or replace the entry for `key`
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| k.leaf_equals(&key)) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0
            .entries
            .borrow()
            .iter()
            .find(|(k, _)| k.leaf_equals(key))
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.entries.borrow().iter().any(|(k, _)| k.leaf_equals(key))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

struct ArrayNode {
    ty: TypeRef,
    lengths: Vec<usize>,
    items: Vec<Value>,
}

/// Rectangular array of any rank, stored row-major
#[derive(Clone)]
pub struct Array(Rc<ArrayNode>);

impl Array {
    /// # Errors
    ///
    /// Returns `EquivError::InvalidArrayShape` when `items` does not hold
    /// exactly the product of `lengths` values.
    pub fn new(element: &TypeRef, lengths: Vec<usize>, items: Vec<Value>) -> Result<Self, EquivError> {
        let expected: usize = lengths.iter().product();
        if lengths.is_empty() || expected != items.len() {
            return Err(EquivError::InvalidArrayShape {
                lengths,
                expected,
                actual: items.len(),
            });
        }
        let ty = TypeDescriptor::array(element, lengths.len());
        Ok(Array(Rc::new(ArrayNode { ty, lengths, items })))
    }

    /// One-dimensional array
    pub fn of(element: &TypeRef, items: Vec<Value>) -> Self {
        let ty = TypeDescriptor::array(element, 1);
        let lengths = vec![items.len()];
        Array(Rc::new(ArrayNode { ty, lengths, items }))
    }

    pub fn rank(&self) -> usize {
        self.0.lengths.len()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.0.lengths
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }

    /// Row-major elements
    pub fn items(&self) -> &[Value] {
        &self.0.items
    }

    /// Element at a full set of indices
    pub fn get(&self, indices: &[usize]) -> Option<&Value> {
        if indices.len() != self.rank() {
            return None;
        }
        let mut offset = 0;
        for (index, length) in indices.iter().zip(&self.0.lengths) {
            if index >= length {
                return None;
            }
            offset = offset * length + index;
        }
        self.0.items.get(offset)
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// Any value the engine can compare
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(Rc<str>),
    Enum(EnumValue),
    Type(TypeRef),
    Object(Object),
    Sequence(Sequence),
    Map(Map),
    Array(Array),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type, `None` for null
    pub fn runtime_type(&self) -> Option<TypeRef> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => builtin::bool(),
            Value::Char(_) => builtin::char(),
            Value::I32(_) => builtin::i32(),
            Value::I64(_) => builtin::i64(),
            Value::U64(_) => builtin::u64(),
            Value::F32(_) => builtin::f32(),
            Value::F64(_) => builtin::f64(),
            Value::Str(_) => builtin::string(),
            Value::Enum(e) => e.ty.clone(),
            Value::Type(_) => builtin::type_type(),
            Value::Object(o) => o.type_ref().clone(),
            Value::Sequence(s) => s.type_ref().clone(),
            Value::Map(m) => m.type_ref().clone(),
            Value::Array(a) => a.type_ref().clone(),
        })
    }

    /// Short name of the value's variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::Enum(_) => "enum",
            Value::Type(_) => "type",
            Value::Object(_) => "object",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
        }
    }

    /// Node address for reference values, `None` for scalars
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(o.identity()),
            Value::Sequence(s) => Some(s.identity()),
            Value::Map(m) => Some(m.identity()),
            Value::Array(a) => Some(a.identity()),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.identity().is_some()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I32(_) | Value::I64(_) | Value::U64(_) | Value::F32(_) | Value::F64(_)
        )
    }

    /// Exact integral value of numeric and enum values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::Enum(e) => Some(e.value),
            Value::F32(v) => exact_integral(f64::from(*v)),
            Value::F64(v) => exact_integral(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I32(v) => Some(f64::from(*v)),
            Value::I64(v) => Some(*v as f64),
            Value::U64(v) => Some(*v as f64),
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Items of a sequence or a one-dimensional array
    pub fn items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Sequence(s) => Some(s.items()),
            Value::Array(a) if a.rank() == 1 => Some(a.items().to_vec()),
            _ => None,
        }
    }

    /// Plain equality with no structural recursion.
    ///
    /// Scalars compare by variant and value, with `NaN` equal to itself.
    /// Enums compare by type and number, types by name, and reference
    /// values by identity.
    pub fn leaf_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a.ty == b.ty && a.value == b.value,
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

fn exact_integral(v: f64) -> Option<i64> {
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Shared runtime type of `values`, `object` when they disagree or are all null
fn common_type<'a>(values: impl Iterator<Item = &'a Value>) -> TypeRef {
    let mut common: Option<TypeRef> = None;
    for ty in values.filter_map(Value::runtime_type) {
        match &common {
            None => common = Some(ty),
            Some(c) if c.name() == ty.name() => {}
            Some(_) => return builtin::object(),
        }
    }
    common.unwrap_or_else(builtin::object)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Char(v) => write!(f, "Char({v:?})"),
            Value::I32(v) => write!(f, "I32({v})"),
            Value::I64(v) => write!(f, "I64({v})"),
            Value::U64(v) => write!(f, "U64({v})"),
            Value::F32(v) => write!(f, "F32({v})"),
            Value::F64(v) => write!(f, "F64({v})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Enum(e) => write!(f, "Enum({}.{})", e.ty.name(), e.display_name()),
            Value::Type(t) => write!(f, "Type({})", t.name()),
            Value::Object(o) => write!(f, "Object({})", o.type_ref().name()),
            Value::Sequence(s) => write!(f, "Sequence({}, len {})", s.type_ref().name(), s.len()),
            Value::Map(m) => write!(f, "Map({}, len {})", m.type_ref().name(), m.len()),
            Value::Array(a) => write!(f, "Array({}, {:?})", a.type_ref().name(), a.lengths()),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from!(
    bool => Bool,
    char => Char,
    i32 => I32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    EnumValue => Enum,
    TypeRef => Type,
    Object => Object,
    Sequence => Sequence,
    Map => Map,
    Array => Array,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Rc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
