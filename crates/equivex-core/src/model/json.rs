//! JSON documents as object graphs
//!
//! JSON objects become class instances of an anonymous type named after
//! their sorted key set, with every member declared as `object` so the
//! engine resolves members against the run-time value. Arrays become
//! `List<object>` sequences.

use crate::model::member::MemberDef;
use crate::model::types::{builtin, TypeDescriptor, TypeRef};
use crate::model::value::{Object, Sequence, Value};

/// Convert a JSON document into a fresh object graph.
///
/// Every call builds new nodes, so two conversions of the same document
/// share no references.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::str(s),
        serde_json::Value::Array(items) => {
            let items = items.iter().map(from_json).collect();
            Value::Sequence(Sequence::new(&object_list(), items))
        }
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let ty = anonymous_type(&keys);
            let object = Object::new(&ty);
            for (key, value) in map {
                object.set(key, from_json(value));
            }
            Value::Object(object)
        }
    }
}

fn object_list() -> TypeRef {
    TypeDescriptor::list(&builtin::object())
}

fn anonymous_type(keys: &[&String]) -> TypeRef {
    let name = format!(
        "{{{}}}",
        keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
    );
    let object = builtin::object();
    keys.iter()
        .fold(TypeDescriptor::class(name), |builder, key| {
            builder.member(MemberDef::property(key, &object))
        })
        .build()
}
