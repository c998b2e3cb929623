use equivex_core::model::{builtin, from_json, Object, Sequence, TypeDescriptor, TypeRef, Value};
use equivex_core::{are_equivalent, EquivalencyOptions, EquivalencyReport};

/// Compare two values, panicking on host errors
#[allow(dead_code)]
pub fn compare(subject: &Value, expectation: &Value, options: &EquivalencyOptions) -> EquivalencyReport {
    are_equivalent(subject, expectation, options).expect("comparison should not raise a host error")
}

/// Object model value of an inline JSON document
#[allow(dead_code)]
pub fn json(value: serde_json::Value) -> Value {
    from_json(&value)
}

/// Paths of every failure in the report, in report order
#[allow(dead_code)]
pub fn failure_paths(report: &EquivalencyReport) -> Vec<String> {
    report.failures.iter().map(|f| f.path.clone()).collect()
}

/// `Person { Name: string, Age: i32 }`
#[allow(dead_code)]
pub fn person_type() -> TypeRef {
    TypeDescriptor::class("Person")
        .property("Name", &builtin::string())
        .property("Age", &builtin::i32())
        .build()
}

#[allow(dead_code)]
pub fn person(ty: &TypeRef, name: &str, age: i32) -> Value {
    Object::new(ty).with("Name", name).with("Age", age).into()
}

/// `Node { Value: i32, Next: Node }`
#[allow(dead_code)]
pub fn node_type() -> TypeRef {
    TypeDescriptor::class("Node")
        .property("Value", &builtin::i32())
        .self_property("Next")
        .build()
}

/// A singly linked chain of `length` nodes, numbered from zero
#[allow(dead_code)]
pub fn chain(ty: &TypeRef, length: usize) -> Value {
    let mut next = Value::Null;
    for i in (0..length).rev() {
        let value = i32::try_from(i).expect("chain length fits in i32");
        next = Object::new(ty).with("Value", value).with("Next", next).into();
    }
    next
}

/// A node whose `Next` points back at itself
#[allow(dead_code)]
pub fn self_loop(ty: &TypeRef, value: i32) -> Value {
    let node = Object::new(ty).with("Value", value);
    node.set("Next", node.clone());
    node.into()
}

#[allow(dead_code)]
pub fn ints(values: &[i32]) -> Value {
    Sequence::of(values.iter().copied().map(Value::I32).collect()).into()
}
