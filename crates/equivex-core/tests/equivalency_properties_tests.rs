#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{chain, compare, failure_paths, ints, json, node_type, person, person_type, self_loop};
use equivex_core::model::{builtin, EnumValue, Map, MemberSet, Object, TypeDescriptor, TypeRef, Value};
use equivex_core::rules::MemberSelectionContext;
use equivex_core::{EquivalencyOptions, FailureKind};
use serde_json::json;

#[test]
fn test_value_is_equivalent_to_itself() {
    let options = EquivalencyOptions::default();
    let ty = person_type();
    let values = vec![
        Value::Null,
        Value::I32(3),
        Value::F64(f64::NAN),
        Value::str("text"),
        person(&ty, "Ada", 36),
        ints(&[1, 2, 3]),
        json(json!({"a": [1, {"b": null}], "c": "d"})),
    ];
    for v in &values {
        assert!(compare(v, v, &options).is_equivalent(), "{:?}", v);
    }

    let looped = self_loop(&node_type(), 1);
    let ignoring = EquivalencyOptions::default().ignoring_cyclic_references();
    assert!(compare(&looped, &looped, &ignoring).is_equivalent());
}

#[test]
fn test_length_mismatch_reports_only_the_length() {
    let report = compare(&ints(&[1, 2, 3]), &ints(&[1, 2]), &EquivalencyOptions::default());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("2 item(s)"));
    assert!(report.failures[0].message.contains("contains 3 item(s)"));
}

#[test]
fn test_loose_matching_ignores_order_and_strict_does_not() {
    let subject = json(json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]));
    let expectation = json(json!([{"id": 2, "name": "b"}, {"id": 1, "name": "a"}]));

    let loose = compare(&subject, &expectation, &EquivalencyOptions::default());
    assert!(loose.is_equivalent(), "{}", loose);

    let strict = compare(
        &subject,
        &expectation,
        &EquivalencyOptions::default().with_strict_ordering(),
    );
    assert!(!strict.is_equivalent());
    assert!(failure_paths(&strict).iter().any(|p| p == "[0].id"));
}

#[test]
fn test_strict_ordering_pins_scalars_by_index() {
    let strict = EquivalencyOptions::default().with_strict_ordering();
    let report = compare(&ints(&[1, 2]), &ints(&[2, 1]), &strict);
    assert_eq!(failure_paths(&report), vec!["[0]", "[1]"]);

    assert!(compare(&ints(&[1, 2]), &ints(&[2, 1]), &EquivalencyOptions::default()).is_equivalent());
}

#[test]
fn test_cyclic_reference_is_reported_unless_ignored() {
    let ty = node_type();
    let subject = self_loop(&ty, 1);
    let expectation = self_loop(&ty, 1);

    let report = compare(&subject, &expectation, &EquivalencyOptions::default());
    assert!(!report.is_equivalent());
    let guards: Vec<_> = report.failures_of(FailureKind::Guard).collect();
    assert_eq!(guards.len(), 1);
    assert_eq!(guards[0].path, "Next");
    assert!(guards[0].message.contains("cyclic reference"));

    let ignoring = EquivalencyOptions::default().ignoring_cyclic_references();
    assert!(compare(&subject, &expectation, &ignoring).is_equivalent());
}

/// `levels` objects nested through the member `n`, innermost holding `1`
fn nested_objects(levels: usize) -> serde_json::Value {
    (0..levels).fold(json!(1), |inner, _| json!({ "n": inner }))
}

/// `levels` single-item lists nested inside each other
fn nested_lists(levels: usize) -> serde_json::Value {
    (0..levels).fold(json!(1), |inner, _| json!([inner]))
}

fn separators(path: &str) -> usize {
    path.matches('.').count()
}

#[test]
fn test_depth_limit_trips_on_long_chains() {
    let ty = node_type();

    // Eleven nodes put the deepest members at `Next` x 10 plus one more
    // segment: ten separators, exactly at the limit.
    let at_limit = chain(&ty, 11);
    assert!(compare(&at_limit, &chain(&ty, 11), &EquivalencyOptions::default()).is_equivalent());

    let past_limit = chain(&ty, 12);
    let report = compare(&past_limit, &chain(&ty, 12), &EquivalencyOptions::default());
    let guards: Vec<_> = report.failures_of(FailureKind::Guard).collect();
    assert!(!guards.is_empty());
    assert!(guards.iter().all(|g| separators(&g.path) == 11));
    assert!(guards[0].message.contains("maximum recursion depth of 10"));

    let unlimited = EquivalencyOptions::default().allowing_infinite_recursion();
    assert!(compare(&past_limit, &chain(&ty, 12), &unlimited).is_equivalent());

    let short = chain(&ty, 5);
    assert!(compare(&short, &chain(&ty, 5), &EquivalencyOptions::default()).is_equivalent());
}

#[test]
fn test_depth_limit_counts_member_separators() {
    let options = EquivalencyOptions::default();

    let at_limit = compare(&json(nested_objects(11)), &json(nested_objects(11)), &options);
    assert!(at_limit.is_equivalent(), "{}", at_limit);

    let report = compare(&json(nested_objects(12)), &json(nested_objects(12)), &options);
    assert_eq!(failure_paths(&report), vec![vec!["n"; 12].join(".")]);
    assert_eq!(report.failures[0].kind, FailureKind::Guard);

    let lowered = EquivalencyOptions::default().with_max_recursion_depth(3);
    assert!(compare(&json(nested_objects(4)), &json(nested_objects(4)), &lowered).is_equivalent());
    assert!(!compare(&json(nested_objects(5)), &json(nested_objects(5)), &lowered).is_equivalent());
}

#[test]
fn test_depth_limit_counts_index_boundaries() {
    let options = EquivalencyOptions::default();

    let at_limit = compare(&json(nested_lists(11)), &json(nested_lists(11)), &options);
    assert!(at_limit.is_equivalent(), "{}", at_limit);

    let report = compare(&json(nested_lists(12)), &json(nested_lists(12)), &options);
    let guards: Vec<_> = report.failures_of(FailureKind::Guard).collect();
    assert!(!guards.is_empty());
    assert!(guards.iter().all(|g| g.path == "[0]".repeat(12)));
}

#[test]
fn test_dictionary_key_mismatches_name_the_key() {
    let options = EquivalencyOptions::default();

    let report = compare(
        &Map::of(vec![(Value::I32(1), Value::str("a"))]).into(),
        &Map::of(vec![(Value::I32(2), Value::str("a"))]).into(),
        &options,
    );
    assert!(report
        .failures
        .iter()
        .any(|f| f.message.contains("to contain key 2")));

    let report = compare(
        &Map::of(vec![
            (Value::I32(1), Value::str("a")),
            (Value::I32(2), Value::str("b")),
        ])
        .into(),
        &Map::of(vec![(Value::I32(1), Value::str("a"))]).into(),
        &options,
    );
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("not to contain key 2"));
}

#[test]
fn test_nested_values_are_compared_per_key() {
    let report = compare(
        &json(json!({"totals": {"a": 1, "b": 2}})),
        &json(json!({"totals": {"a": 1, "b": 3}})),
        &EquivalencyOptions::default(),
    );
    assert_eq!(failure_paths(&report), vec!["totals.b"]);

    let subject = Map::of(vec![(Value::str("x"), Value::I32(1))]);
    let expectation = Map::of(vec![(Value::str("x"), Value::I32(2))]);
    let report = compare(&subject.into(), &expectation.into(), &EquivalencyOptions::default());
    assert_eq!(failure_paths(&report), vec!["[x]"]);
    assert!(report.failures[0].description.starts_with("pair"));
}

#[test]
fn test_enum_modes() {
    let color = TypeDescriptor::enumeration("Color", &[("Red", 0), ("Blue", 1)]);
    let tone = TypeDescriptor::enumeration("Tone", &[("Warm", 0)]);
    let red: Value = EnumValue::new(&color, 0).into();
    let warm: Value = EnumValue::new(&tone, 0).into();

    assert!(compare(&red, &warm, &EquivalencyOptions::default()).is_equivalent());
    let by_name = compare(&red, &warm, &EquivalencyOptions::default().comparing_enums_by_name());
    assert_eq!(by_name.failures.len(), 1);
    assert!(by_name.failures[0].message.contains("Tone.Warm"));
}

#[test]
fn test_missing_member_policy() {
    let subject = json(json!({"a": 1, "b": 2}));
    let expectation = json(json!({"a": 1}));

    let report = compare(&subject, &expectation, &EquivalencyOptions::default());
    assert_eq!(failure_paths(&report), vec!["b"]);
    assert!(report.failures[0].message.contains("does not have"));

    let lenient = EquivalencyOptions::default().excluding_missing_members();
    assert!(compare(&subject, &expectation, &lenient).is_equivalent());
}

#[test]
fn test_inclusion_by_path_is_idempotent() {
    let ty = person_type();
    let once = EquivalencyOptions::default().including("Name");
    let twice = EquivalencyOptions::default().including("Name").including("Name");

    let select = |options: &EquivalencyOptions| {
        let context = MemberSelectionContext {
            path: "",
            selected_type: &ty,
            filter: options.member_filter(),
            is_root: true,
        };
        options
            .selection_rules()
            .iter()
            .fold(MemberSet::new(), |set, rule| rule.select_members(set, &context))
            .into_vec()
            .into_iter()
            .map(|m| m.name().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(select(&once), vec!["Name"]);
    assert_eq!(select(&once), select(&twice));

    let report = compare(&person(&ty, "Ada", 1), &person(&ty, "Bob", 2), &twice);
    assert_eq!(failure_paths(&report), vec!["Name"]);
}

#[test]
fn test_sibling_mismatches_are_all_reported() {
    let ty = person_type();
    let report = compare(
        &person(&ty, "Ada", 36),
        &person(&ty, "Bob", 40),
        &EquivalencyOptions::default(),
    );
    let mut paths = failure_paths(&report);
    paths.sort();
    assert_eq!(paths, vec!["Age", "Name"]);
}

#[test]
fn test_null_mismatches() {
    let ty = person_type();
    let report = compare(&Value::Null, &person(&ty, "Ada", 1), &EquivalencyOptions::default());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("<null>"));

    let report = compare(
        &json(json!({"name": "Ada"})),
        &json(json!({"name": null})),
        &EquivalencyOptions::default(),
    );
    assert_eq!(failure_paths(&report), vec!["name"]);
}

#[test]
fn test_type_valued_members_compare_by_type_name() {
    let handler = TypeDescriptor::class("Handler")
        .property("Accepts", &builtin::type_type())
        .build();
    let accepting = |ty: TypeRef| -> Value { Object::new(&handler).with("Accepts", Value::Type(ty)).into() };
    let options = EquivalencyOptions::default();

    assert!(compare(&accepting(builtin::i32()), &accepting(builtin::i32()), &options).is_equivalent());

    let report = compare(&accepting(builtin::i32()), &accepting(builtin::string()), &options);
    assert_eq!(failure_paths(&report), vec!["Accepts"]);

    let mismatched: Value = Object::new(&handler).with("Accepts", "i32").into();
    let report = compare(&accepting(builtin::i32()), &mismatched, &options);
    assert_eq!(failure_paths(&report), vec!["Accepts"]);
}
