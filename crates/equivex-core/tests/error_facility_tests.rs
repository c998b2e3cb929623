#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{json, person, person_type};
use equivex_core::errors::{EquivError, ExError, ExErrorKind};
use equivex_core::model::{builtin, MemberDef, Object, TypeDescriptor, Value};
use equivex_core::{are_equivalent, assert_equivalent, EquivalencyOptions};
use serde_json::json;

#[test]
fn test_member_read_failure_verifiable_by_kind() {
    let err = EquivError::MemberReadFailed {
        type_name: "Account".to_string(),
        member: "Balance".to_string(),
        reason: "ledger offline".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MemberAccess);
    assert_eq!(ex_err.code(), "ERR_MEMBER_ACCESS");
    assert_eq!(ex_err.member(), Some("Balance"));
    assert!(ex_err.message().contains("ledger offline"));
}

#[test]
fn test_missing_step_is_distinct_from_mismatch() {
    let ex_err: ExError = EquivError::NoStepFound {
        path: "Orders[0]".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::NoStepFound);
    assert!(ex_err.kind().is_defect());
    assert!(!ExErrorKind::NotEquivalent.is_defect());
    assert!(ex_err.to_string().contains("engine defect"));
    assert_eq!(ex_err.path(), Some("Orders[0]"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::InvalidProfile, "ERR_INVALID_PROFILE"),
        (ExErrorKind::MemberAccess, "ERR_MEMBER_ACCESS"),
        (ExErrorKind::NoStepFound, "ERR_NO_STEP_FOUND"),
        (ExErrorKind::NotEquivalent, "ERR_NOT_EQUIVALENT"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_broken_getter_propagates_with_member_path() {
    let ty = TypeDescriptor::class("Account")
        .property("Id", &builtin::i32())
        .member(
            MemberDef::property("Balance", &builtin::f64()).computed(|_, _| {
                Err(EquivError::MemberReadFailed {
                    type_name: "Account".to_string(),
                    member: "Balance".to_string(),
                    reason: "ledger offline".to_string(),
                })
            }),
        )
        .build();
    let holder = TypeDescriptor::class("Holder").property("Account", &ty).build();
    let subject: Value = Object::new(&holder).with("Account", Object::new(&ty)).into();
    let expectation: Value = Object::new(&holder).with("Account", Object::new(&ty)).into();

    let err = are_equivalent(&subject, &expectation, &EquivalencyOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MemberAccess);
    assert_eq!(err.path(), Some("Account.Balance"));
    assert_eq!(err.member(), Some("Balance"));
    assert!(err.session_id().is_some());
}

#[test]
fn test_computed_members_are_compared() {
    let ty = TypeDescriptor::class("Rect")
        .property("W", &builtin::i32())
        .property("H", &builtin::i32())
        .member(MemberDef::property("Area", &builtin::i32()).computed(|obj, _| {
            let w = obj.get("W").and_then(|v| v.as_i64()).unwrap_or(0);
            let h = obj.get("H").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(Value::I64(w * h))
        }))
        .build();
    let subject: Value = Object::new(&ty).with("W", 2).with("H", 6).into();
    let expectation: Value = Object::new(&ty).with("W", 3).with("H", 4).into();

    let report = are_equivalent(&subject, &expectation, &EquivalencyOptions::default()).unwrap();
    let mut paths: Vec<_> = report.failures.iter().map(|f| f.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["H", "W"]);
}

#[test]
fn test_assert_equivalent_collects_every_failure() {
    let ty = person_type();
    let err = assert_equivalent(
        &person(&ty, "Ada", 1),
        &person(&ty, "Bob", 2),
        &EquivalencyOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotEquivalent);
    assert_eq!(err.message().lines().count(), 2);

    assert!(assert_equivalent(
        &json(json!({"a": 1})),
        &json(json!({"a": 1})),
        &EquivalencyOptions::default()
    )
    .is_ok());
}
