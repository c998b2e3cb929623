//! Pairing subject items with expectation items
//!
//! Lengths are compared first. Strict ordering pairs items by index. Loose
//! ordering takes, for each expectation item, the first unmatched subject
//! item that compares cleanly; when none does, the closest candidate's
//! failures are reported. The search is greedy and never backtracks, so
//! the pairing it reports is not necessarily the minimum-cost one.

use crate::context::ValidationContext;
use crate::errors::Result;
use crate::model::{TypeRef, Value};
use crate::scope::Failure;
use crate::validator::EquivalencyValidator;

/// Compare two materialized collections at `context`
///
/// # Errors
///
/// Propagates host errors raised while comparing items.
pub fn assert_collection_equivalence(
    validator: &mut EquivalencyValidator<'_>,
    context: &ValidationContext,
    subject: &[Value],
    expectation: &[Value],
    item_type: &TypeRef,
) -> Result<()> {
    let options = validator.options();

    if subject.len() != expectation.len() {
        validator.scope().fail_with(
            "Expected {context:collection} to be a collection with {0} item(s){reason}, but it contains {1} item(s).",
            &[len_value(expectation.len()), len_value(subject.len())],
        );
        return Ok(());
    }

    let strict = options
        .ordering_rules()
        .is_order_strict_for(&context.position());
    let recursive = context.is_root() || options.is_recursive();

    tracing::trace!(
        path = context.path(),
        item_count = subject.len(),
        strict,
        recursive,
        "comparing collection"
    );

    if !recursive {
        let equal = if strict {
            subject.iter().zip(expectation).all(|(s, e)| s.leaf_equals(e))
        } else {
            is_same_multiset(subject, expectation)
        };
        validator.scope().for_condition(equal).fail_with(
            "Expected {context:collection} to be equal to {0}{reason}, but found {1}.",
            &[context.expectation().clone(), context.subject().clone()],
        );
        return Ok(());
    }

    if strict {
        for (index, (s, e)) in subject.iter().zip(expectation).enumerate() {
            let item = context.for_collection_item(&index.to_string(), s.clone(), e.clone(), item_type);
            validator.assert_equality_using(&item)?;
        }
        return Ok(());
    }

    loose_match(validator, context, subject, expectation, item_type)
}

fn loose_match(
    validator: &mut EquivalencyValidator<'_>,
    context: &ValidationContext,
    subject: &[Value],
    expectation: &[Value],
    item_type: &TypeRef,
) -> Result<()> {
    let mut consumed = vec![false; subject.len()];

    for (e_index, expected) in expectation.iter().enumerate() {
        let label = e_index.to_string();
        let mut closest: Option<(usize, Vec<Failure>)> = None;
        let mut matched = false;

        for (s_index, actual) in subject.iter().enumerate() {
            if consumed[s_index] {
                continue;
            }

            let item = context.for_collection_item(&label, actual.clone(), expected.clone(), item_type);
            let mark = validator.checkpoint();
            validator.assert_equality_using(&item)?;

            if validator.failures_since(mark) == 0 {
                consumed[s_index] = true;
                matched = true;
                break;
            }

            let failures = validator.rollback(mark);
            let better = match &closest {
                None => true,
                Some((best_index, best)) => {
                    failures.len() < best.len()
                        || (failures.len() == best.len() && s_index == e_index && *best_index != e_index)
                }
            };
            if better {
                closest = Some((s_index, failures));
            }
        }

        if matched {
            continue;
        }
        if let Some((s_index, failures)) = closest {
            tracing::debug!(
                path = context.path(),
                expectation_index = e_index,
                subject_index = s_index,
                failure_count = failures.len(),
                "closest match reported"
            );
            validator.scope().add_failures(failures);
        }
    }
    Ok(())
}

/// Every item of `a` pairs with a leaf-equal item of `b`
fn is_same_multiset(a: &[Value], b: &[Value]) -> bool {
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        match b
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && item.leaf_equals(other))
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn len_value(len: usize) -> Value {
    Value::I64(i64::try_from(len).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiset_respects_multiplicity() {
        let a = [Value::I32(1), Value::I32(1), Value::I32(2)];
        let b = [Value::I32(2), Value::I32(1), Value::I32(1)];
        let c = [Value::I32(1), Value::I32(2), Value::I32(2)];
        assert!(is_same_multiset(&a, &b));
        assert!(!is_same_multiset(&a, &c));
    }
}
