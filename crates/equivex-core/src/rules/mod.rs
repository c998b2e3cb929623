//! Member selection, member matching and collection ordering rules
//!
//! Selection rules run as a chain, each transforming the running member
//! set. Matching rules are tried in order and the first match wins.
//! Ordering rules decide per position whether collection order matters.

pub mod matching;
pub mod ordering;
pub mod selection;

use std::sync::Arc;

use crate::context::{strip_index_qualifiers, PositionInfo};

pub use matching::{MemberMatchingRule, MustMatchByNameRule, TryMatchByNameRule};
pub use ordering::{
    MatchAllOrderingRule, OrderingRule, OrderingRuleCollection, PathBasedOrderingRule,
    PredicateBasedOrderingRule,
};
pub use selection::{
    ExcludeMemberByPathRule, ExcludeMemberByPredicateRule, IncludeAllMembersRule,
    IncludeMemberByPathRule, IncludeMemberByPredicateRule, MemberSelectionContext,
    MemberSelectionRule,
};

/// Caller predicate over a position
pub type PositionPredicate = Arc<dyn Fn(&PositionInfo) -> bool + Send + Sync>;

/// Normalize `candidate` for comparison against a configured path.
///
/// Index qualifiers are ignored when the configured path has none, so
/// `Orders.Id` applies to every element of `Orders`.
pub(crate) fn normalize_for(configured: &str, candidate: &str) -> String {
    if configured.contains('[') {
        candidate.to_string()
    } else {
        strip_index_qualifiers(candidate)
    }
}

/// `prefix` is `path` itself or an ancestor of it
pub(crate) fn is_same_or_ancestor(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}
