use std::fmt;
use std::sync::Arc;

use crate::context::PositionInfo;
use crate::rules::{normalize_for, PositionPredicate};

/// Decides whether collection order is significant at a position
pub trait OrderingRule: Send + Sync {
    fn applies_to(&self, position: &PositionInfo) -> bool;

    fn describe(&self) -> String;
}

/// Order matters everywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAllOrderingRule;

impl OrderingRule for MatchAllOrderingRule {
    fn applies_to(&self, _position: &PositionInfo) -> bool {
        true
    }

    fn describe(&self) -> String {
        "Always be strict about the collection order".to_string()
    }
}

/// Order matters where a caller predicate holds
pub struct PredicateBasedOrderingRule {
    predicate: PositionPredicate,
    description: String,
}

impl PredicateBasedOrderingRule {
    pub fn new(predicate: PositionPredicate, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }
}

impl OrderingRule for PredicateBasedOrderingRule {
    fn applies_to(&self, position: &PositionInfo) -> bool {
        (self.predicate)(position)
    }

    fn describe(&self) -> String {
        format!("Be strict about the order of collections where {}", self.description)
    }
}

/// Order matters at one path, compared case-insensitively
#[derive(Debug, Clone)]
pub struct PathBasedOrderingRule {
    path: String,
}

impl PathBasedOrderingRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl OrderingRule for PathBasedOrderingRule {
    fn applies_to(&self, position: &PositionInfo) -> bool {
        normalize_for(&self.path, &position.path).eq_ignore_ascii_case(&self.path)
    }

    fn describe(&self) -> String {
        format!("Be strict about the order of items in {}", self.path)
    }
}

/// Strict-ordering rules plus exemptions; an exemption wins over any
/// strict rule at the same position
#[derive(Clone, Default)]
pub struct OrderingRuleCollection {
    strict: Vec<Arc<dyn OrderingRule>>,
    exempt: Vec<Arc<dyn OrderingRule>>,
}

impl OrderingRuleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: Arc<dyn OrderingRule>) {
        self.strict.push(rule);
    }

    pub fn add_exemption(&mut self, rule: Arc<dyn OrderingRule>) {
        self.exempt.push(rule);
    }

    pub fn clear(&mut self) {
        self.strict.clear();
        self.exempt.clear();
    }

    pub fn is_order_strict_for(&self, position: &PositionInfo) -> bool {
        self.strict.iter().any(|r| r.applies_to(position))
            && !self.exempt.iter().any(|r| r.applies_to(position))
    }

    pub fn is_empty(&self) -> bool {
        self.strict.is_empty() && self.exempt.is_empty()
    }

    /// One line per rule, exemptions marked
    pub fn describe(&self) -> Vec<String> {
        self.strict
            .iter()
            .map(|r| r.describe())
            .chain(self.exempt.iter().map(|r| format!("Not: {}", r.describe())))
            .collect()
    }
}

impl fmt::Debug for OrderingRuleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.describe()).finish()
    }
}
