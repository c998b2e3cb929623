//! Equivalency options
//!
//! [`EquivalencyOptions`] is a consuming builder. Once built it is borrowed
//! immutably by the validator for the whole comparison.
//!
//! ```
//! use equivex_core::options::EquivalencyOptions;
//!
//! let options = EquivalencyOptions::default()
//!     .excluding("Audit.Timestamp")
//!     .with_strict_ordering_for("Lines")
//!     .ignoring_cyclic_references();
//! assert!(options.to_string().contains("Exclude member Audit.Timestamp"));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::{PositionInfo, ValidationContext};
use crate::formatter::{DefaultValueFormatter, ValueFormatter};
use crate::model::{MemberFilter, TypeRef};
use crate::rules::{
    ExcludeMemberByPathRule, ExcludeMemberByPredicateRule, IncludeAllMembersRule,
    IncludeMemberByPathRule, IncludeMemberByPredicateRule, MatchAllOrderingRule,
    MemberMatchingRule, MemberSelectionRule, MustMatchByNameRule, OrderingRule,
    OrderingRuleCollection, PathBasedOrderingRule, PositionPredicate,
    PredicateBasedOrderingRule, TryMatchByNameRule,
};
use crate::scope::AssertionScope;
use crate::steps::{EquivalencyStep, RuleBasedStep};

pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 10;

/// What to do when the walk reaches a node it is already comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclicReferenceHandling {
    /// Report a guard failure
    #[serde(alias = "throw")]
    ThrowException,
    /// Treat the position as equivalent and stop descending
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEquivalenceHandling {
    ByValue,
    ByName,
}

/// Which type's members are selected for an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberResolution {
    /// The declared type at the position
    Declared,
    /// The run-time type of the subject
    Runtime,
}

/// Replacement comparison registered with [`EquivalencyOptions::using_when`]
pub type AssertionAction = Arc<dyn Fn(&ValidationContext, &mut AssertionScope) + Send + Sync>;

#[derive(Clone)]
pub struct EquivalencyOptions {
    selection_rules: Vec<Arc<dyn MemberSelectionRule>>,
    matching_rules: Vec<Arc<dyn MemberMatchingRule>>,
    ordering_rules: OrderingRuleCollection,
    user_steps: Vec<Arc<dyn EquivalencyStep>>,
    recursive: bool,
    allow_infinite_recursion: bool,
    max_recursion_depth: usize,
    cyclic_reference_handling: CyclicReferenceHandling,
    enum_equivalence: EnumEquivalenceHandling,
    member_resolution: MemberResolution,
    member_filter: MemberFilter,
    auto_conversion: bool,
    string_conversion: bool,
    formatter: Arc<dyn ValueFormatter>,
}

impl Default for EquivalencyOptions {
    /// Recursive, all declared members, members must match by name,
    /// collection order ignored, cyclic references reported, enums by value.
    fn default() -> Self {
        Self {
            selection_rules: vec![Arc::new(IncludeAllMembersRule)],
            matching_rules: vec![Arc::new(MustMatchByNameRule)],
            ..Self::empty()
        }
        .including_nested_objects()
    }
}

impl EquivalencyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// No selection or matching rules and no recursion; callers opt in to
    /// everything
    pub fn empty() -> Self {
        Self {
            selection_rules: Vec::new(),
            matching_rules: Vec::new(),
            ordering_rules: OrderingRuleCollection::new(),
            user_steps: Vec::new(),
            recursive: false,
            allow_infinite_recursion: false,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            cyclic_reference_handling: CyclicReferenceHandling::ThrowException,
            enum_equivalence: EnumEquivalenceHandling::ByValue,
            member_resolution: MemberResolution::Declared,
            member_filter: MemberFilter::ALL,
            auto_conversion: true,
            string_conversion: false,
            formatter: Arc::new(DefaultValueFormatter::default()),
        }
    }

    // ---- accessors ----

    pub fn selection_rules(&self) -> &[Arc<dyn MemberSelectionRule>] {
        &self.selection_rules
    }

    pub fn matching_rules(&self) -> &[Arc<dyn MemberMatchingRule>] {
        &self.matching_rules
    }

    pub fn ordering_rules(&self) -> &OrderingRuleCollection {
        &self.ordering_rules
    }

    /// User steps in registration order
    pub fn user_steps(&self) -> &[Arc<dyn EquivalencyStep>] {
        &self.user_steps
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn allows_infinite_recursion(&self) -> bool {
        self.allow_infinite_recursion
    }

    pub fn max_recursion_depth(&self) -> usize {
        self.max_recursion_depth
    }

    pub fn cyclic_reference_handling(&self) -> CyclicReferenceHandling {
        self.cyclic_reference_handling
    }

    pub fn enum_equivalence(&self) -> EnumEquivalenceHandling {
        self.enum_equivalence
    }

    pub fn member_resolution(&self) -> MemberResolution {
        self.member_resolution
    }

    pub fn member_filter(&self) -> MemberFilter {
        self.member_filter
    }

    pub fn auto_conversion(&self) -> bool {
        self.auto_conversion
    }

    pub fn string_conversion(&self) -> bool {
        self.auto_conversion && self.string_conversion
    }

    pub fn value_formatter(&self) -> Arc<dyn ValueFormatter> {
        Arc::clone(&self.formatter)
    }

    // ---- member selection ----

    /// Compare only the member at `path` (and what leads to and lies below
    /// it). Replaces the blanket inclusion of all members.
    pub fn including(self, path: impl Into<String>) -> Self {
        self.without_default_inclusion()
            .add_selection_rule(Arc::new(IncludeMemberByPathRule::new(path)))
    }

    /// Compare only members matching `predicate`
    pub fn including_where<F>(self, description: &str, predicate: F) -> Self
    where
        F: Fn(&PositionInfo) -> bool + Send + Sync + 'static,
    {
        self.without_default_inclusion()
            .add_selection_rule(Arc::new(IncludeMemberByPredicateRule::new(
                Arc::new(predicate),
                description,
            )))
    }

    /// Skip the member at `path` and everything below it.
    ///
    /// A path without index qualifiers ignores every index in the candidate
    /// path, not only a leading one: `Lines.Note` excludes `Lines[3].Note`
    /// and `[0].Lines[1].Note` alike. Qualify the path (`Lines[3].Note`) to
    /// target one element.
    pub fn excluding(self, path: impl Into<String>) -> Self {
        self.add_selection_rule(Arc::new(ExcludeMemberByPathRule::new(path)))
    }

    pub fn excluding_where<F>(self, description: &str, predicate: F) -> Self
    where
        F: Fn(&PositionInfo) -> bool + Send + Sync + 'static,
    {
        self.add_selection_rule(Arc::new(ExcludeMemberByPredicateRule::new(
            Arc::new(predicate),
            description,
        )))
    }

    /// Select members of the declared type at each position
    pub fn including_all_declared_members(mut self) -> Self {
        self.member_resolution = MemberResolution::Declared;
        self.with_default_inclusion()
    }

    /// Select members of the subject's run-time type
    pub fn including_all_runtime_members(mut self) -> Self {
        self.member_resolution = MemberResolution::Runtime;
        self.with_default_inclusion()
    }

    pub fn including_fields(mut self) -> Self {
        self.member_filter.fields = true;
        self
    }

    pub fn excluding_fields(mut self) -> Self {
        self.member_filter.fields = false;
        self
    }

    pub fn including_properties(mut self) -> Self {
        self.member_filter.properties = true;
        self
    }

    pub fn excluding_properties(mut self) -> Self {
        self.member_filter.properties = false;
        self
    }

    pub fn add_selection_rule(mut self, rule: Arc<dyn MemberSelectionRule>) -> Self {
        self.selection_rules.push(rule);
        self
    }

    pub fn clear_selection_rules(mut self) -> Self {
        self.selection_rules.clear();
        self
    }

    fn without_default_inclusion(mut self) -> Self {
        self.selection_rules.retain(|r| !r.is_default_inclusion());
        self
    }

    fn with_default_inclusion(mut self) -> Self {
        if !self.selection_rules.iter().any(|r| r.is_default_inclusion()) {
            self.selection_rules.insert(0, Arc::new(IncludeAllMembersRule));
        }
        self
    }

    // ---- member matching ----

    /// Skip subject members the expectation does not have
    pub fn excluding_missing_members(self) -> Self {
        self.clear_matching_rules()
            .add_matching_rule(Arc::new(TryMatchByNameRule))
    }

    /// Report subject members the expectation does not have
    pub fn throwing_on_missing_members(self) -> Self {
        self.clear_matching_rules()
            .add_matching_rule(Arc::new(MustMatchByNameRule))
    }

    pub fn add_matching_rule(mut self, rule: Arc<dyn MemberMatchingRule>) -> Self {
        self.matching_rules.push(rule);
        self
    }

    pub fn clear_matching_rules(mut self) -> Self {
        self.matching_rules.clear();
        self
    }

    // ---- ordering ----

    pub fn with_strict_ordering(self) -> Self {
        self.add_ordering_rule(Arc::new(MatchAllOrderingRule))
    }

    pub fn with_strict_ordering_for(self, path: impl Into<String>) -> Self {
        self.add_ordering_rule(Arc::new(PathBasedOrderingRule::new(path)))
    }

    pub fn with_strict_ordering_when<F>(self, description: &str, predicate: F) -> Self
    where
        F: Fn(&PositionInfo) -> bool + Send + Sync + 'static,
    {
        let predicate: PositionPredicate = Arc::new(predicate);
        self.add_ordering_rule(Arc::new(PredicateBasedOrderingRule::new(predicate, description)))
    }

    /// Drop every ordering rule
    pub fn without_strict_ordering(mut self) -> Self {
        self.ordering_rules.clear();
        self
    }

    /// Keep order loose at `path` even where a strict rule applies
    pub fn without_strict_ordering_for(mut self, path: impl Into<String>) -> Self {
        self.ordering_rules
            .add_exemption(Arc::new(PathBasedOrderingRule::new(path)));
        self
    }

    pub fn add_ordering_rule(mut self, rule: Arc<dyn OrderingRule>) -> Self {
        self.ordering_rules.add(rule);
        self
    }

    // ---- recursion and cycles ----

    pub fn including_nested_objects(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Compare nested objects and collection items by plain equality
    pub fn excluding_nested_objects(mut self) -> Self {
        self.recursive = false;
        self
    }

    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.allow_infinite_recursion = true;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn ignoring_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Ignore;
        self
    }

    pub fn throwing_on_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::ThrowException;
        self
    }

    // ---- enums and conversion ----

    pub fn comparing_enums_by_value(mut self) -> Self {
        self.enum_equivalence = EnumEquivalenceHandling::ByValue;
        self
    }

    pub fn comparing_enums_by_name(mut self) -> Self {
        self.enum_equivalence = EnumEquivalenceHandling::ByName;
        self
    }

    /// Convert a numeric subject to the expectation's numeric type when the
    /// conversion is exact
    pub fn with_auto_conversion(mut self) -> Self {
        self.auto_conversion = true;
        self
    }

    pub fn without_auto_conversion(mut self) -> Self {
        self.auto_conversion = false;
        self.string_conversion = false;
        self
    }

    /// Also parse a string subject into the expectation's scalar type.
    ///
    /// Only the subject is parsed, so `"1"` against `1` passes while `1`
    /// against `"1"` still fails. Turns auto-conversion on.
    pub fn with_string_conversion(mut self) -> Self {
        self.auto_conversion = true;
        self.string_conversion = true;
        self
    }

    pub fn without_string_conversion(mut self) -> Self {
        self.string_conversion = false;
        self
    }

    // ---- overrides ----

    /// Replace the standard comparison wherever `predicate` holds.
    ///
    /// Overrides run after the null and reference checks and before any
    /// structural step. The most recently registered override wins.
    pub fn using_when<P, A>(self, description: &str, predicate: P, action: A) -> Self
    where
        P: Fn(&PositionInfo) -> bool + Send + Sync + 'static,
        A: Fn(&ValidationContext, &mut AssertionScope) + Send + Sync + 'static,
    {
        self.add_step(Arc::new(RuleBasedStep::new(
            description,
            Arc::new(predicate),
            Arc::new(action),
        )))
    }

    /// Replace the standard comparison for values of `ty` (or a subtype)
    pub fn using_for_type<A>(self, ty: &TypeRef, action: A) -> Self
    where
        A: Fn(&ValidationContext, &mut AssertionScope) + Send + Sync + 'static,
    {
        let target = ty.clone();
        let description = format!("values of type {}", ty.name());
        self.using_when(
            &description,
            move |p: &PositionInfo| p.runtime_type.is_assignable_to(&target),
            action,
        )
    }

    pub fn add_step(mut self, step: Arc<dyn EquivalencyStep>) -> Self {
        self.user_steps.push(step);
        self
    }

    pub fn with_value_formatter(mut self, formatter: Arc<dyn ValueFormatter>) -> Self {
        self.formatter = formatter;
        self
    }
}

impl fmt::Display for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.member_resolution {
            MemberResolution::Declared => writeln!(f, "- Use declared types and members")?,
            MemberResolution::Runtime => writeln!(f, "- Use runtime types and members")?,
        }
        match (self.member_filter.fields, self.member_filter.properties) {
            (true, true) => writeln!(f, "- Include fields and properties")?,
            (true, false) => writeln!(f, "- Include fields only")?,
            (false, true) => writeln!(f, "- Include properties only")?,
            (false, false) => writeln!(f, "- Include neither fields nor properties")?,
        }
        match self.enum_equivalence {
            EnumEquivalenceHandling::ByValue => writeln!(f, "- Compare enums by value")?,
            EnumEquivalenceHandling::ByName => writeln!(f, "- Compare enums by name")?,
        }
        if self.auto_conversion {
            writeln!(f, "- Convert subject values to the expectation's type when exact")?;
        }
        if self.string_conversion() {
            writeln!(f, "- Parse string subjects into the expectation's type")?;
        }
        for rule in &self.selection_rules {
            writeln!(f, "- {}", rule.describe())?;
        }
        for rule in &self.matching_rules {
            writeln!(f, "- {}", rule.describe())?;
        }
        for line in self.ordering_rules.describe() {
            writeln!(f, "- {line}")?;
        }
        for step in self.user_steps.iter().rev() {
            writeln!(f, "- {}", step.name())?;
        }
        if self.recursive {
            if self.allow_infinite_recursion {
                writeln!(f, "- Recurse into nested objects without a depth limit")?;
            } else {
                writeln!(
                    f,
                    "- Recurse into nested objects up to {} levels",
                    self.max_recursion_depth
                )?;
            }
        } else {
            writeln!(f, "- Compare nested objects by plain equality")?;
        }
        match self.cyclic_reference_handling {
            CyclicReferenceHandling::ThrowException => write!(f, "- Report cyclic references"),
            CyclicReferenceHandling::Ignore => write!(f, "- Ignore cyclic references"),
        }
    }
}

impl fmt::Debug for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquivalencyOptions")
            .field("selection_rules", &self.selection_rules)
            .field("matching_rules", &self.matching_rules)
            .field("ordering_rules", &self.ordering_rules)
            .field("user_steps", &self.user_steps.len())
            .field("recursive", &self.recursive)
            .field("allow_infinite_recursion", &self.allow_infinite_recursion)
            .field("max_recursion_depth", &self.max_recursion_depth)
            .field("cyclic_reference_handling", &self.cyclic_reference_handling)
            .field("enum_equivalence", &self.enum_equivalence)
            .field("member_resolution", &self.member_resolution)
            .field("member_filter", &self.member_filter)
            .field("auto_conversion", &self.auto_conversion)
            .field("string_conversion", &self.string_conversion)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builtin;

    #[test]
    fn test_default_preset() {
        let options = EquivalencyOptions::default();
        assert!(options.is_recursive());
        assert_eq!(options.selection_rules().len(), 1);
        assert!(options.selection_rules()[0].is_default_inclusion());
        assert_eq!(options.matching_rules().len(), 1);
        assert!(options.ordering_rules().is_empty());
        assert_eq!(options.max_recursion_depth(), DEFAULT_MAX_RECURSION_DEPTH);
        assert_eq!(
            options.cyclic_reference_handling(),
            CyclicReferenceHandling::ThrowException
        );
        assert_eq!(options.enum_equivalence(), EnumEquivalenceHandling::ByValue);
    }

    #[test]
    fn test_empty_preset() {
        let options = EquivalencyOptions::empty();
        assert!(!options.is_recursive());
        assert!(options.selection_rules().is_empty());
        assert!(options.matching_rules().is_empty());
    }

    #[test]
    fn test_including_replaces_default_inclusion() {
        let options = EquivalencyOptions::default().including("Name").including("Age");
        assert_eq!(options.selection_rules().len(), 2);
        assert!(options
            .selection_rules()
            .iter()
            .all(|r| !r.is_default_inclusion()));
    }

    #[test]
    fn test_member_resolution_restores_default_inclusion() {
        let options = EquivalencyOptions::empty().including_all_runtime_members();
        assert_eq!(options.member_resolution(), MemberResolution::Runtime);
        assert!(options.selection_rules()[0].is_default_inclusion());

        let again = options.including_all_declared_members();
        assert_eq!(again.selection_rules().len(), 1);
    }

    #[test]
    fn test_missing_member_policies_swap_matching_rule() {
        let options = EquivalencyOptions::default().excluding_missing_members();
        assert_eq!(options.matching_rules().len(), 1);
        assert!(options.to_string().contains("Try to match member by name"));

        let options = options.throwing_on_missing_members();
        assert!(options.to_string().contains("Match member by name (or throw)"));
    }

    #[test]
    fn test_display_lists_rules() {
        let options = EquivalencyOptions::default()
            .excluding("Id")
            .with_strict_ordering_for("Lines")
            .using_for_type(&builtin::f64(), |_, _| {})
            .ignoring_cyclic_references();
        let text = options.to_string();
        assert!(text.contains("- Exclude member Id"));
        assert!(text.contains("- Be strict about the order of items in Lines"));
        assert!(text.contains("values of type f64"));
        assert!(text.contains("- Ignore cyclic references"));
        assert!(text.contains("up to 10 levels"));
    }
}
