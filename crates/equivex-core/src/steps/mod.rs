//! The comparison pipeline
//!
//! Each step claims a category of value shape. The validator offers a
//! position to the steps in order; the first that can handle it runs, and
//! its [`StepResult`] decides whether later steps still see the position.
//!
//! Canonical order:
//!
//! 1. [`AutoConversionStep`]
//! 2. [`ReferenceEqualityStep`]
//! 3. user overrides, most recently registered first
//! 4. [`DictionaryEquivalencyStep`]
//! 5. [`MultiDimensionalArrayEquivalencyStep`]
//! 6. [`EnumerableEquivalencyStep`]
//! 7. [`StringEqualityEquivalencyStep`]
//! 8. [`TypeEquivalencyStep`]
//! 9. [`EnumEqualityStep`]
//! 10. [`StructuralEqualityEquivalencyStep`]
//! 11. [`SimpleEqualityEquivalencyStep`]

mod array;
mod conversion;
mod dictionary;
mod enumerable;
mod enums;
mod reference;
mod simple;
mod string;
mod structural;
mod type_value;
mod user_rules;

use std::sync::Arc;

use crate::context::ValidationContext;
use crate::errors::Result;
use crate::options::EquivalencyOptions;
use crate::validator::EquivalencyValidator;

pub use array::MultiDimensionalArrayEquivalencyStep;
pub use conversion::AutoConversionStep;
pub use dictionary::DictionaryEquivalencyStep;
pub use enumerable::EnumerableEquivalencyStep;
pub use enums::EnumEqualityStep;
pub use reference::ReferenceEqualityStep;
pub use simple::SimpleEqualityEquivalencyStep;
pub use string::StringEqualityEquivalencyStep;
pub use structural::StructuralEqualityEquivalencyStep;
pub use type_value::TypeEquivalencyStep;
pub use user_rules::RuleBasedStep;

/// What the validator does after a step ran
#[derive(Debug, Clone)]
pub enum StepResult {
    /// The position is settled; skip the remaining steps
    Handled,
    /// Partial work only; offer the position to the remaining steps
    Continue,
    /// Offer this rewritten position to the remaining steps
    Replace(ValidationContext),
}

/// One comparison strategy
pub trait EquivalencyStep: Send + Sync {
    fn name(&self) -> &str;

    fn can_handle(&self, context: &ValidationContext, options: &EquivalencyOptions) -> bool;

    /// # Errors
    ///
    /// Only host failures (a broken member accessor) and missing-step
    /// defects are errors; differences are reported through the
    /// validator's scope.
    fn handle(
        &self,
        context: &ValidationContext,
        validator: &mut EquivalencyValidator<'_>,
        options: &EquivalencyOptions,
    ) -> Result<StepResult>;
}

/// Built-in steps with the options' overrides spliced in after the
/// reference check
pub fn standard_pipeline(options: &EquivalencyOptions) -> Vec<Arc<dyn EquivalencyStep>> {
    let mut steps: Vec<Arc<dyn EquivalencyStep>> =
        vec![Arc::new(AutoConversionStep), Arc::new(ReferenceEqualityStep)];
    steps.extend(options.user_steps().iter().rev().cloned());
    steps.extend([
        Arc::new(DictionaryEquivalencyStep) as Arc<dyn EquivalencyStep>,
        Arc::new(MultiDimensionalArrayEquivalencyStep),
        Arc::new(EnumerableEquivalencyStep),
        Arc::new(StringEqualityEquivalencyStep),
        Arc::new(TypeEquivalencyStep),
        Arc::new(EnumEqualityStep),
        Arc::new(StructuralEqualityEquivalencyStep),
        Arc::new(SimpleEqualityEquivalencyStep),
    ]);
    steps
}
