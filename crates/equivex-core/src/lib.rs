//! EquivEx Core - structural equivalency engine
//!
//! This crate compares two object graphs, a subject and an expectation, and
//! reports every member at which they differ:
//! - Host object model (types, members, values) in place of runtime reflection
//! - Member selection, matching and ordering rules
//! - An ordered pipeline of comparison steps
//! - A recursive validator with cycle and depth guards
//! - Collection matching with closest-match diagnostics
//! - Option profiles loadable from YAML or JSON
//!
//! ```
//! use equivex_core::model::from_json;
//! use equivex_core::{are_equivalent, EquivalencyOptions};
//!
//! let subject = from_json(&serde_json::json!({"name": "Ada", "tags": ["b", "a"]}));
//! let expectation = from_json(&serde_json::json!({"name": "Ada", "tags": ["a", "b"]}));
//!
//! let report = are_equivalent(&subject, &expectation, &EquivalencyOptions::default()).unwrap();
//! assert!(report.is_equivalent());
//! ```

pub mod collection;
pub mod context;
pub mod errors;
pub mod formatter;
pub mod logging_facility;
pub mod model;
pub mod options;
pub mod profile;
pub mod rules;
pub mod scope;
pub mod steps;
pub mod tracker;
pub mod validator;

pub use equivex_core_types as types;

// Re-export commonly used types
pub use context::{PositionInfo, ValidationContext};
pub use errors::{EquivError, ExError, ExErrorKind, Result};
pub use formatter::{DefaultValueFormatter, ValueFormatter};
pub use model::{Value, TypeDescriptor, TypeRef};
pub use options::{
    CyclicReferenceHandling, EnumEquivalenceHandling, EquivalencyOptions, MemberResolution,
};
pub use profile::EquivalencyProfile;
pub use scope::{AssertionScope, EquivalencyReport, Failure, FailureKind, Reason};
pub use validator::{are_equivalent, are_equivalent_because, assert_equivalent, EquivalencyValidator};
