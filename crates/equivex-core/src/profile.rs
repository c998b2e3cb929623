//! Option profiles
//!
//! A profile is a YAML or JSON document describing an [`EquivalencyOptions`]
//! value, so comparison policies can live next to the data they apply to.
//!
//! ```yaml
//! members: runtime
//! missing_members: exclude
//! cyclic_references: ignore
//! strict_ordering_paths: [Lines]
//! excluded_paths: [Audit.Timestamp]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{EquivError, ExError, ExErrorKind, Result};
use crate::options::{
    CyclicReferenceHandling, EnumEquivalenceHandling, EquivalencyOptions, MemberResolution,
};

/// How subject members missing from the expectation are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMembers {
    Throw,
    Exclude,
}

/// Serializable description of an option set; absent fields keep the
/// defaults of the options it is applied to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquivalencyProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<MemberResolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_fields: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_properties: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_members: Option<MissingMembers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_infinite_recursion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cyclic_references: Option<CyclicReferenceHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enums: Option<EnumEquivalenceHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_ordering: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strict_ordering_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_conversion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_conversion: Option<bool>,
}

impl EquivalencyProfile {
    /// Parse a profile from YAML
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| invalid(format!("YAML parse error: {}", e)))
    }

    /// Parse a profile from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| invalid(format!("JSON parse error: {}", e)))
    }

    /// Load a profile file; `.json` files are parsed as JSON, anything
    /// else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_profile")
                .with_path(path.display().to_string())
                .with_message(format!("Failed to read profile: {}", e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let profile = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        profile.map_err(|e| e.with_path(path.display().to_string()))
    }

    /// Layer this profile over `options`
    pub fn apply(&self, mut options: EquivalencyOptions) -> EquivalencyOptions {
        options = match self.members {
            Some(MemberResolution::Declared) => options.including_all_declared_members(),
            Some(MemberResolution::Runtime) => options.including_all_runtime_members(),
            None => options,
        };
        options = match self.include_fields {
            Some(true) => options.including_fields(),
            Some(false) => options.excluding_fields(),
            None => options,
        };
        options = match self.include_properties {
            Some(true) => options.including_properties(),
            Some(false) => options.excluding_properties(),
            None => options,
        };
        options = match self.missing_members {
            Some(MissingMembers::Throw) => options.throwing_on_missing_members(),
            Some(MissingMembers::Exclude) => options.excluding_missing_members(),
            None => options,
        };
        options = match self.recursive {
            Some(true) => options.including_nested_objects(),
            Some(false) => options.excluding_nested_objects(),
            None => options,
        };
        if let Some(depth) = self.max_depth {
            options = options.with_max_recursion_depth(depth);
        }
        if self.allow_infinite_recursion == Some(true) {
            options = options.allowing_infinite_recursion();
        }
        options = match self.cyclic_references {
            Some(CyclicReferenceHandling::ThrowException) => options.throwing_on_cyclic_references(),
            Some(CyclicReferenceHandling::Ignore) => options.ignoring_cyclic_references(),
            None => options,
        };
        options = match self.enums {
            Some(EnumEquivalenceHandling::ByValue) => options.comparing_enums_by_value(),
            Some(EnumEquivalenceHandling::ByName) => options.comparing_enums_by_name(),
            None => options,
        };
        options = match self.strict_ordering {
            Some(true) => options.with_strict_ordering(),
            Some(false) => options.without_strict_ordering(),
            None => options,
        };
        for path in &self.strict_ordering_paths {
            options = options.with_strict_ordering_for(path.clone());
        }
        for path in &self.included_paths {
            options = options.including(path.clone());
        }
        for path in &self.excluded_paths {
            options = options.excluding(path.clone());
        }
        options = match self.auto_conversion {
            Some(true) => options.with_auto_conversion(),
            Some(false) => options.without_auto_conversion(),
            None => options,
        };
        options = match self.string_conversion {
            Some(true) => options.with_string_conversion(),
            Some(false) => options.without_string_conversion(),
            None => options,
        };
        options
    }
}

fn invalid(reason: String) -> ExError {
    ExError::from(EquivError::InvalidProfile { reason }).with_op("load_profile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_profile_parses_every_field() {
        let yaml = r#"
members: runtime
include_fields: false
include_properties: true
missing_members: exclude
recursive: true
max_depth: 4
allow_infinite_recursion: false
cyclic_references: ignore
enums: by_name
strict_ordering: false
strict_ordering_paths: [Lines]
excluded_paths: [Audit.Timestamp]
included_paths: []
auto_conversion: false
string_conversion: true
"#;
        let profile = EquivalencyProfile::from_yaml_str(yaml).unwrap();
        assert_eq!(profile.members, Some(MemberResolution::Runtime));
        assert_eq!(profile.missing_members, Some(MissingMembers::Exclude));
        assert_eq!(profile.cyclic_references, Some(CyclicReferenceHandling::Ignore));
        assert_eq!(profile.enums, Some(EnumEquivalenceHandling::ByName));
        assert_eq!(profile.strict_ordering_paths, vec!["Lines".to_string()]);

        let options = profile.apply(EquivalencyOptions::default());
        assert_eq!(options.member_resolution(), MemberResolution::Runtime);
        assert!(!options.member_filter().fields);
        assert_eq!(options.max_recursion_depth(), 4);
        assert_eq!(options.cyclic_reference_handling(), CyclicReferenceHandling::Ignore);
        assert_eq!(options.enum_equivalence(), EnumEquivalenceHandling::ByName);
        assert!(options.auto_conversion());
        assert!(options.string_conversion());
        assert!(options.to_string().contains("Exclude member Audit.Timestamp"));
    }

    #[test]
    fn test_throw_is_accepted_for_cyclic_references() {
        let profile = EquivalencyProfile::from_yaml_str("cyclic_references: throw").unwrap();
        assert_eq!(
            profile.cyclic_references,
            Some(CyclicReferenceHandling::ThrowException)
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = EquivalencyProfile::from_json_str(r#"{"strictOrdering": true}"#).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidProfile);
    }

    #[test]
    fn test_empty_profile_keeps_options() {
        let profile = EquivalencyProfile::from_yaml_str("{}").unwrap();
        let options = profile.apply(EquivalencyOptions::default());
        assert_eq!(
            options.to_string(),
            EquivalencyOptions::default().to_string()
        );
    }
}
