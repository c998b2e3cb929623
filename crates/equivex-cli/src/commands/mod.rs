pub mod compare;
pub mod options;

use std::path::PathBuf;

use clap::Args;
use equivex_core::{EquivalencyOptions, EquivalencyProfile};

/// Comparison policy flags shared by every subcommand
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// YAML or JSON option profile applied before the flags below
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Require collection items to appear in the same order
    #[arg(long)]
    pub strict_ordering: bool,

    /// Skip subject members the expectation does not have
    #[arg(long)]
    pub excluding_missing_members: bool,

    /// Treat cyclic references as equivalent instead of failing
    #[arg(long)]
    pub ignore_cycles: bool,

    /// Compare enums by variant name instead of numeric value
    #[arg(long)]
    pub enums_by_name: bool,

    /// Select members from run-time types
    #[arg(long)]
    pub runtime_members: bool,

    /// Compare nested objects by reference only
    #[arg(long)]
    pub no_recursion: bool,

    /// Disable the recursion depth limit
    #[arg(long)]
    pub allow_infinite_recursion: bool,

    /// Maximum recursion depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Member path to leave out of the comparison (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    pub excluded: Vec<String>,
}

impl PolicyArgs {
    /// Default options, then the profile, then the flags
    pub fn to_options(&self) -> equivex_core::Result<EquivalencyOptions> {
        let mut options = EquivalencyOptions::default();
        if let Some(path) = &self.profile {
            options = EquivalencyProfile::load(path)?.apply(options);
        }

        if self.strict_ordering {
            options = options.with_strict_ordering();
        }
        if self.excluding_missing_members {
            options = options.excluding_missing_members();
        }
        if self.ignore_cycles {
            options = options.ignoring_cyclic_references();
        }
        if self.enums_by_name {
            options = options.comparing_enums_by_name();
        }
        if self.runtime_members {
            options = options.including_all_runtime_members();
        }
        if self.no_recursion {
            options = options.excluding_nested_objects();
        }
        if self.allow_infinite_recursion {
            options = options.allowing_infinite_recursion();
        }
        if let Some(depth) = self.max_depth {
            options = options.with_max_recursion_depth(depth);
        }
        for path in &self.excluded {
            options = options.excluding(path.clone());
        }
        Ok(options)
    }
}
