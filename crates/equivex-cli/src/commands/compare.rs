//! Compare command
//!
//! Usage: equivex compare <SUBJECT> <EXPECTATION> [--profile <FILE>] [FLAGS]

use std::path::{Path, PathBuf};

use clap::Args;
use equivex_core::errors::{EquivError, ExError, ExErrorKind};
use equivex_core::logging_facility::{self, Profile};
use equivex_core::model::{from_json, Value};
use equivex_core::{are_equivalent_because, Reason};

use super::PolicyArgs;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// JSON document under test
    pub subject: PathBuf,

    /// JSON document it should be equivalent to
    pub expectation: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Phrase explaining why the documents should match
    #[arg(long)]
    pub because: Option<String>,

    /// Emit logs to stderr (development or production)
    #[arg(long, value_name = "PROFILE")]
    pub log_profile: Option<Profile>,
}

/// Execute compare command; `Ok(false)` when the documents differ
pub fn execute(args: CompareArgs) -> Result<bool, Box<dyn std::error::Error>> {
    if let Some(profile) = args.log_profile {
        logging_facility::init(profile);
    }

    let options = args.policy.to_options()?;
    let subject = read_document(&args.subject)?;
    let expectation = read_document(&args.expectation)?;
    let reason = args
        .because
        .map(Reason::because)
        .unwrap_or_else(Reason::none);

    let report = are_equivalent_because(&subject, &expectation, &options, reason)?;
    println!("{}", report);
    Ok(report.is_equivalent())
}

fn read_document(path: &Path) -> Result<Value, ExError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("read_document")
            .with_path(path.display().to_string())
            .with_message(format!("Failed to read document: {}", e))
    })?;
    let json: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        ExError::from(EquivError::InvalidInput {
            reason: format!("JSON parse error: {}", e),
        })
        .with_op("read_document")
        .with_path(path.display().to_string())
    })?;
    Ok(from_json(&json))
}
