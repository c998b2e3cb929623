//! Options command
//!
//! Usage: equivex options [--profile <FILE>] [FLAGS]

use clap::Args;

use super::PolicyArgs;

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Execute options command
pub fn execute(args: OptionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.policy.to_options()?;
    println!("{}", options);
    Ok(())
}
