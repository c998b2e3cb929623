//! EquivEx CLI
//!
//! Command-line interface for comparing JSON documents structurally.
//!
//! Exit codes: 0 equivalent, 1 not equivalent, 2 error.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "equivex")]
#[command(about = "EquivEx - Structural equivalency of JSON documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a subject document against an expectation
    Compare(commands::compare::CompareArgs),
    /// Print the effective option set
    Options(commands::options::OptionsArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Options(args) => commands::options::execute(args).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
