//! agol-driver — sync feature services between ArcGIS Online and S3.
//!
//! # Usage
//!
//! ```text
//! agol-driver run   [--event <path>|-] [--json] --agol-url <url> --agol-secret <id>
//! agol-driver check [--event <path>|-] [--json]
//! ```
//!
//! Settings fall back to environment variables (see `agol-driver run --help`);
//! a `.env` file in the working directory is loaded first.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "agol-driver",
    version,
    about = "Reconcile the feature-service manifest and import or export shapefiles",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an invocation event against ArcGIS Online and S3.
    Run(RunArgs),

    /// Decode an invocation event and print what it would do.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
