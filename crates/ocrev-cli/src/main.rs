//! # ocrev CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Open Contracting Review Kit CLI.
///
/// Reviews contracting data packages: resolves the effective schema version,
/// merges declared extensions, converts between JSON and spreadsheet forms,
/// and reports grouped validation findings.
#[derive(Parser, Debug)]
#[command(name = "ocrev", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Review one submitted file and print the grouped report.
    Review(ocrev_cli::review::ReviewArgs),
    /// List the known schema versions.
    Versions,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Review(args) => ocrev_cli::review::run(args),
        Commands::Versions => ocrev_cli::versions::run(),
    }
}
