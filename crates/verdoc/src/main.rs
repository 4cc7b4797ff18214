//! verdoc CLI - versioned documentation builder.
//!
//! Provides commands for:
//! - `build`: Build the documentation of every selected branch and tag
//! - `versions`: List the versions a build would produce

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, VersionsArgs};
use output::Output;

/// verdoc - build one documentation site per branch and tag, with a version switcher.
#[derive(Parser)]
#[command(name = "verdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the versioned documentation site.
    Build(BuildArgs),
    /// List the versions that would be built.
    Versions(VersionsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose(),
        Commands::Versions(args) => args.verbose(),
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Versions(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
