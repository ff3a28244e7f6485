//! # zksum CLI entry point
//!
//! Parses command-line arguments, resolves the pipeline configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zksum_cli::commit::{run_commit, CommitArgs};
use zksum_cli::prove::{run_prove, ProveArgs};
use zksum_cli::verify::{run_verify, VerifyArgs};

/// zksum: prove the sum of a committed batch without revealing it.
#[derive(Parser, Debug)]
#[command(name = "zksum", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML or JSON pipeline configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the public commitment and declared sum for an input file.
    Commit(CommitArgs),

    /// Prove, verify locally and export artifacts.
    Prove(ProveArgs),

    /// Verify exported artifacts.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = zksum_cli::load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Commit(args) => run_commit(args, &config),
        Commands::Prove(args) => run_prove(args, &config),
        Commands::Verify(args) => run_verify(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
