//! # Commit Subcommand
//!
//! Encodes an input file and prints the public data a verifier will later
//! check against: the declared sum and the root or per-value digests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use zksum_core::{to_decimal, FixedPointEncoder, PipelineConfig};
use zksum_crypto::{CommitmentBuilder, CommitmentHasher};

/// Arguments for `zksum commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Input file holding `{"values": [...]}`.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

/// The printed commitment.
#[derive(Debug, Serialize)]
pub struct CommitmentReport {
    pub commitment: Vec<String>,
    pub expected_sum: String,
    pub hash: &'static str,
    pub mode: &'static str,
}

/// Build the commitment report for `args.input`.
pub fn commitment_report(args: &CommitArgs, config: &PipelineConfig) -> Result<CommitmentReport> {
    let params = config.validate().context("invalid pipeline configuration")?;
    let input = crate::read_input(&args.input)?;
    let batch = FixedPointEncoder::from_config(config)?
        .encode_batch(&input.values, params.batch_size)
        .context("failed to encode input values")?;
    let (commitment, _) = CommitmentBuilder::new(params, CommitmentHasher::new(config.hash))
        .build(&batch)
        .context("failed to build commitment")?;
    Ok(CommitmentReport {
        commitment: commitment.elements().iter().map(to_decimal).collect(),
        expected_sum: to_decimal(&batch.expected_sum()),
        hash: config.hash.name(),
        mode: config.mode.name(),
    })
}

/// Execute the commit subcommand.
pub fn run_commit(args: &CommitArgs, config: &PipelineConfig) -> Result<u8> {
    let report = commitment_report(args, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
