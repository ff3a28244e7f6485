//! # Verify Subcommand
//!
//! Verifies an exported artifact directory using only public data. Exit
//! code 0 when the proof holds, 1 when it does not.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use zksum_core::{to_decimal, FixedPointEncoder, PipelineConfig};
use zksum_zkp::{import_json, ExportPaths, Groth16Backend, ProofSystem};

/// Arguments for `zksum verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory holding `proof.json`, `verification_key.json` and
    /// `public.json`.
    #[arg(value_name = "DIR", default_value = "build")]
    pub dir: PathBuf,

    /// Require the declared sum to equal this real value, encoded with the
    /// configured scale.
    #[arg(long, allow_hyphen_values = true)]
    pub expect_sum: Option<f64>,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &PipelineConfig) -> Result<u8> {
    let paths = ExportPaths::in_dir(&args.dir);
    if !paths.proof.is_file() {
        bail!("proof file not found: {}", paths.proof.display());
    }
    let artifacts = import_json(&paths).with_context(|| format!("failed to import {}", args.dir.display()))?;
    let encoder = FixedPointEncoder::from_config(config)?;

    let Some(declared) = artifacts.public_inputs.first() else {
        bail!("public.json carries no inputs");
    };
    // display only; a sum outside the signed window is left to the verifier
    let declared_sum = encoder
        .decode_field(declared)
        .map(|sum| sum.to_string())
        .unwrap_or_else(|_| to_decimal(declared));
    if let Some(expected) = args.expect_sum {
        let expected = encoder.encode(expected).context("failed to encode --expect-sum")?;
        if expected.to_field() != *declared {
            eprintln!(
                "FAIL: declared sum {declared_sum} does not match expected {}",
                encoder.decode(expected)
            );
            return Ok(1);
        }
    }

    let valid = Groth16Backend
        .verify(&artifacts.verifying_key, &artifacts.public_inputs, &artifacts.proof)
        .context("malformed verification input")?;
    if valid {
        println!("OK: proof is valid (declared sum {declared_sum})");
        Ok(0)
    } else {
        tracing::warn!(dir = %args.dir.display(), "proof rejected");
        eprintln!("FAIL: proof is invalid");
        Ok(1)
    }
}
