//! # Prove Subcommand
//!
//! Runs the full pipeline over an input file: encode, compile, setup (or
//! reuse persisted keys), commit, prove, verify locally, and export the
//! JSON artifacts. Artifacts are only written for a proof that verified.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::OsRng;

use zksum_core::{FixedPointEncoder, PipelineConfig};
use zksum_zkp::{export_binary, load_keys, save_keys, KeyPaths, ProofWorkflow, Verdict};

/// Arguments for `zksum prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Input file holding `{"values": [...]}`.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Directory receiving `proof.json`, `verification_key.json` and
    /// `public.json`.
    #[arg(long, short, default_value = "build")]
    pub out: PathBuf,

    /// Key directory. Keys found there are reused; otherwise setup runs and
    /// the new keys are saved there.
    #[arg(long)]
    pub keys: Option<PathBuf>,

    /// Also write `proof.bin`, `vk.bin` and `public_witness.bin`.
    #[arg(long)]
    pub binary: bool,
}

/// Execute the prove subcommand.
pub fn run_prove(args: &ProveArgs, config: &PipelineConfig) -> Result<u8> {
    let input = crate::read_input(&args.input)?;
    let batch = FixedPointEncoder::from_config(config)?
        .encode_batch(&input.values, config.batch_size)
        .context("failed to encode input values")?;

    let compiled = ProofWorkflow::from_config(config)
        .context("invalid pipeline configuration")?
        .compile()
        .context("circuit compilation failed")?;

    let key_paths = args.keys.as_deref().map(KeyPaths::in_dir);
    let ready = match &key_paths {
        Some(paths) if paths.exist() => {
            let keys = load_keys(paths)
                .with_context(|| format!("failed to load keys from {}", paths.proving_key.display()))?;
            tracing::info!(dir = %paths.proving_key.display(), "reusing persisted keys");
            compiled
                .with_keys(keys)
                .with_context(|| format!("keys in {} do not fit this configuration", paths.proving_key.display()))?
        }
        _ => {
            let ready = compiled.setup(&mut OsRng).context("trusted setup failed")?;
            if let Some(dir) = &args.keys {
                save_keys(dir, ready.keys())
                    .with_context(|| format!("failed to save keys to {}", dir.display()))?;
            }
            ready
        }
    };

    let proved = ready
        .bind_batch(&batch)
        .context("failed to bind witness")?
        .prove(&mut OsRng)
        .context("proving failed")?;

    let verified = match proved.verify().context("local verification failed")? {
        Verdict::Verified(verified) => verified,
        Verdict::Rejected(_) => {
            eprintln!("FAIL: proof did not verify locally; nothing exported");
            return Ok(1);
        }
    };

    let paths = verified
        .export(&args.out)
        .with_context(|| format!("failed to export artifacts to {}", args.out.display()))?;
    if args.binary {
        export_binary(
            &args.out,
            verified.proof(),
            verified.verifying_key(),
            &verified.public_inputs().to_vec(),
        )
        .with_context(|| format!("failed to export binary artifacts to {}", args.out.display()))?;
    }

    println!("OK: proof verified for {} values (sum {})", batch.input_len(), batch.sum());
    println!("  Proof:            {}", paths.proof.display());
    println!("  Verification key: {}", paths.verification_key.display());
    println!("  Public inputs:    {}", paths.public.display());
    Ok(0)
}
