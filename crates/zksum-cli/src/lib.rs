//! # zksum-cli — Command-Line Front End
//!
//! Provides the `zksum` binary. Every subcommand is a thin wrapper over the
//! library crates; no proving semantics live here.
//!
//! ## Subcommands
//!
//! - `zksum commit`: Print the public commitment and declared sum for an
//!   input file.
//! - `zksum prove`: Encode, commit, prove, verify and export.
//! - `zksum verify`: Verify an exported `proof.json` /
//!   `verification_key.json` / `public.json` triple.
//!
//! ## Input Format
//!
//! ```json
//! { "values": [1.3, 2.3, 4.234] }
//! ```

pub mod commit;
pub mod prove;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use zksum_core::PipelineConfig;

/// A batch of real values as read from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFile {
    /// Values in slot order.
    pub values: Vec<f64>,
}

/// Read an input file.
pub fn read_input(path: &Path) -> Result<InputFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse input JSON: {}", path.display()))
}

/// Resolve the pipeline configuration: the file at `path` if given,
/// defaults otherwise, with `ZKSUM_*` environment overrides on top.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let base = match path {
        Some(p) => PipelineConfig::load(p).with_context(|| format!("failed to load config: {}", p.display()))?,
        None => PipelineConfig::default(),
    };
    let config = base.with_environment().context("invalid ZKSUM_* override")?;
    tracing::debug!(
        batch_size = config.batch_size,
        scale = config.scale,
        mode = config.mode.name(),
        hash = config.hash.name(),
        "resolved pipeline configuration"
    );
    Ok(config)
}
