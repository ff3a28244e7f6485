//! # Pipeline Configuration
//!
//! Batch size, scale factor, commitment mode and hash choice are explicit
//! configuration, not ambient constants. One [`PipelineConfig`] fixes one
//! circuit shape; changing any field other than `precision` requires a new
//! compile and a new setup.
//!
//! ## Sources
//!
//! Values are resolved (later wins):
//! 1. Built-in defaults (`N = 128`, scale `1000`, tree mode, Poseidon2).
//! 2. A YAML or JSON document ([`PipelineConfig::load`]).
//! 3. `ZKSUM_MODE` / `ZKSUM_HASH` environment overrides
//!    ([`PipelineConfig::with_environment`]).
//!
//! ## Validation
//!
//! [`PipelineConfig::validate`] is the gate between configuration and
//! cryptography. Every `ConfigError` is raised there, before a single
//! constraint is generated.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of value slots per circuit.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Default fixed-point scale (three decimal places).
pub const DEFAULT_SCALE: u64 = 1000;

/// How the batch is bound to public data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentMode {
    /// One public digest per value; no aggregate root.
    Linear,
    /// Leaf digests folded into a binary Merkle tree; the root is public.
    #[default]
    Tree,
}

impl CommitmentMode {
    /// Lowercase name used in logs and configuration files.
    pub fn name(self) -> &'static str {
        match self {
            CommitmentMode::Linear => "linear",
            CommitmentMode::Tree => "tree",
        }
    }
}

/// Which arithmetization-friendly hash instantiates the commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    /// Poseidon2 permutation, width 2, 8 full + 56 partial rounds.
    #[default]
    Poseidon2,
    /// MiMC in Miyaguchi–Preneel mode, 110 rounds.
    Mimc,
}

impl HashKind {
    /// Lowercase name used in logs and configuration files.
    pub fn name(self) -> &'static str {
        match self {
            HashKind::Poseidon2 => "poseidon2",
            HashKind::Mimc => "mimc",
        }
    }
}

/// What to do when `value * scale` is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionPolicy {
    /// Round half away from zero and log the discarded fraction.
    #[default]
    Round,
    /// Refuse the value with `EncodingError::PrecisionLoss`.
    Reject,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of value slots `N`.
    pub batch_size: usize,
    /// Fixed-point scale factor.
    pub scale: u64,
    /// Linear or tree commitment.
    pub mode: CommitmentMode,
    /// Commitment hash.
    pub hash: HashKind,
    /// Rounding behavior of the encoder.
    pub precision: PrecisionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            scale: DEFAULT_SCALE,
            mode: CommitmentMode::default(),
            hash: HashKind::default(),
            precision: PrecisionPolicy::default(),
        }
    }
}

/// The validated, immutable shape shared by commitment builder, circuit and
/// witness assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CircuitParams {
    /// Number of value slots `N`.
    pub batch_size: usize,
    /// `log2(N)` in tree mode, `0` in linear mode.
    pub tree_depth: usize,
    /// Commitment mode.
    pub mode: CommitmentMode,
}

impl CircuitParams {
    /// Number of public field elements carried by the commitment.
    pub fn commitment_len(&self) -> usize {
        match self.mode {
            CommitmentMode::Linear => self.batch_size,
            CommitmentMode::Tree => 1,
        }
    }

    /// Total public inputs: the declared sum plus the commitment.
    pub fn num_public_inputs(&self) -> usize {
        1 + self.commitment_len()
    }
}

impl PipelineConfig {
    /// Parse a YAML document. JSON is a subset of YAML, so JSON works too.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a configuration file. `.json` files go through `serde_json`,
    /// anything else through `serde_yaml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_environment() -> Result<Self, ConfigError> {
        Self::default().with_environment()
    }

    /// Apply `ZKSUM_MODE` (`linear` | `tree`) and `ZKSUM_HASH`
    /// (`poseidon2` | `mimc`) on top of `self`.
    pub fn with_environment(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var("ZKSUM_MODE").ok().as_deref(),
            std::env::var("ZKSUM_HASH").ok().as_deref(),
        )
    }

    fn with_overrides(mut self, mode: Option<&str>, hash: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(val) = mode {
            self.mode = match val.to_lowercase().as_str() {
                "linear" => CommitmentMode::Linear,
                "tree" | "merkle" => CommitmentMode::Tree,
                _ => {
                    return Err(ConfigError::UnknownOverride {
                        var: "ZKSUM_MODE",
                        value: val.to_string(),
                    })
                }
            };
        }
        if let Some(val) = hash {
            self.hash = match val.to_lowercase().as_str() {
                "poseidon2" | "poseidon" => HashKind::Poseidon2,
                "mimc" => HashKind::Mimc,
                _ => {
                    return Err(ConfigError::UnknownOverride {
                        var: "ZKSUM_HASH",
                        value: val.to_string(),
                    })
                }
            };
        }
        Ok(self)
    }

    /// Validate the shape and derive the tree depth.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroBatchSize`] when `batch_size == 0`.
    /// - [`ConfigError::ZeroScale`] when `scale == 0`.
    /// - [`ConfigError::NotPowerOfTwo`] in tree mode when `batch_size` is
    ///   not `2^k`. The batch is never silently padded up.
    pub fn validate(&self) -> Result<CircuitParams, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        let tree_depth = match self.mode {
            CommitmentMode::Linear => 0,
            CommitmentMode::Tree => {
                if !self.batch_size.is_power_of_two() {
                    return Err(ConfigError::NotPowerOfTwo {
                        batch_size: self.batch_size,
                    });
                }
                self.batch_size.trailing_zeros() as usize
            }
        };
        Ok(CircuitParams {
            batch_size: self.batch_size,
            tree_depth,
            mode: self.mode,
        })
    }
}
