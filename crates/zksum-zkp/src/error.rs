//! # Error Types — Proof Layer
//!
//! One error per backend call, so a caller always knows which stage of the
//! pipeline failed:
//!
//! | Stage    | Error            | Recovery                                   |
//! |----------|------------------|--------------------------------------------|
//! | compile  | [`CompileError`] | fatal for the circuit shape                |
//! | setup    | [`SetupError`]   | fatal for the circuit shape                |
//! | assemble | [`WitnessError`] | fix the inputs; nothing cryptographic ran  |
//! | prove    | [`ProveError`]   | fatal for this proof attempt, never retried|
//! | verify   | [`VerifyError`]  | malformed input only                       |
//! | export   | [`ExportError`]  | interchange I/O or parsing                 |
//!
//! A proof that fails to verify is **not** an error. Verification returns
//! `Ok(false)`.

use std::fmt;

use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

use zksum_core::{CommitmentMode, ConfigError};
use zksum_crypto::CryptoError;

/// Constraint generation failed while fixing the circuit shape.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The constraint synthesizer returned an error.
    #[error("constraint synthesis failed: {0}")]
    Synthesis(SynthesisError),
}

/// Key generation failed.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The backend's circuit-specific setup returned an error.
    #[error("circuit-specific setup failed: {0}")]
    Backend(SynthesisError),

    /// A key pair from an earlier setup does not fit the compiled circuit.
    #[error("key pair was generated for another circuit: {what} is {actual}, expected {expected}")]
    KeyShape {
        /// The key component that disagrees.
        what: &'static str,
        /// Length implied by the compiled shape.
        expected: usize,
        /// Length found in the key.
        actual: usize,
    },

    /// The proving key embeds a different verifying key.
    #[error("proving and verifying keys come from different setups")]
    KeyMismatch,
}

/// The class of circuit assertion a witness violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionClass {
    /// The running sum differs from the declared sum.
    Sum,
    /// The digest of a value differs from its published digest (linear mode).
    Digest {
        /// Slot of the offending value.
        index: usize,
    },
    /// The authentication path of a value does not reach the root (tree mode).
    MerklePath {
        /// Slot of the offending value.
        index: usize,
    },
}

impl fmt::Display for AssertionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionClass::Sum => write!(f, "sum"),
            AssertionClass::Digest { index } => write!(f, "digest[{index}]"),
            AssertionClass::MerklePath { index } => write!(f, "merkle path[{index}]"),
        }
    }
}

/// Proof generation failed. The attempt is over; retrying with the same
/// witness cannot succeed.
#[derive(Error, Debug)]
pub enum ProveError {
    /// The witness violates a named assertion.
    #[error("witness violates the {0} assertion")]
    Assertion(AssertionClass),

    /// The backend found an unsatisfied constraint.
    #[error("constraint system unsatisfied at {0}")]
    Unsatisfied(String),

    /// Constraint generation or the prover itself failed.
    #[error("prover failed: {0}")]
    Backend(SynthesisError),
}

/// Verification could not be attempted.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The public-input vector does not match the verifying key.
    #[error("verifying key expects {expected} public inputs, got {actual}")]
    PublicInputCount {
        /// Inputs the key was generated for.
        expected: usize,
        /// Inputs supplied.
        actual: usize,
    },

    /// The backend rejected the key or proof encoding.
    #[error("malformed verification input: {0}")]
    Malformed(SynthesisError),
}

/// Batch, commitment and paths do not fit the circuit shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    /// The batch has the wrong number of slots.
    #[error("batch holds {actual} values but the circuit expects {expected}")]
    BatchShape {
        /// Configured `N`.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The commitment was built for the other mode.
    #[error("circuit is in {expected:?} mode but the commitment is {actual:?}")]
    ModeMismatch {
        /// Circuit mode.
        expected: CommitmentMode,
        /// Commitment mode.
        actual: CommitmentMode,
    },

    /// The commitment carries the wrong number of elements.
    #[error("commitment carries {actual} elements, expected {expected}")]
    CommitmentLength {
        /// Elements the circuit allocates.
        expected: usize,
        /// Elements supplied.
        actual: usize,
    },

    /// Tree mode needs exactly one path per slot; linear mode needs none.
    #[error("expected {expected} authentication paths, got {actual}")]
    AuthPathCount {
        /// Paths the circuit allocates.
        expected: usize,
        /// Paths supplied.
        actual: usize,
    },

    /// A path has the wrong number of levels.
    #[error("authentication path {index} has {actual} levels, expected {expected}")]
    AuthPathDepth {
        /// Slot of the path.
        index: usize,
        /// Tree depth.
        expected: usize,
        /// Levels supplied.
        actual: usize,
    },

    /// Paths must be supplied in slot order.
    #[error("authentication path at position {index} belongs to leaf {leaf_index}")]
    AuthPathOrder {
        /// Position in the supplied list.
        index: usize,
        /// Leaf the path claims.
        leaf_index: usize,
    },

    /// A public-input vector has the wrong length for the circuit.
    #[error("expected {expected} public inputs, got {actual}")]
    PublicInputCount {
        /// `1 + commitment length`.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
}

/// Interchange artifacts could not be written or read back.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Canonical binary encoding or decoding failure.
    #[error("binary serialization error: {0}")]
    Serialization(String),

    /// A decimal string is not a canonical field element.
    #[error("{what}: {value:?} is not a canonical field element")]
    InvalidField {
        /// Which value was being parsed.
        what: &'static str,
        /// The offending string.
        value: String,
    },

    /// A point is off the curve or outside the prime-order subgroup.
    #[error("{0} is not a valid curve point")]
    InvalidPoint(&'static str),

    /// A protocol or curve tag other than the supported one.
    #[error("unsupported {field}: {value:?}")]
    Unsupported {
        /// `protocol` or `curve`.
        field: &'static str,
        /// The tag found.
        value: String,
    },

    /// Two parts of the artifact set disagree.
    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// Any failure surfaced by the proof workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Commitment construction failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Compile failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Setup failed.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Witness assembly failed.
    #[error(transparent)]
    Witness(#[from] WitnessError),

    /// Proving failed.
    #[error(transparent)]
    Prove(#[from] ProveError),

    /// Verification could not run.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Artifact export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}
