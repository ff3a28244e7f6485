//! # zksum-zkp — Proof Layer
//!
//! Proves that a committed batch of private values sums to a public total:
//!
//! - **Circuit** ([`ConsistencyCircuit`]): sum plus commitment consistency,
//!   with every Merkle side bit constrained to `{0, 1}`.
//! - **Witness assembly** ([`WitnessAssembler`]): binds a batch to its
//!   commitment and fixes the public-input order.
//! - **Backend** ([`ProofSystem`], sealed): Groth16 over BN254.
//! - **Workflow** ([`ProofWorkflow`]): typestate sequencing from compile to
//!   a [`Verdict`].
//! - **Export** ([`export`]): `snarkjs`-style JSON, a canonical binary
//!   triple, and key persistence.
//!
//! ## Crate Policy
//!
//! - Setup runs once per circuit shape; keys are shared across proofs.
//! - A failed prove is final for that attempt. Nothing retries.
//! - A proof that does not verify yields `Ok(false)` or
//!   [`Verdict::Rejected`], never an error.

#![forbid(unsafe_code)]

pub mod circuit;
pub mod error;
pub mod export;
pub mod groth16;
pub mod traits;
pub mod witness;
pub mod workflow;

pub use circuit::{enforce_bit, select_pair, ConsistencyCircuit};
pub use error::{
    AssertionClass, CompileError, ExportError, ProveError, SetupError, VerifyError, WitnessError, WorkflowError,
};
pub use export::{
    export_binary, export_json, import_binary, import_json, load_keys, save_keys, BinaryPaths, ExportPaths,
    ImportedArtifacts, KeyPaths,
};
pub use groth16::Groth16Backend;
pub use traits::{CircuitShape, ProofSystem};
pub use witness::{PublicInputs, Witness, WitnessAssembler};
pub use workflow::{
    Compiled, KeyPair, KeysReady, ProofWorkflow, Proved, Rejected, TransitionRecord, Uninitialized, Verdict,
    Verified, WitnessBound, WorkflowState,
};
