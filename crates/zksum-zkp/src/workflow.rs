//! # Proof Workflow Typestate Machine
//!
//! Sequences compile, setup, witness binding, proving and verification.
//! Each stage is a distinct type, so a proof cannot be produced before keys
//! exist and a verdict cannot be read before a proof exists.
//!
//! ## States
//!
//! ```text
//! Uninitialized ──compile()──▶ Compiled ──setup()──▶ KeysReady
//!                                   │                   │
//!                          with_keys()──────────────────┤ (reusable)
//!                                                      bind(witness)
//!                                                       ▼
//!                                                  WitnessBound ──prove()──▶ Proved
//!                                                                              │
//!                                                                          verify()
//!                                                                         ▼       ▼
//!                                                                    Verified   Rejected
//! ```
//!
//! `KeysReady::bind` borrows the workflow: the proving and verifying keys
//! sit behind an [`Arc`] and serve any number of proofs of the same shape.
//! Setup never runs per proof.
//!
//! ## Failure Semantics
//!
//! - A failed `prove` ends that attempt. The witness is consumed and nothing
//!   is retried; a new attempt starts from `KeysReady::bind`.
//! - A proof that does not verify is a [`Verdict::Rejected`], not an error.
//!
//! ## Compile-Time Safety Example
//!
//! ```compile_fail
//! use zksum_core::PipelineConfig;
//! use zksum_zkp::workflow::ProofWorkflow;
//!
//! let workflow = ProofWorkflow::from_config(&PipelineConfig::default()).unwrap();
//! // ERROR: no method named `prove` found for `ProofWorkflow<Uninitialized, ..>`
//! let _ = workflow.prove(&mut rand::thread_rng());
//! ```

use std::path::Path;
use std::sync::Arc;

use rand::{CryptoRng, RngCore};

use zksum_core::{Batch, CircuitParams, PipelineConfig};
use zksum_crypto::{AuthPath, CommitmentBuilder, CommitmentHash, CommitmentHasher, CryptoError, PublicCommitment};

use crate::circuit::ConsistencyCircuit;
use crate::error::{ExportError, ProveError, WitnessError, WorkflowError};
use crate::export::{self, ExportPaths};
use crate::groth16::Groth16Backend;
use crate::traits::{CircuitShape, ProofSystem};
use crate::witness::{PublicInputs, Witness, WitnessAssembler};

// ─── State Types ─────────────────────────────────────────────────────

/// Circuit shape chosen, nothing synthesized.
#[derive(Debug)]
pub struct Uninitialized;

/// Circuit synthesized; shape fixed.
#[derive(Debug)]
pub struct Compiled {
    shape: CircuitShape,
}

/// Keys generated; ready to bind witnesses.
#[derive(Debug)]
pub struct KeysReady<B: ProofSystem> {
    shape: CircuitShape,
    keys: Arc<KeyPair<B>>,
}

/// A witness is bound to this attempt.
#[derive(Debug)]
pub struct WitnessBound<B: ProofSystem> {
    keys: Arc<KeyPair<B>>,
    witness: Witness,
}

/// A proof exists for the bound public inputs.
#[derive(Debug)]
pub struct Proved<B: ProofSystem> {
    artifacts: ProofArtifacts<B>,
}

/// The proof verified against its public inputs.
#[derive(Debug)]
pub struct Verified<B: ProofSystem> {
    artifacts: ProofArtifacts<B>,
}

/// The proof did not verify against its public inputs.
#[derive(Debug)]
pub struct Rejected<B: ProofSystem> {
    artifacts: ProofArtifacts<B>,
}

/// A proving/verifying key pair from one setup.
pub struct KeyPair<B: ProofSystem> {
    /// Prover key.
    pub proving_key: B::ProvingKey,
    /// Verifier key.
    pub verifying_key: B::VerifyingKey,
}

impl<B: ProofSystem> std::fmt::Debug for KeyPair<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

/// What a proved workflow carries forward.
#[derive(Debug)]
pub struct ProofArtifacts<B: ProofSystem> {
    keys: Arc<KeyPair<B>>,
    public: PublicInputs,
    proof: B::Proof,
}

// ─── Sealed State Trait ──────────────────────────────────────────────

mod private {
    use super::*;

    pub trait Sealed {}
    impl Sealed for Uninitialized {}
    impl Sealed for Compiled {}
    impl<B: ProofSystem> Sealed for KeysReady<B> {}
    impl<B: ProofSystem> Sealed for WitnessBound<B> {}
    impl<B: ProofSystem> Sealed for Proved<B> {}
    impl<B: ProofSystem> Sealed for Verified<B> {}
    impl<B: ProofSystem> Sealed for Rejected<B> {}

    pub trait HasProof<B: ProofSystem> {
        fn artifacts(&self) -> &ProofArtifacts<B>;
    }
    impl<B: ProofSystem> HasProof<B> for Proved<B> {
        fn artifacts(&self) -> &ProofArtifacts<B> {
            &self.artifacts
        }
    }
    impl<B: ProofSystem> HasProof<B> for Verified<B> {
        fn artifacts(&self) -> &ProofArtifacts<B> {
            &self.artifacts
        }
    }
    impl<B: ProofSystem> HasProof<B> for Rejected<B> {
        fn artifacts(&self) -> &ProofArtifacts<B> {
            &self.artifacts
        }
    }
}

/// Marker trait for workflow states.
pub trait WorkflowState: private::Sealed + std::fmt::Debug {
    /// Canonical state name (e.g. `"KEYS_READY"`).
    fn name() -> &'static str;

    /// Whether no further transition exists.
    fn is_terminal() -> bool {
        false
    }
}

impl WorkflowState for Uninitialized {
    fn name() -> &'static str {
        "UNINITIALIZED"
    }
}
impl WorkflowState for Compiled {
    fn name() -> &'static str {
        "COMPILED"
    }
}
impl<B: ProofSystem> WorkflowState for KeysReady<B> {
    fn name() -> &'static str {
        "KEYS_READY"
    }
}
impl<B: ProofSystem> WorkflowState for WitnessBound<B> {
    fn name() -> &'static str {
        "WITNESS_BOUND"
    }
}
impl<B: ProofSystem> WorkflowState for Proved<B> {
    fn name() -> &'static str {
        "PROVED"
    }
}
impl<B: ProofSystem> WorkflowState for Verified<B> {
    fn name() -> &'static str {
        "VERIFIED"
    }
    fn is_terminal() -> bool {
        true
    }
}
impl<B: ProofSystem> WorkflowState for Rejected<B> {
    fn name() -> &'static str {
        "REJECTED"
    }
    fn is_terminal() -> bool {
        true
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// One state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: &'static str,
    /// State after the transition.
    pub to_state: &'static str,
}

// ─── The Workflow ────────────────────────────────────────────────────

/// The proof pipeline for one circuit shape, parameterized by its stage.
#[derive(Debug)]
pub struct ProofWorkflow<S: WorkflowState, H: CommitmentHash = CommitmentHasher, B: ProofSystem = Groth16Backend> {
    params: CircuitParams,
    hasher: H,
    backend: B,
    state: S,
    transition_log: Vec<TransitionRecord>,
}

impl<S: WorkflowState, H: CommitmentHash, B: ProofSystem> ProofWorkflow<S, H, B> {
    /// Canonical state name.
    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    /// Whether the workflow has reached a verdict.
    pub fn is_terminal(&self) -> bool {
        S::is_terminal()
    }

    /// The validated circuit shape.
    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// The commitment hash.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Every transition so far, oldest first.
    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    fn transition<T: WorkflowState>(mut self, next: impl FnOnce(S) -> T) -> ProofWorkflow<T, H, B> {
        tracing::info!(
            from = S::name(),
            to = T::name(),
            batch_size = self.params.batch_size,
            tree_depth = self.params.tree_depth,
            mode = self.params.mode.name(),
            hash = self.hasher.kind().name(),
            "proof workflow transition"
        );
        self.transition_log.push(TransitionRecord {
            from_state: S::name(),
            to_state: T::name(),
        });
        ProofWorkflow {
            params: self.params,
            hasher: self.hasher,
            backend: self.backend,
            state: next(self.state),
            transition_log: self.transition_log,
        }
    }
}

impl ProofWorkflow<Uninitialized> {
    /// Validate `config` and pick the configured hash with the Groth16
    /// backend.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, WorkflowError> {
        let params = config.validate()?;
        Ok(Self::new(params, CommitmentHasher::new(config.hash), Groth16Backend))
    }
}

impl<H: CommitmentHash, B: ProofSystem> ProofWorkflow<Uninitialized, H, B> {
    /// A workflow over explicit parts.
    pub fn new(params: CircuitParams, hasher: H, backend: B) -> Self {
        Self {
            params,
            hasher,
            backend,
            state: Uninitialized,
            transition_log: Vec::new(),
        }
    }

    /// Synthesize the blank circuit and fix its shape.
    pub fn compile(self) -> Result<ProofWorkflow<Compiled, H, B>, WorkflowError> {
        let circuit = ConsistencyCircuit::blank(self.params, self.hasher.clone());
        let shape = self.backend.compile(circuit)?;
        tracing::info!(
            constraints = shape.num_constraints,
            public_inputs = shape.num_public_inputs,
            witness_variables = shape.num_witness_variables,
            backend = self.backend.name(),
            "circuit compiled"
        );
        Ok(self.transition(|_| Compiled { shape }))
    }
}

impl<H: CommitmentHash, B: ProofSystem> ProofWorkflow<Compiled, H, B> {
    /// The compiled shape.
    pub fn shape(&self) -> &CircuitShape {
        &self.state.shape
    }

    /// One-time, randomized key generation.
    pub fn setup<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<ProofWorkflow<KeysReady<B>, H, B>, WorkflowError> {
        let circuit = ConsistencyCircuit::blank(self.params, self.hasher.clone());
        let (proving_key, verifying_key) = self.backend.setup(circuit, rng)?;
        let keys = Arc::new(KeyPair {
            proving_key,
            verifying_key,
        });
        Ok(self.transition(|compiled| KeysReady {
            shape: compiled.shape,
            keys,
        }))
    }

    /// Reuse keys from an earlier setup of the same shape.
    ///
    /// # Errors
    ///
    /// [`SetupError::KeyShape`](crate::SetupError::KeyShape) when the keys were generated for a circuit
    /// of another shape, [`SetupError::KeyMismatch`](crate::SetupError::KeyMismatch) when the two halves
    /// come from different setups.
    pub fn with_keys(self, keys: KeyPair<B>) -> Result<ProofWorkflow<KeysReady<B>, H, B>, WorkflowError> {
        self.backend
            .check_keys(&keys.proving_key, &keys.verifying_key, &self.state.shape)?;
        Ok(self.transition(|compiled| KeysReady {
            shape: compiled.shape,
            keys: Arc::new(keys),
        }))
    }
}

impl<H: CommitmentHash, B: ProofSystem> ProofWorkflow<KeysReady<B>, H, B> {
    /// The compiled shape.
    pub fn shape(&self) -> &CircuitShape {
        &self.state.shape
    }

    /// The shared key pair; distribute `keys().verifying_key` to verifiers.
    pub fn keys(&self) -> &KeyPair<B> {
        &self.state.keys
    }

    /// Commit to `batch` with this workflow's shape and hash.
    pub fn commit(&self, batch: &Batch) -> Result<(PublicCommitment, Vec<AuthPath>), CryptoError> {
        CommitmentBuilder::new(self.params, self.hasher.clone()).build(batch)
    }

    /// Assemble a witness for this workflow's shape.
    pub fn assemble(
        &self,
        batch: &Batch,
        commitment: PublicCommitment,
        auth_paths: Vec<AuthPath>,
    ) -> Result<Witness, WitnessError> {
        WitnessAssembler::new(self.params).assemble(batch, commitment, auth_paths)
    }

    /// Start a proof attempt for `witness`. The keys stay here for the next
    /// attempt.
    pub fn bind(&self, witness: Witness) -> Result<ProofWorkflow<WitnessBound<B>, H, B>, WorkflowError> {
        if witness.batch_size() != self.params.batch_size {
            return Err(WitnessError::BatchShape {
                expected: self.params.batch_size,
                actual: witness.batch_size(),
            }
            .into());
        }
        let attempt = ProofWorkflow {
            params: self.params,
            hasher: self.hasher.clone(),
            backend: self.backend.clone(),
            state: KeysReady {
                shape: self.state.shape,
                keys: Arc::clone(&self.state.keys),
            },
            transition_log: self.transition_log.clone(),
        };
        Ok(attempt.transition(|ready| WitnessBound {
            keys: ready.keys,
            witness,
        }))
    }

    /// Commit, assemble and bind in one step.
    pub fn bind_batch(&self, batch: &Batch) -> Result<ProofWorkflow<WitnessBound<B>, H, B>, WorkflowError> {
        let (commitment, auth_paths) = self.commit(batch)?;
        let witness = self.assemble(batch, commitment, auth_paths)?;
        self.bind(witness)
    }
}

impl<H: CommitmentHash, B: ProofSystem> ProofWorkflow<WitnessBound<B>, H, B> {
    /// The bound witness.
    pub fn witness(&self) -> &Witness {
        &self.state.witness
    }

    /// Produce the proof. Consumes the witness whether or not proving
    /// succeeds.
    ///
    /// # Errors
    ///
    /// [`ProveError::Assertion`] names the violated assertion class when the
    /// witness is inconsistent; the backend is not invoked in that case.
    pub fn prove<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<ProofWorkflow<Proved<B>, H, B>, WorkflowError> {
        if let Err(class) = self.state.witness.check(&self.hasher) {
            tracing::warn!(assertion = %class, "witness violates circuit assertion, not proving");
            return Err(ProveError::Assertion(class).into());
        }
        let circuit = ConsistencyCircuit::assigned(self.params, self.hasher.clone(), &self.state.witness);
        let proof = self
            .backend
            .prove(&self.state.keys.proving_key, circuit, rng)?;
        let public = self.state.witness.public_inputs().clone();
        Ok(self.transition(|bound| Proved {
            artifacts: ProofArtifacts {
                keys: bound.keys,
                public,
                proof,
            },
        }))
    }
}

/// Outcome of [`ProofWorkflow::verify`].
#[derive(Debug)]
pub enum Verdict<H: CommitmentHash = CommitmentHasher, B: ProofSystem = Groth16Backend> {
    /// The proof holds for its public inputs.
    Verified(ProofWorkflow<Verified<B>, H, B>),
    /// The proof does not hold.
    Rejected(ProofWorkflow<Rejected<B>, H, B>),
}

impl<H: CommitmentHash, B: ProofSystem> Verdict<H, B> {
    /// `true` for [`Verdict::Verified`].
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified(_))
    }
}

impl<H: CommitmentHash, B: ProofSystem> ProofWorkflow<Proved<B>, H, B> {
    /// Verify the proof against the public inputs it was produced for.
    pub fn verify(self) -> Result<Verdict<H, B>, WorkflowError> {
        let valid = self.verify_against(&self.state.artifacts.public)?;
        if valid {
            Ok(Verdict::Verified(self.transition(|proved| Verified {
                artifacts: proved.artifacts,
            })))
        } else {
            tracing::warn!(
                batch_size = self.params.batch_size,
                mode = self.params.mode.name(),
                "proof rejected by verifier"
            );
            Ok(Verdict::Rejected(self.transition(|proved| Rejected {
                artifacts: proved.artifacts,
            })))
        }
    }
}

impl<S, H, B> ProofWorkflow<S, H, B>
where
    S: WorkflowState + private::HasProof<B>,
    H: CommitmentHash,
    B: ProofSystem,
{
    /// The proof.
    pub fn proof(&self) -> &B::Proof {
        &self.state.artifacts().proof
    }

    /// The public inputs the proof was produced for.
    pub fn public_inputs(&self) -> &PublicInputs {
        &self.state.artifacts().public
    }

    /// The verifying key.
    pub fn verifying_key(&self) -> &B::VerifyingKey {
        &self.state.artifacts().keys.verifying_key
    }

    /// Verify the proof against arbitrary public inputs. `Ok(false)` when it
    /// does not hold; the workflow state is unchanged.
    pub fn verify_against(&self, public: &PublicInputs) -> Result<bool, WorkflowError> {
        let artifacts = self.state.artifacts();
        let valid = self
            .backend
            .verify(&artifacts.keys.verifying_key, &public.to_vec(), &artifacts.proof)?;
        if !valid {
            tracing::debug!(public_inputs = public.len(), "proof does not hold for public inputs");
        }
        Ok(valid)
    }
}

impl<S, H> ProofWorkflow<S, H, Groth16Backend>
where
    S: WorkflowState + private::HasProof<Groth16Backend>,
    H: CommitmentHash,
{
    /// Write `proof.json`, `verification_key.json` and `public.json` into
    /// `dir`.
    pub fn export(&self, dir: &Path) -> Result<ExportPaths, ExportError> {
        let artifacts = self.state.artifacts();
        export::export_json(
            dir,
            &artifacts.proof,
            &artifacts.keys.verifying_key,
            &artifacts.public.to_vec(),
        )
    }
}
