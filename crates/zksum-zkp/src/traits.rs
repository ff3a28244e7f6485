//! # Proof System Trait (Sealed)
//!
//! The boundary between the pipeline and the proving backend. The pipeline
//! consumes exactly four operations:
//!
//! ```text
//! compile(circuit)                 -> CircuitShape
//! setup(circuit, rng)              -> (ProvingKey, VerifyingKey)
//! prove(pk, circuit-with-witness)  -> Proof
//! verify(vk, public inputs, proof) -> bool
//! ```
//!
//! Keys persisted from an earlier setup are admitted through
//! [`ProofSystem::check_keys`] before they serve a compiled shape.
//!
//! ## Sealed Trait
//!
//! Only backends defined in this crate can implement [`ProofSystem`]. A
//! backend that skipped the satisfiability check in `prove`, or reported a
//! rejected proof as an error, would silently change the pipeline's
//! contract.

use std::fmt;

use ark_relations::r1cs::ConstraintSynthesizer;
use rand::{CryptoRng, RngCore};

use zksum_core::F;

use crate::error::{CompileError, ProveError, SetupError, VerifyError};

mod private {
    pub trait Sealed {}
    impl Sealed for crate::groth16::Groth16Backend {}
}

/// Size of a compiled circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitShape {
    /// R1CS constraints.
    pub num_constraints: usize,
    /// Public inputs, excluding the constant-one wire.
    pub num_public_inputs: usize,
    /// Private witness variables.
    pub num_witness_variables: usize,
}

/// A zero-knowledge proof system over the pipeline field.
pub trait ProofSystem: private::Sealed + Clone + fmt::Debug + Send + Sync {
    /// Prover key; held only by the prover.
    type ProvingKey: Send + Sync;
    /// Verifier key; distributed to every verifier.
    type VerifyingKey: Clone + Send + Sync;
    /// Proof artifact.
    type Proof: Clone + fmt::Debug + Send + Sync;

    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Synthesize `circuit` without an assignment and report its shape.
    fn compile<C: ConstraintSynthesizer<F>>(&self, circuit: C) -> Result<CircuitShape, CompileError>;

    /// Circuit-specific, randomized key generation.
    fn setup<C, R>(&self, circuit: C, rng: &mut R) -> Result<(Self::ProvingKey, Self::VerifyingKey), SetupError>
    where
        C: ConstraintSynthesizer<F>,
        R: RngCore + CryptoRng;

    /// Check that a key pair from an earlier setup fits `shape`.
    fn check_keys(
        &self,
        pk: &Self::ProvingKey,
        vk: &Self::VerifyingKey,
        shape: &CircuitShape,
    ) -> Result<(), SetupError>;

    /// Prove that `circuit`'s assignment satisfies its constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ProveError::Unsatisfied`] without running the prover when
    /// the assignment violates a constraint.
    fn prove<C, R>(&self, pk: &Self::ProvingKey, circuit: C, rng: &mut R) -> Result<Self::Proof, ProveError>
    where
        C: ConstraintSynthesizer<F> + Clone,
        R: RngCore + CryptoRng;

    /// Check `proof` against `public_inputs`.
    ///
    /// `Ok(false)` is a normal outcome. Errors are reserved for inputs that
    /// cannot be checked at all.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        public_inputs: &[F],
        proof: &Self::Proof,
    ) -> Result<bool, VerifyError>;
}
