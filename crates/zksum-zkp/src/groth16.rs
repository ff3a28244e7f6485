//! # Groth16 over BN254
//!
//! The production backend, built on `ark-groth16`.
//!
//! ## Properties
//!
//! - **Proof size:** three group elements (two G1, one G2).
//! - **Verification time:** constant; three pairings plus one multi-scalar
//!   multiplication over the public inputs.
//! - **Trusted setup:** circuit-specific. Keys are produced once per
//!   circuit shape and reused for every proof of that shape.
//!
//! ## Satisfiability Gate
//!
//! `ark-groth16` does not check that the assignment satisfies the circuit;
//! an unsatisfying witness yields a proof that simply never verifies.
//! [`Groth16Backend::prove`] therefore synthesizes the circuit once into a
//! scratch constraint system and refuses to prove if any constraint fails.

use ark_bn254::Bn254;
use ark_groth16::Groth16;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, OptimizationGoal, SynthesisMode};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use rand::{CryptoRng, RngCore};

use zksum_core::F;

use crate::error::{CompileError, ProveError, SetupError, VerifyError};
use crate::traits::{CircuitShape, ProofSystem};

/// Groth16 proving key over BN254.
pub type ProvingKey = ark_groth16::ProvingKey<Bn254>;
/// Groth16 verifying key over BN254.
pub type VerifyingKey = ark_groth16::VerifyingKey<Bn254>;
/// Groth16 proof over BN254.
pub type Proof = ark_groth16::Proof<Bn254>;

/// Groth16 proof system over BN254.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16Backend;

impl ProofSystem for Groth16Backend {
    type ProvingKey = ProvingKey;
    type VerifyingKey = VerifyingKey;
    type Proof = Proof;

    fn name(&self) -> &'static str {
        "groth16"
    }

    fn compile<C: ConstraintSynthesizer<F>>(&self, circuit: C) -> Result<CircuitShape, CompileError> {
        // same synthesis settings as `Groth16::setup`, so key lengths line up
        let cs = ConstraintSystem::<F>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(SynthesisMode::Setup);
        circuit
            .generate_constraints(cs.clone())
            .map_err(CompileError::Synthesis)?;
        Ok(CircuitShape {
            num_constraints: cs.num_constraints(),
            // instance variable 0 is the constant one
            num_public_inputs: cs.num_instance_variables().saturating_sub(1),
            num_witness_variables: cs.num_witness_variables(),
        })
    }

    fn setup<C, R>(&self, circuit: C, rng: &mut R) -> Result<(ProvingKey, VerifyingKey), SetupError>
    where
        C: ConstraintSynthesizer<F>,
        R: RngCore + CryptoRng,
    {
        Groth16::<Bn254>::setup(circuit, rng).map_err(SetupError::Backend)
    }

    fn check_keys(&self, pk: &ProvingKey, vk: &VerifyingKey, shape: &CircuitShape) -> Result<(), SetupError> {
        let inputs = shape.num_public_inputs + 1;
        let variables = inputs + shape.num_witness_variables;
        let lengths = [
            ("verifying key input bases", inputs, vk.gamma_abc_g1.len()),
            ("proving key A query", variables, pk.a_query.len()),
            ("proving key B query", variables, pk.b_g2_query.len()),
            ("proving key L query", shape.num_witness_variables, pk.l_query.len()),
        ];
        for (what, expected, actual) in lengths {
            if expected != actual {
                return Err(SetupError::KeyShape { what, expected, actual });
            }
        }
        if pk.vk != *vk {
            return Err(SetupError::KeyMismatch);
        }
        Ok(())
    }

    fn prove<C, R>(&self, pk: &ProvingKey, circuit: C, rng: &mut R) -> Result<Proof, ProveError>
    where
        C: ConstraintSynthesizer<F> + Clone,
        R: RngCore + CryptoRng,
    {
        let cs = ConstraintSystem::<F>::new_ref();
        circuit
            .clone()
            .generate_constraints(cs.clone())
            .map_err(ProveError::Backend)?;
        if !cs.is_satisfied().map_err(ProveError::Backend)? {
            let at = cs
                .which_is_unsatisfied()
                .map_err(ProveError::Backend)?
                .unwrap_or_else(|| "unknown constraint".to_string());
            return Err(ProveError::Unsatisfied(at));
        }
        Groth16::<Bn254>::prove(pk, circuit, rng).map_err(ProveError::Backend)
    }

    fn verify(&self, vk: &VerifyingKey, public_inputs: &[F], proof: &Proof) -> Result<bool, VerifyError> {
        let expected = vk.gamma_abc_g1.len().saturating_sub(1);
        if public_inputs.len() != expected {
            return Err(VerifyError::PublicInputCount {
                expected,
                actual: public_inputs.len(),
            });
        }
        Groth16::<Bn254>::verify(vk, public_inputs, proof).map_err(VerifyError::Malformed)
    }
}
