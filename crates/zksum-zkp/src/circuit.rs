//! # Consistency Circuit
//!
//! One R1CS circuit for both commitment modes and every hash. For a batch of
//! `N` private values it proves:
//!
//! 1. `Σ values[i] == ExpectedSum` (public),
//! 2. in linear mode, `leaf_hash(values[i]) == Hashes[i]` (public) for each i,
//! 3. in tree mode, folding `leaf_hash(values[i])` up its authentication
//!    path reaches `Root` (public) for each i.
//!
//! ## Variable Layout
//!
//! Public inputs are allocated first, `ExpectedSum` then the commitment
//! elements, matching [`PublicInputs::to_vec`](crate::PublicInputs::to_vec).
//! Private variables follow slot by slot: `values[i]`, then for each level
//! `sibling[i][d]` and `side[i][d]`.
//!
//! ## Security Invariant
//!
//! Every side bit is constrained to `{0, 1}` by [`enforce_bit`]. The path
//! selector `left = side · (cur − sib) + sib` is affine in `side`; with a
//! non-binary `side` a prover could choose `left` freely and forge a path to
//! any root.

use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use zksum_core::{CircuitParams, CommitmentMode, F};
use zksum_crypto::CommitmentHash;

use crate::witness::Witness;

/// Constrain `bit · (bit − 1) = 0`.
pub fn enforce_bit(bit: &FpVar<F>) -> Result<(), SynthesisError> {
    bit.mul_equals(&(bit - F::from(1u64)), &FpVar::zero())
}

/// Order `(cur, sib)` into `(left, right)`: `(cur, sib)` when `side = 1`,
/// `(sib, cur)` when `side = 0`. Costs one constraint.
pub fn select_pair(
    side: &FpVar<F>,
    cur: &FpVar<F>,
    sib: &FpVar<F>,
) -> Result<(FpVar<F>, FpVar<F>), SynthesisError> {
    let left = side * &(cur - sib) + sib;
    let right = cur + sib - &left;
    Ok((left, right))
}

/// The commitment-and-sum consistency circuit.
///
/// A circuit without a witness is the *blank* circuit used for compile and
/// setup; its variable layout is identical to an assigned one.
#[derive(Debug, Clone)]
pub struct ConsistencyCircuit<'w, H> {
    params: CircuitParams,
    hasher: H,
    witness: Option<&'w Witness>,
}

impl<H: CommitmentHash> ConsistencyCircuit<'static, H> {
    /// The shape-only circuit.
    pub fn blank(params: CircuitParams, hasher: H) -> Self {
        Self {
            params,
            hasher,
            witness: None,
        }
    }
}

impl<'w, H: CommitmentHash> ConsistencyCircuit<'w, H> {
    /// The circuit assigned with `witness`, which must come from a
    /// [`WitnessAssembler`](crate::WitnessAssembler) for the same `params`.
    pub fn assigned(params: CircuitParams, hasher: H, witness: &'w Witness) -> Self {
        Self {
            params,
            hasher,
            witness: Some(witness),
        }
    }

    fn assignment(&self, f: impl FnOnce(&Witness) -> Option<F>) -> Result<F, SynthesisError> {
        self.witness.and_then(f).ok_or(SynthesisError::AssignmentMissing)
    }
}

impl<H: CommitmentHash> ConstraintSynthesizer<F> for ConsistencyCircuit<'_, H> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let params = self.params;

        let expected_sum = FpVar::new_input(cs.clone(), || {
            self.assignment(|w| Some(w.public.expected_sum()))
        })?;
        let commitment = (0..params.commitment_len())
            .map(|j| {
                FpVar::new_input(cs.clone(), || {
                    self.assignment(|w| w.public.commitment().elements().get(j).copied())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut acc = FpVar::<F>::zero();
        for i in 0..params.batch_size {
            let value = FpVar::new_witness(cs.clone(), || self.assignment(|w| w.values.get(i).copied()))?;
            acc += &value;
            let digest = self.hasher.leaf_hash_var(&value)?;

            match params.mode {
                CommitmentMode::Linear => digest.enforce_equal(&commitment[i])?,
                CommitmentMode::Tree => {
                    let mut cur = digest;
                    for d in 0..params.tree_depth {
                        let step = |w: &Witness| w.auth_paths.get(i).and_then(|p| p.steps.get(d)).copied();
                        let sibling = FpVar::new_witness(cs.clone(), || {
                            self.assignment(|w| step(w).map(|s| s.sibling))
                        })?;
                        let side = FpVar::new_witness(cs.clone(), || {
                            self.assignment(|w| step(w).map(|s| F::from(s.is_right)))
                        })?;
                        enforce_bit(&side)?;
                        let (left, right) = select_pair(&side, &cur, &sibling)?;
                        cur = self.hasher.node_hash_var(&left, &right)?;
                    }
                    cur.enforce_equal(&commitment[0])?;
                }
            }
        }
        acc.enforce_equal(&expected_sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::{ConstraintSystem, SynthesisMode};
    use zksum_core::{FixedPointEncoder, PipelineConfig, PrecisionPolicy};
    use zksum_crypto::{CommitmentBuilder, Poseidon2, PublicCommitment};

    use crate::witness::WitnessAssembler;

    fn params(mode: CommitmentMode, n: usize) -> CircuitParams {
        PipelineConfig {
            batch_size: n,
            mode,
            ..PipelineConfig::default()
        }
        .validate()
        .unwrap()
    }

    fn witness(params: CircuitParams, values: &[f64]) -> Witness {
        let batch = FixedPointEncoder::new(1000, PrecisionPolicy::Round)
            .unwrap()
            .encode_batch(values, params.batch_size)
            .unwrap();
        let (commitment, paths) = CommitmentBuilder::new(params, Poseidon2::new()).build(&batch).unwrap();
        WitnessAssembler::new(params).assemble(&batch, commitment, paths).unwrap()
    }

    fn satisfied(circuit: ConsistencyCircuit<'_, Poseidon2>) -> bool {
        let cs = ConstraintSystem::<F>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn enforce_bit_rejects_two() {
        for (value, ok) in [(0u64, true), (1, true), (2, false)] {
            let cs = ConstraintSystem::<F>::new_ref();
            let bit = FpVar::new_witness(cs.clone(), || Ok(F::from(value))).unwrap();
            enforce_bit(&bit).unwrap();
            assert_eq!(cs.is_satisfied().unwrap(), ok, "bit = {value}");
        }
    }

    #[test]
    fn select_pair_orders_by_side() {
        let cs = ConstraintSystem::<F>::new_ref();
        let cur = FpVar::new_witness(cs.clone(), || Ok(F::from(10u64))).unwrap();
        let sib = FpVar::new_witness(cs.clone(), || Ok(F::from(20u64))).unwrap();
        for (side, expect) in [(1u64, (10u64, 20u64)), (0, (20, 10))] {
            let s = FpVar::new_witness(cs.clone(), || Ok(F::from(side))).unwrap();
            let (l, r) = select_pair(&s, &cur, &sib).unwrap();
            assert_eq!(l.value().unwrap(), F::from(expect.0));
            assert_eq!(r.value().unwrap(), F::from(expect.1));
        }
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn non_binary_side_bit_forges_nothing() {
        // side = 2 with a sibling picked so that left equals a target value
        // would satisfy the selector; enforce_bit must still fail.
        let cs = ConstraintSystem::<F>::new_ref();
        let cur = FpVar::new_witness(cs.clone(), || Ok(F::from(3u64))).unwrap();
        let sib = FpVar::new_witness(cs.clone(), || Ok(F::from(1u64))).unwrap();
        let side = FpVar::new_witness(cs.clone(), || Ok(F::from(2u64))).unwrap();
        let (left, _) = select_pair(&side, &cur, &sib).unwrap();
        assert_eq!(left.value().unwrap(), F::from(5u64));
        assert!(cs.is_satisfied().unwrap());
        enforce_bit(&side).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn blank_circuit_synthesizes_in_setup_mode() {
        let p = params(CommitmentMode::Tree, 4);
        let cs = ConstraintSystem::<F>::new_ref();
        cs.set_mode(SynthesisMode::Setup);
        ConsistencyCircuit::blank(p, Poseidon2::new())
            .generate_constraints(cs.clone())
            .unwrap();
        assert_eq!(cs.num_instance_variables(), 1 + p.num_public_inputs());
        // values, plus sibling and side per level
        assert!(cs.num_witness_variables() >= 4 * (1 + 2 * 2));
    }

    #[test]
    fn blank_circuit_cannot_be_proved() {
        let p = params(CommitmentMode::Tree, 2);
        let cs = ConstraintSystem::<F>::new_ref();
        let err = ConsistencyCircuit::blank(p, Poseidon2::new())
            .generate_constraints(cs)
            .unwrap_err();
        assert!(matches!(err, SynthesisError::AssignmentMissing));
    }

    #[test]
    fn valid_tree_witness_satisfies() {
        let p = params(CommitmentMode::Tree, 8);
        let w = witness(p, &[1.3, 2.3, 4.234]);
        assert!(satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }

    #[test]
    fn valid_linear_witness_satisfies() {
        let p = params(CommitmentMode::Linear, 5);
        let w = witness(p, &[1.3, 2.3, 4.234]);
        assert!(satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }

    #[test]
    fn wrong_declared_sum_is_unsatisfied() {
        let p = params(CommitmentMode::Tree, 4);
        let mut w = witness(p, &[1.3, 2.3, 4.234]);
        w.public = w.public.with_expected_sum(F::from(7835u64));
        assert!(!satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }

    #[test]
    fn wrong_root_is_unsatisfied() {
        let p = params(CommitmentMode::Tree, 4);
        let mut w = witness(p, &[1.3, 2.3, 4.234]);
        w.public = crate::PublicInputs::new(w.public.expected_sum(), PublicCommitment::Root(F::from(1u64)));
        assert!(!satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }

    #[test]
    fn flipped_side_bit_is_unsatisfied() {
        let p = params(CommitmentMode::Tree, 4);
        let mut w = witness(p, &[1.3, 2.3, 4.234]);
        w.auth_paths[2].steps[1].is_right = !w.auth_paths[2].steps[1].is_right;
        assert!(!satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }

    #[test]
    fn mutated_value_is_unsatisfied() {
        let p = params(CommitmentMode::Linear, 4);
        let mut w = witness(p, &[1.3, 2.3, 4.234]);
        w.values[0] += F::from(1u64);
        assert!(!satisfied(ConsistencyCircuit::assigned(p, Poseidon2::new(), &w)));
    }
}
