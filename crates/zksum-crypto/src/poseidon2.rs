//! # Poseidon2 (width 2)
//!
//! The default commitment hash. One permutation over a two-element state:
//!
//! ```text
//! M_E · state
//! 4 × full round:    state += rc_full[r]; state = state^5; M_E · state
//! 56 × partial round: state[0] += rc_partial[r]; state[0] = state[0]^5; M_I · state
//! 4 × full round
//! ```
//!
//! with `M_E = [[2, 1], [1, 2]]` and `M_I = [[2, 1], [1, 3]]`. The digest is
//! `state[0]`. A leaf is `P([v, 0])[0]` and a node is `P([l, r])[0]`.
//!
//! The gadget mirrors the native permutation operation for operation; the
//! linear layers are free in R1CS, so one permutation costs
//! `3 × (2 × 8 + 56) = 216` constraints.

use ark_ff::AdditiveGroup;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::SynthesisError;

use zksum_core::{HashKind, F};

use crate::constants;
use crate::hash::{pow5, pow5_var, CommitmentHash};

/// Number of full rounds, split evenly around the partial rounds.
pub const FULL_ROUNDS: usize = 8;

/// Number of partial rounds.
pub const PARTIAL_ROUNDS: usize = 56;

const DOMAIN: &[u8] = b"zksum/poseidon2/bn254/t2";

/// Poseidon2 with its round constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2 {
    full: Vec<[F; 2]>,
    partial: Vec<F>,
}

impl Default for Poseidon2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Poseidon2 {
    /// Derive the round constants.
    pub fn new() -> Self {
        let stream = constants::derive(DOMAIN, 2 * FULL_ROUNDS + PARTIAL_ROUNDS);
        let (full, partial) = stream.split_at(2 * FULL_ROUNDS);
        Self {
            full: full.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
            partial: partial.to_vec(),
        }
    }

    /// Apply the permutation in place.
    pub fn permute(&self, state: &mut [F; 2]) {
        external(state);
        let half = FULL_ROUNDS / 2;
        for rc in &self.full[..half] {
            full_round(state, rc);
        }
        for rc in &self.partial {
            state[0] = pow5(state[0] + rc);
            let sum = state[0] + state[1];
            state[0] += sum;
            state[1] = sum + state[1].double();
        }
        for rc in &self.full[half..] {
            full_round(state, rc);
        }
    }

    /// Permutation gadget.
    pub fn permute_var(&self, state: [FpVar<F>; 2]) -> Result<[FpVar<F>; 2], SynthesisError> {
        let mut state = external_var(state);
        let half = FULL_ROUNDS / 2;
        for rc in &self.full[..half] {
            state = full_round_var(state, rc)?;
        }
        for rc in &self.partial {
            let [s0, s1] = state;
            let s0 = pow5_var(&(s0 + *rc))?;
            let sum = &s0 + &s1;
            state = [&s0 + &sum, &sum + s1.double()?];
        }
        for rc in &self.full[half..] {
            state = full_round_var(state, rc)?;
        }
        Ok(state)
    }

    fn compress(&self, a: F, b: F) -> F {
        let mut state = [a, b];
        self.permute(&mut state);
        state[0]
    }

    fn compress_var(&self, a: FpVar<F>, b: FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        let [digest, _] = self.permute_var([a, b])?;
        Ok(digest)
    }
}

fn external(state: &mut [F; 2]) {
    let sum = state[0] + state[1];
    state[0] += sum;
    state[1] += sum;
}

fn full_round(state: &mut [F; 2], rc: &[F; 2]) {
    state[0] = pow5(state[0] + rc[0]);
    state[1] = pow5(state[1] + rc[1]);
    external(state);
}

fn external_var(state: [FpVar<F>; 2]) -> [FpVar<F>; 2] {
    let [s0, s1] = state;
    let sum = &s0 + &s1;
    [s0 + &sum, s1 + sum]
}

fn full_round_var(state: [FpVar<F>; 2], rc: &[F; 2]) -> Result<[FpVar<F>; 2], SynthesisError> {
    let [s0, s1] = state;
    let s0 = pow5_var(&(s0 + rc[0]))?;
    let s1 = pow5_var(&(s1 + rc[1]))?;
    Ok(external_var([s0, s1]))
}

impl CommitmentHash for Poseidon2 {
    fn kind(&self) -> HashKind {
        HashKind::Poseidon2
    }

    fn leaf_hash(&self, value: F) -> F {
        self.compress(value, F::from(0u64))
    }

    fn node_hash(&self, left: F, right: F) -> F {
        self.compress(left, right)
    }

    fn leaf_hash_var(&self, value: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        self.compress_var(value.clone(), FpVar::zero())
    }

    fn node_hash_var(&self, left: &FpVar<F>, right: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        self.compress_var(left.clone(), right.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::ConstraintSystem;
    use proptest::prelude::*;

    #[test]
    fn constant_table_shape() {
        let p = Poseidon2::new();
        assert_eq!(p.full.len(), FULL_ROUNDS);
        assert_eq!(p.partial.len(), PARTIAL_ROUNDS);
        assert_eq!(p, Poseidon2::default());
    }

    #[test]
    fn permutation_is_not_identity_on_zero() {
        let p = Poseidon2::new();
        let mut state = [F::from(0u64); 2];
        p.permute(&mut state);
        assert_ne!(state, [F::from(0u64); 2]);
    }

    #[test]
    fn leaf_and_node_are_distinct_for_same_value() {
        let p = Poseidon2::new();
        let v = F::from(4234u64);
        assert_ne!(p.leaf_hash(v), p.node_hash(v, v));
        assert_eq!(p.leaf_hash(v), p.node_hash(v, F::from(0u64)));
    }

    #[test]
    fn node_hash_is_order_sensitive() {
        let p = Poseidon2::new();
        let (a, b) = (F::from(1300u64), F::from(2300u64));
        assert_ne!(p.node_hash(a, b), p.node_hash(b, a));
    }

    #[test]
    fn permutation_gadget_constraint_count() {
        let p = Poseidon2::new();
        let cs = ConstraintSystem::<F>::new_ref();
        let a = FpVar::new_witness(cs.clone(), || Ok(F::from(1u64))).unwrap();
        let b = FpVar::new_witness(cs.clone(), || Ok(F::from(2u64))).unwrap();
        p.permute_var([a, b]).unwrap();
        assert_eq!(cs.num_constraints(), 3 * (2 * FULL_ROUNDS + PARTIAL_ROUNDS));
    }

    proptest! {
        #[test]
        fn leaf_gadget_matches_native(v in any::<u64>(), negate in any::<bool>()) {
            let p = Poseidon2::new();
            let x = if negate { -F::from(v) } else { F::from(v) };
            let cs = ConstraintSystem::<F>::new_ref();
            let var = FpVar::new_witness(cs.clone(), || Ok(x)).unwrap();
            let out = p.leaf_hash_var(&var).unwrap();
            prop_assert_eq!(out.value().unwrap(), p.leaf_hash(x));
            prop_assert!(cs.is_satisfied().unwrap());
        }

        #[test]
        fn node_gadget_matches_native(l in any::<u64>(), r in any::<u64>()) {
            let p = Poseidon2::new();
            let (l, r) = (F::from(l), F::from(r));
            let cs = ConstraintSystem::<F>::new_ref();
            let lv = FpVar::new_witness(cs.clone(), || Ok(l)).unwrap();
            let rv = FpVar::new_witness(cs.clone(), || Ok(r)).unwrap();
            let out = p.node_hash_var(&lv, &rv).unwrap();
            prop_assert_eq!(out.value().unwrap(), p.node_hash(l, r));
            prop_assert!(cs.is_satisfied().unwrap());
        }
    }
}
