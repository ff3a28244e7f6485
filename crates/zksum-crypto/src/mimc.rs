//! # MiMC (Miyaguchi–Preneel)
//!
//! Alternative commitment hash. The block cipher is
//! `E_k(x)`: 110 rounds of `x = (x + k + c_i)^5`, then `x + k`.
//! Messages are absorbed with the Miyaguchi–Preneel construction
//! `h = E_h(m) + h + m`, starting from `h = 0`.
//!
//! A leaf absorbs the single value, a node absorbs `left` then `right`.

use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::SynthesisError;

use zksum_core::{HashKind, F};

use crate::constants;
use crate::hash::{pow5, pow5_var, CommitmentHash};

/// Cipher rounds.
pub const ROUNDS: usize = 110;

const DOMAIN: &[u8] = b"zksum/mimc/bn254/x5";

/// MiMC with its round constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mimc {
    constants: Vec<F>,
}

impl Default for Mimc {
    fn default() -> Self {
        Self::new()
    }
}

impl Mimc {
    /// Derive the round constants.
    pub fn new() -> Self {
        Self {
            constants: constants::derive(DOMAIN, ROUNDS),
        }
    }

    fn encrypt(&self, key: F, mut x: F) -> F {
        for c in &self.constants {
            x = pow5(x + key + c);
        }
        x + key
    }

    fn encrypt_var(&self, key: &FpVar<F>, x: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        let mut x = x.clone();
        for c in &self.constants {
            x = pow5_var(&(&x + key + *c))?;
        }
        Ok(x + key)
    }

    /// Absorb `message` into a fresh chaining value.
    pub fn hash(&self, message: &[F]) -> F {
        message.iter().fold(F::from(0u64), |h, m| self.encrypt(h, *m) + h + m)
    }

    /// Gadget for [`hash`](Self::hash).
    pub fn hash_var(&self, message: &[&FpVar<F>]) -> Result<FpVar<F>, SynthesisError> {
        let mut h = FpVar::zero();
        for m in message {
            h = self.encrypt_var(&h, m)? + &h + *m;
        }
        Ok(h)
    }
}

impl CommitmentHash for Mimc {
    fn kind(&self) -> HashKind {
        HashKind::Mimc
    }

    fn leaf_hash(&self, value: F) -> F {
        self.hash(&[value])
    }

    fn node_hash(&self, left: F, right: F) -> F {
        self.hash(&[left, right])
    }

    fn leaf_hash_var(&self, value: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        self.hash_var(&[value])
    }

    fn node_hash_var(&self, left: &FpVar<F>, right: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        self.hash_var(&[left, right])
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
    fn empty_message_hashes_to_zero() {
        assert_eq!(Mimc::new().hash(&[]), F::from(0u64));
    }

    #[test]
    fn two_blocks_differ_from_one() {
        let m = Mimc::new();
        let v = F::from(2300u64);
        assert_ne!(m.leaf_hash(v), m.node_hash(v, F::from(0u64)));
        assert_ne!(m.node_hash(v, F::from(1u64)), m.node_hash(F::from(1u64), v));
    }

    #[test]
    fn leaf_gadget_cost() {
        let m = Mimc::new();
        let cs = ConstraintSystem::<F>::new_ref();
        let v = FpVar::new_witness(cs.clone(), || Ok(F::from(5u64))).unwrap();
        m.leaf_hash_var(&v).unwrap();
        assert_eq!(cs.num_constraints(), 3 * ROUNDS);
    }

    proptest! {
        #[test]
        fn leaf_gadget_matches_native(v in any::<u64>()) {
            let m = Mimc::new();
            let x = F::from(v);
            let cs = ConstraintSystem::<F>::new_ref();
            let var = FpVar::new_witness(cs.clone(), || Ok(x)).unwrap();
            let out = m.leaf_hash_var(&var).unwrap();
            prop_assert_eq!(out.value().unwrap(), m.leaf_hash(x));
            prop_assert!(cs.is_satisfied().unwrap());
        }

        #[test]
        fn node_gadget_matches_native(l in any::<u64>(), r in any::<u64>()) {
            let m = Mimc::new();
            let (l, r) = (F::from(l), -F::from(r));
            let cs = ConstraintSystem::<F>::new_ref();
            let lv = FpVar::new_witness(cs.clone(), || Ok(l)).unwrap();
            let rv = FpVar::new_witness(cs.clone(), || Ok(r)).unwrap();
            let out = m.node_hash_var(&lv, &rv).unwrap();
            prop_assert_eq!(out.value().unwrap(), m.node_hash(l, r));
            prop_assert!(cs.is_satisfied().unwrap());
        }
    }
}
