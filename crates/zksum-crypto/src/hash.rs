//! # Commitment Hash Capability
//!
//! Tree construction and the consistency circuit never name a concrete
//! hash. They are parameterized over [`CommitmentHash`], which bundles the
//! two digest operations in both of their forms:
//!
//! | Operation   | Native                 | In-circuit                       |
//! |-------------|------------------------|----------------------------------|
//! | leaf digest | [`leaf_hash`]          | [`leaf_hash_var`]                |
//! | node digest | [`node_hash`]          | [`node_hash_var`]                |
//!
//! ## Security Invariant
//!
//! For every input, the native result must equal the value of the gadget
//! output. A mismatch does not produce an error anywhere: the builder
//! publishes a commitment the circuit can never re-derive, and every proof
//! fails at the prove step. Each implementation carries parity tests.
//!
//! [`leaf_hash`]: CommitmentHash::leaf_hash
//! [`node_hash`]: CommitmentHash::node_hash
//! [`leaf_hash_var`]: CommitmentHash::leaf_hash_var
//! [`node_hash_var`]: CommitmentHash::node_hash_var

use std::fmt;

use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::SynthesisError;

use zksum_core::{HashKind, F};

use crate::mimc::Mimc;
use crate::poseidon2::Poseidon2;

/// An arithmetization-friendly hash usable both natively and in R1CS.
pub trait CommitmentHash: Clone + fmt::Debug + Send + Sync {
    /// Which configured hash this is.
    fn kind(&self) -> HashKind;

    /// Digest of one value.
    fn leaf_hash(&self, value: F) -> F;

    /// Digest of an ordered pair of child digests.
    fn node_hash(&self, left: F, right: F) -> F;

    /// Gadget for [`leaf_hash`](Self::leaf_hash).
    fn leaf_hash_var(&self, value: &FpVar<F>) -> Result<FpVar<F>, SynthesisError>;

    /// Gadget for [`node_hash`](Self::node_hash).
    fn node_hash_var(&self, left: &FpVar<F>, right: &FpVar<F>) -> Result<FpVar<F>, SynthesisError>;
}

/// Runtime choice between the built-in hashes, selected by [`HashKind`].
#[derive(Debug, Clone)]
pub enum CommitmentHasher {
    /// Poseidon2, width 2.
    Poseidon2(Poseidon2),
    /// MiMC, Miyaguchi–Preneel.
    Mimc(Mimc),
}

impl CommitmentHasher {
    /// Build the hasher for `kind`, deriving its round constants.
    pub fn new(kind: HashKind) -> Self {
        match kind {
            HashKind::Poseidon2 => CommitmentHasher::Poseidon2(Poseidon2::new()),
            HashKind::Mimc => CommitmentHasher::Mimc(Mimc::new()),
        }
    }
}

impl From<HashKind> for CommitmentHasher {
    fn from(kind: HashKind) -> Self {
        Self::new(kind)
    }
}

impl CommitmentHash for CommitmentHasher {
    fn kind(&self) -> HashKind {
        match self {
            CommitmentHasher::Poseidon2(h) => h.kind(),
            CommitmentHasher::Mimc(h) => h.kind(),
        }
    }

    fn leaf_hash(&self, value: F) -> F {
        match self {
            CommitmentHasher::Poseidon2(h) => h.leaf_hash(value),
            CommitmentHasher::Mimc(h) => h.leaf_hash(value),
        }
    }

    fn node_hash(&self, left: F, right: F) -> F {
        match self {
            CommitmentHasher::Poseidon2(h) => h.node_hash(left, right),
            CommitmentHasher::Mimc(h) => h.node_hash(left, right),
        }
    }

    fn leaf_hash_var(&self, value: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        match self {
            CommitmentHasher::Poseidon2(h) => h.leaf_hash_var(value),
            CommitmentHasher::Mimc(h) => h.leaf_hash_var(value),
        }
    }

    fn node_hash_var(&self, left: &FpVar<F>, right: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
        match self {
            CommitmentHasher::Poseidon2(h) => h.node_hash_var(left, right),
            CommitmentHasher::Mimc(h) => h.node_hash_var(left, right),
        }
    }
}

/// `x^5`, the S-box shared by both permutations.
#[inline]
pub(crate) fn pow5(x: F) -> F {
    let x2 = x * x;
    let x4 = x2 * x2;
    x4 * x
}

/// `x^5` in three constraints.
pub(crate) fn pow5_var(x: &FpVar<F>) -> Result<FpVar<F>, SynthesisError> {
    let x2 = x.square()?;
    let x4 = x2.square()?;
    Ok(x4 * x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn pow5_gadget_matches_native() {
        let cs = ConstraintSystem::<F>::new_ref();
        let x = F::from(7u64);
        let var = FpVar::new_witness(cs.clone(), || Ok(x)).unwrap();
        let out = pow5_var(&var).unwrap();
        assert_eq!(out.value().unwrap(), F::from(16807u64));
        assert_eq!(pow5(x), F::from(16807u64));
        assert!(cs.is_satisfied().unwrap());
        assert_eq!(cs.num_constraints(), 3);
    }

    #[test]
    fn dispatcher_reports_configured_kind() {
        assert_eq!(CommitmentHasher::new(HashKind::Poseidon2).kind(), HashKind::Poseidon2);
        assert_eq!(CommitmentHasher::from(HashKind::Mimc).kind(), HashKind::Mimc);
    }

    #[test]
    fn hashes_disagree_with_each_other() {
        let p = CommitmentHasher::new(HashKind::Poseidon2);
        let m = CommitmentHasher::new(HashKind::Mimc);
        let v = F::from(1300u64);
        assert_ne!(p.leaf_hash(v), m.leaf_hash(v));
    }
}
