//! # Witness Assembler
//!
//! Binds a batch, its public commitment and its authentication paths into
//! the [`Witness`] the circuit consumes, and separates out the
//! [`PublicInputs`] a verifier sees.
//!
//! ## Public-Input Order
//!
//! Public inputs are ordered alphabetically by name, the order the circuit
//! allocates them in and the order `public.json` carries:
//!
//! | Mode   | Order                                   |
//! |--------|-----------------------------------------|
//! | tree   | `ExpectedSum`, `Root`                   |
//! | linear | `ExpectedSum`, `Hashes[0]` … `Hashes[N-1]` |
//!
//! Changing this order still verifies locally, because the local verifier
//! reads the same vector, but breaks every external verifier.

use zksum_core::{Batch, CircuitParams, CommitmentMode, F};
use zksum_crypto::{AuthPath, CommitmentHash, PublicCommitment};

use crate::error::{AssertionClass, WitnessError};

/// The public subset of a witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicInputs {
    expected_sum: F,
    commitment: PublicCommitment,
}

impl PublicInputs {
    /// Pair a declared sum with a commitment.
    pub fn new(expected_sum: F, commitment: PublicCommitment) -> Self {
        Self {
            expected_sum,
            commitment,
        }
    }

    /// Parse a flat vector in canonical order for a circuit of shape `params`.
    pub fn from_elements(params: &CircuitParams, elements: &[F]) -> Result<Self, WitnessError> {
        let expected = params.num_public_inputs();
        let Some((expected_sum, rest)) = elements.split_first().filter(|_| elements.len() == expected) else {
            return Err(WitnessError::PublicInputCount {
                expected,
                actual: elements.len(),
            });
        };
        let commitment = match params.mode {
            CommitmentMode::Tree => PublicCommitment::Root(rest[0]),
            CommitmentMode::Linear => PublicCommitment::Digests(rest.to_vec()),
        };
        Ok(Self::new(*expected_sum, commitment))
    }

    /// The declared sum.
    pub fn expected_sum(&self) -> F {
        self.expected_sum
    }

    /// The published commitment.
    pub fn commitment(&self) -> &PublicCommitment {
        &self.commitment
    }

    /// The same inputs with a different declared sum.
    pub fn with_expected_sum(&self, expected_sum: F) -> Self {
        Self {
            expected_sum,
            commitment: self.commitment.clone(),
        }
    }

    /// Number of field elements.
    pub fn len(&self) -> usize {
        1 + self.commitment.elements().len()
    }

    /// Never true; the declared sum is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flat vector in canonical order.
    pub fn to_vec(&self) -> Vec<F> {
        let mut out = Vec::with_capacity(self.len());
        out.push(self.expected_sum);
        out.extend_from_slice(self.commitment.elements());
        out
    }
}

/// Full private and public assignment for one proof.
///
/// Not `Clone`: a witness is consumed by exactly one prove call.
#[derive(Debug, PartialEq, Eq)]
pub struct Witness {
    pub(crate) values: Vec<F>,
    pub(crate) auth_paths: Vec<AuthPath>,
    pub(crate) public: PublicInputs,
}

impl Witness {
    /// The public subset.
    pub fn public_inputs(&self) -> &PublicInputs {
        &self.public
    }

    /// Number of value slots.
    pub fn batch_size(&self) -> usize {
        self.values.len()
    }

    /// The same private data declared against other public inputs.
    ///
    /// The replacement must have the shape of the original; whether it is
    /// consistent with the private data is again the circuit's question.
    pub fn with_public_inputs(mut self, public: PublicInputs) -> Result<Self, WitnessError> {
        if public.commitment.mode() != self.public.commitment.mode() {
            return Err(WitnessError::ModeMismatch {
                expected: self.public.commitment.mode(),
                actual: public.commitment.mode(),
            });
        }
        let expected = self.public.commitment.elements().len();
        if public.commitment.elements().len() != expected {
            return Err(WitnessError::CommitmentLength {
                expected,
                actual: public.commitment.elements().len(),
            });
        }
        self.public = public;
        Ok(self)
    }

    /// Re-run every circuit assertion natively.
    ///
    /// Reports the first violated assertion class; the sum is checked last.
    pub fn check<H: CommitmentHash>(&self, hasher: &H) -> Result<(), AssertionClass> {
        match &self.public.commitment {
            PublicCommitment::Digests(digests) => {
                for (index, (value, digest)) in self.values.iter().zip(digests).enumerate() {
                    if hasher.leaf_hash(*value) != *digest {
                        return Err(AssertionClass::Digest { index });
                    }
                }
            }
            PublicCommitment::Root(root) => {
                for (index, (value, path)) in self.values.iter().zip(&self.auth_paths).enumerate() {
                    if !path.verify(hasher.leaf_hash(*value), *root, hasher) {
                        return Err(AssertionClass::MerklePath { index });
                    }
                }
            }
        }
        let sum: F = self.values.iter().sum();
        if sum != self.public.expected_sum {
            return Err(AssertionClass::Sum);
        }
        Ok(())
    }
}

/// Assembles witnesses for one circuit shape.
#[derive(Debug, Clone, Copy)]
pub struct WitnessAssembler {
    params: CircuitParams,
}

impl WitnessAssembler {
    /// An assembler for circuits of shape `params`.
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }

    /// Bind `batch`, its commitment and its paths.
    ///
    /// Only shapes are checked here. Whether the data is consistent is the
    /// circuit's question, answered at prove time.
    pub fn assemble(
        &self,
        batch: &Batch,
        commitment: PublicCommitment,
        auth_paths: Vec<AuthPath>,
    ) -> Result<Witness, WitnessError> {
        let params = &self.params;
        if batch.len() != params.batch_size {
            return Err(WitnessError::BatchShape {
                expected: params.batch_size,
                actual: batch.len(),
            });
        }
        if commitment.mode() != params.mode {
            return Err(WitnessError::ModeMismatch {
                expected: params.mode,
                actual: commitment.mode(),
            });
        }
        if commitment.elements().len() != params.commitment_len() {
            return Err(WitnessError::CommitmentLength {
                expected: params.commitment_len(),
                actual: commitment.elements().len(),
            });
        }
        let expected_paths = match params.mode {
            CommitmentMode::Tree => params.batch_size,
            CommitmentMode::Linear => 0,
        };
        if auth_paths.len() != expected_paths {
            return Err(WitnessError::AuthPathCount {
                expected: expected_paths,
                actual: auth_paths.len(),
            });
        }
        for (index, path) in auth_paths.iter().enumerate() {
            if path.leaf_index != index {
                return Err(WitnessError::AuthPathOrder {
                    index,
                    leaf_index: path.leaf_index,
                });
            }
            if path.depth() != params.tree_depth {
                return Err(WitnessError::AuthPathDepth {
                    index,
                    expected: params.tree_depth,
                    actual: path.depth(),
                });
            }
        }
        Ok(Witness {
            values: batch.field_elements(),
            auth_paths,
            public: PublicInputs::new(batch.expected_sum(), commitment),
        })
    }
}
