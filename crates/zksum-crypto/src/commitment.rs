//! # Commitment Builder
//!
//! Binds a [`Batch`] to public data before any proof is produced.
//!
//! - **Linear** mode publishes `leaf_hash(v_i)` for every slot. The circuit
//!   checks each value against its own digest; there is no aggregate root.
//! - **Tree** mode folds the leaf digests into a [`MerkleTree`] and
//!   publishes only the root, together with one [`AuthPath`] per slot for
//!   the witness.
//!
//! Padding slots are hashed exactly like real values.

use zksum_core::{Batch, CircuitParams, CommitmentMode, F};

use crate::error::CryptoError;
use crate::hash::CommitmentHash;
use crate::merkle::{AuthPath, MerkleTree};

/// The public half of a commitment, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicCommitment {
    /// Merkle root over all leaf digests.
    Root(F),
    /// One digest per slot, in slot order.
    Digests(Vec<F>),
}

impl PublicCommitment {
    /// The mode this commitment was built in.
    pub fn mode(&self) -> CommitmentMode {
        match self {
            PublicCommitment::Root(_) => CommitmentMode::Tree,
            PublicCommitment::Digests(_) => CommitmentMode::Linear,
        }
    }

    /// The public field elements, in circuit allocation order.
    pub fn elements(&self) -> &[F] {
        match self {
            PublicCommitment::Root(root) => std::slice::from_ref(root),
            PublicCommitment::Digests(digests) => digests,
        }
    }
}

/// Builds commitments for one circuit shape.
#[derive(Debug, Clone)]
pub struct CommitmentBuilder<H> {
    params: CircuitParams,
    hasher: H,
}

impl<H: CommitmentHash> CommitmentBuilder<H> {
    /// A builder for batches of `params.batch_size` values.
    pub fn new(params: CircuitParams, hasher: H) -> Self {
        Self { params, hasher }
    }

    /// The shape this builder commits to.
    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// The hash in use.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Commit to `batch`. Authentication paths are empty in linear mode.
    pub fn build(&self, batch: &Batch) -> Result<(PublicCommitment, Vec<AuthPath>), CryptoError> {
        if batch.len() != self.params.batch_size {
            return Err(CryptoError::BatchShape {
                expected: self.params.batch_size,
                actual: batch.len(),
            });
        }
        let leaves: Vec<F> = batch
            .field_elements()
            .into_iter()
            .map(|v| self.hasher.leaf_hash(v))
            .collect();

        match self.params.mode {
            CommitmentMode::Linear => {
                tracing::debug!(
                    batch_size = leaves.len(),
                    hash = self.hasher.kind().name(),
                    "built linear commitment"
                );
                Ok((PublicCommitment::Digests(leaves), Vec::new()))
            }
            CommitmentMode::Tree => {
                let tree = MerkleTree::from_leaves(leaves, &self.hasher)?;
                tracing::debug!(
                    batch_size = tree.leaves().len(),
                    tree_depth = tree.depth(),
                    hash = self.hasher.kind().name(),
                    "built merkle commitment"
                );
                Ok((PublicCommitment::Root(tree.root()), tree.auth_paths()))
            }
        }
    }
}
