//! # Error Types — Commitment Construction
//!
//! Raised by the Merkle tree and the commitment builder when the data they
//! are handed does not have the shape the circuit was configured for.

use thiserror::Error;

/// A commitment could not be built from the supplied data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A tree needs at least one leaf.
    #[error("merkle tree requires at least one leaf")]
    EmptyTree,

    /// Leaves are paired level by level, so their count must be `2^depth`.
    #[error("merkle tree requires a power-of-two leaf count, got {0}")]
    NotPowerOfTwo(usize),

    /// An authentication path was requested for a leaf that does not exist.
    #[error("leaf index {index} out of range for {len} leaves")]
    LeafOutOfRange {
        /// Requested leaf.
        index: usize,
        /// Number of leaves in the tree.
        len: usize,
    },

    /// The batch length disagrees with the configured circuit shape.
    #[error("batch holds {actual} values but the circuit expects {expected}")]
    BatchShape {
        /// Configured `N`.
        expected: usize,
        /// Supplied batch length.
        actual: usize,
    },
}
