//! # zksum-crypto — Commitment Primitives
//!
//! Everything the pipeline needs to bind a batch to public data:
//!
//! - **Hash capability** ([`CommitmentHash`]): leaf and node digests, each
//!   available natively and as an R1CS gadget.
//! - **Poseidon2** (default) and **MiMC** implementations of it.
//! - **Merkle tree** with authentication paths and side bits.
//! - **Commitment builder** producing the linear digest list or the tree
//!   root plus per-slot paths.
//!
//! ## Crate Policy
//!
//! - Depends only on `zksum-core` internally.
//! - Tree construction and circuits are generic over the hash; nothing is
//!   duplicated per hash choice.
//! - No mocking of hashes in tests: parity tests run the real native code
//!   against the real gadgets.

#![forbid(unsafe_code)]

pub mod commitment;
mod constants;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod mimc;
pub mod poseidon2;

pub use commitment::{CommitmentBuilder, PublicCommitment};
pub use error::CryptoError;
pub use hash::{CommitmentHash, CommitmentHasher};
pub use merkle::{AuthPath, MerkleTree, PathStep};
pub use mimc::Mimc;
pub use poseidon2::Poseidon2;
