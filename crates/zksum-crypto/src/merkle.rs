//! # Merkle Tree
//!
//! A complete binary tree over `N = 2^depth` leaf digests. Level 0 holds the
//! leaves; level `d + 1` pairs elements `2k` and `2k + 1` of level `d`
//! left-to-right. The root is the single element of level `depth`.
//!
//! ## Authentication Paths
//!
//! The path for leaf `i` has one [`PathStep`] per level. At level `d` the
//! running index is `i >> d` and its sibling is `(i >> d) ^ 1`. The step's
//! `is_right` flag is set when the sibling sits to the right, i.e. the
//! running hash is the left input of the pairing:
//!
//! ```text
//! is_right = 1  =>  cur = H(cur, sibling)
//! is_right = 0  =>  cur = H(sibling, cur)
//! ```
//!
//! The circuit reads the flag with the same meaning, so a path produced here
//! replays to the root both natively ([`AuthPath::replay`]) and in-circuit.

use zksum_core::F;

use crate::error::CryptoError;
use crate::hash::CommitmentHash;

/// One level of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Digest of the running node's sibling at this level.
    pub sibling: F,
    /// `true` when the sibling is the right input of the pairing.
    pub is_right: bool,
}

/// Sibling digests and side bits from a leaf up to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPath {
    /// Position of the leaf in the batch.
    pub leaf_index: usize,
    /// One step per level, leaf level first.
    pub steps: Vec<PathStep>,
}

impl AuthPath {
    /// Number of levels the path climbs.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Fold `leaf` up the path.
    pub fn replay<H: CommitmentHash>(&self, leaf: F, hasher: &H) -> F {
        self.steps.iter().fold(leaf, |cur, step| {
            if step.is_right {
                hasher.node_hash(cur, step.sibling)
            } else {
                hasher.node_hash(step.sibling, cur)
            }
        })
    }

    /// Whether `leaf` replays to `root`.
    pub fn verify<H: CommitmentHash>(&self, leaf: F, root: F, hasher: &H) -> bool {
        self.replay(leaf, hasher) == root
    }
}

/// All levels of a complete binary Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<F>>,
}

impl MerkleTree {
    /// Build the tree over already-hashed leaves.
    pub fn from_leaves<H: CommitmentHash>(leaves: Vec<F>, hasher: &H) -> Result<Self, CryptoError> {
        let n = leaves.len();
        if n == 0 {
            return Err(CryptoError::EmptyTree);
        }
        if !n.is_power_of_two() {
            return Err(CryptoError::NotPowerOfTwo(n));
        }
        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|l| l.len() > 1) {
            let next = level
                .chunks_exact(2)
                .map(|pair| hasher.node_hash(pair[0], pair[1]))
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// `log2(N)`.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Leaf digests in slot order.
    pub fn leaves(&self) -> &[F] {
        &self.levels[0]
    }

    /// The root digest.
    pub fn root(&self) -> F {
        // levels is never empty and its last level holds exactly one node
        self.levels[self.depth()][0]
    }

    /// Authentication path for leaf `index`.
    pub fn auth_path(&self, index: usize) -> Result<AuthPath, CryptoError> {
        let len = self.leaves().len();
        if index >= len {
            return Err(CryptoError::LeafOutOfRange { index, len });
        }
        let mut pos = index;
        let mut steps = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.depth()] {
            let sibling_pos = pos ^ 1;
            steps.push(PathStep {
                sibling: level[sibling_pos],
                is_right: sibling_pos > pos,
            });
            pos >>= 1;
        }
        Ok(AuthPath {
            leaf_index: index,
            steps,
        })
    }

    /// Paths for every leaf, in slot order.
    pub fn auth_paths(&self) -> Vec<AuthPath> {
        (0..self.leaves().len())
            .filter_map(|i| self.auth_path(i).ok())
            .collect()
    }
}
