//! Round-constant derivation.
//!
//! Constants are read from a SHA-256 counter stream,
//! `SHA256(domain || be64(i))`, reduced into the field. Native permutations
//! and their gadgets share one table, so the two can only disagree if the
//! table itself is built twice with different domains.

use ark_ff::PrimeField;
use sha2::{Digest, Sha256};

use zksum_core::F;

/// Derive `count` field constants for `domain`.
pub(crate) fn derive(domain: &[u8], count: usize) -> Vec<F> {
    (0..count as u64)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(domain);
            hasher.update(i.to_be_bytes());
            F::from_be_bytes_mod_order(&hasher.finalize())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_deterministic_and_domain_separated() {
        let a = derive(b"zksum.test.a", 4);
        assert_eq!(a, derive(b"zksum.test.a", 4));
        assert_ne!(a, derive(b"zksum.test.b", 4));
        assert_eq!(derive(b"zksum.test.a", 2), a[..2]);
    }

    #[test]
    fn stream_has_no_repeats() {
        let c = derive(b"zksum.test.a", 64);
        for (i, x) in c.iter().enumerate() {
            assert!(!c[i + 1..].contains(x));
        }
    }
}
