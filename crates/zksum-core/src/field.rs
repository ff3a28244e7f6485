//! # Field Conversions
//!
//! Signed integers map into the field two's-complement style: `-k` is the
//! additive inverse of `k`. Elements above `(p - 1) / 2` therefore read back
//! as negatives.
//!
//! Decimal rendering is the interchange encoding for every field element
//! that leaves the process (public signals, curve coordinates). It is
//! generic over [`PrimeField`] so base-field coordinates share the code.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use crate::F;

/// Map a signed integer into the scalar field.
pub fn field_from_i128(value: i128) -> F {
    let magnitude = F::from(value.unsigned_abs());
    if value < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Read a field element back as a signed integer.
///
/// Returns `None` when the element (or its negation, for the upper half)
/// does not fit in an `i128`.
pub fn field_to_i128(value: &F) -> Option<i128> {
    let negative = value.into_bigint() > F::MODULUS_MINUS_ONE_DIV_TWO;
    let magnitude = if negative { -*value } else { *value };
    let repr = magnitude.into_bigint();
    if repr.num_bits() > 127 {
        return None;
    }
    let limbs = repr.as_ref();
    let m = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let m = i128::try_from(m).ok()?;
    Some(if negative { -m } else { m })
}

/// Canonical base-10 rendering: no sign, no leading zeros, zero is `"0"`.
pub fn to_decimal<P: PrimeField>(value: &P) -> String {
    let n: BigUint = (*value).into();
    n.to_string()
}

/// Parse a canonical base-10 field element.
///
/// Rejects empty strings, signs, non-digits, leading zeros and integers at
/// or above the modulus. Accepting any of those would let two different
/// strings name the same element.
pub fn from_decimal<P: PrimeField>(s: &str) -> Option<P> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    let n: BigUint = s.parse().ok()?;
    let element = P::from(n.clone());
    let back: BigUint = element.into();
    (back == n).then_some(element)
}
