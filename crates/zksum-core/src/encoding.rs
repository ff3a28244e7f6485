//! # Fixed-Point Encoder
//!
//! Maps real inputs into the field with `round(value * scale)` and pads them
//! into a fixed-size [`Batch`].
//!
//! ## Safe Range
//!
//! A scaled value must satisfy `|round(value * scale)| <= 2^53`, the range in
//! which every integer is exactly representable as an `f64`. Beyond it the
//! product has already lost integer precision before rounding, so the value
//! is rejected rather than committed with a silently wrong integer. The sum
//! of a full batch is accumulated in `i128` and stays far below `(p - 1) / 2`,
//! so neither values nor the declared sum ever wrap in the field.

use serde::{Deserialize, Serialize};

use crate::config::{PipelineConfig, PrecisionPolicy};
use crate::error::{ConfigError, EncodingError};
use crate::field::{field_from_i128, field_to_i128};
use crate::F;

/// Largest accepted `|round(value * scale)|`.
pub const MAX_SCALED_MAGNITUDE: i64 = 1 << 53;

/// Tolerance, in scaled units, under which a product counts as integral.
/// Absorbs binary representation noise such as `4.234 * 1000 = 4234.000000000001`.
const PRECISION_TOLERANCE: f64 = 1e-6;

/// An input after fixed-point scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ScaledValue(i64);

impl ScaledValue {
    /// The neutral padding element.
    pub const ZERO: ScaledValue = ScaledValue(0);

    /// Wrap an already-scaled integer, enforcing the safe range.
    pub fn new(raw: i64) -> Result<Self, EncodingError> {
        if raw.unsigned_abs() > MAX_SCALED_MAGNITUDE as u64 {
            return Err(EncodingError::OutOfRange {
                value: raw as f64,
                scaled: raw as f64,
                max: MAX_SCALED_MAGNITUDE,
            });
        }
        Ok(Self(raw))
    }

    /// The scaled integer.
    pub fn get(self) -> i64 {
        self.0
    }

    /// The field representation (negatives as additive inverses).
    pub fn to_field(self) -> F {
        field_from_i128(self.0 as i128)
    }
}

impl TryFrom<i64> for ScaledValue {
    type Error = EncodingError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ScaledValue> for i64 {
    fn from(value: ScaledValue) -> Self {
        value.0
    }
}

/// Encodes reals at one fixed scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointEncoder {
    scale: u64,
    precision: PrecisionPolicy,
}

impl FixedPointEncoder {
    /// Create an encoder. `scale` must be positive.
    pub fn new(scale: u64, precision: PrecisionPolicy) -> Result<Self, ConfigError> {
        if scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        Ok(Self { scale, precision })
    }

    /// The encoder configured by a pipeline.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(config.scale, config.precision)
    }

    /// The scale factor.
    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// `round(value * scale)`, half away from zero.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::NonFinite`] for NaN or infinite input.
    /// - [`EncodingError::OutOfRange`] outside the safe range.
    /// - [`EncodingError::PrecisionLoss`] under [`PrecisionPolicy::Reject`]
    ///   when the product is not integral.
    pub fn encode(&self, value: f64) -> Result<ScaledValue, EncodingError> {
        if !value.is_finite() {
            return Err(EncodingError::NonFinite(value));
        }
        let scaled = value * self.scale as f64;
        let rounded = scaled.round();
        if rounded.abs() > MAX_SCALED_MAGNITUDE as f64 {
            return Err(EncodingError::OutOfRange {
                value,
                scaled,
                max: MAX_SCALED_MAGNITUDE,
            });
        }
        if (scaled - rounded).abs() > PRECISION_TOLERANCE {
            match self.precision {
                PrecisionPolicy::Reject => {
                    return Err(EncodingError::PrecisionLoss {
                        value,
                        scale: self.scale,
                    })
                }
                PrecisionPolicy::Round => {
                    tracing::warn!(value, scale = self.scale, rounded, "fixed-point encoding discarded precision");
                }
            }
        }
        Ok(ScaledValue(rounded as i64))
    }

    /// Inverse of [`encode`](Self::encode), exact up to `1 / (2 * scale)`.
    pub fn decode(&self, value: ScaledValue) -> f64 {
        value.0 as f64 / self.scale as f64
    }

    /// Decode a field element that carries a scaled value.
    pub fn decode_field(&self, value: &F) -> Result<f64, EncodingError> {
        let raw = field_to_i128(value)
            .ok_or_else(|| EncodingError::OutsideSignedWindow(crate::field::to_decimal(value)))?;
        Ok(raw as f64 / self.scale as f64)
    }

    /// Encode `values` into a batch of exactly `batch_size` slots.
    pub fn encode_batch(&self, values: &[f64], batch_size: usize) -> Result<Batch, EncodingError> {
        if values.len() > batch_size {
            return Err(EncodingError::BatchTooLong {
                len: values.len(),
                batch_size,
            });
        }
        let scaled = values
            .iter()
            .map(|v| self.encode(*v))
            .collect::<Result<Vec<_>, _>>()?;
        Batch::padded(scaled, batch_size)
    }
}

/// Exactly `N` scaled values; slot order determines leaf position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredBatch")]
pub struct Batch {
    values: Vec<ScaledValue>,
    input_len: usize,
}

/// Unvalidated serde form of [`Batch`].
#[derive(Deserialize)]
struct StoredBatch {
    values: Vec<ScaledValue>,
    input_len: usize,
}

impl TryFrom<StoredBatch> for Batch {
    type Error = EncodingError;

    fn try_from(stored: StoredBatch) -> Result<Self, Self::Error> {
        let StoredBatch { values, input_len } = stored;
        let len = values.len();
        let padded = values.get(input_len..).ok_or(EncodingError::MalformedBatch { input_len, len })?;
        if padded.iter().any(|v| *v != ScaledValue::ZERO) {
            return Err(EncodingError::MalformedBatch { input_len, len });
        }
        Ok(Self { values, input_len })
    }
}

impl Batch {
    /// Pad `values` with zeros up to `batch_size`. Longer inputs are an error.
    pub fn padded(mut values: Vec<ScaledValue>, batch_size: usize) -> Result<Self, EncodingError> {
        if values.len() > batch_size {
            return Err(EncodingError::BatchTooLong {
                len: values.len(),
                batch_size,
            });
        }
        let input_len = values.len();
        values.resize(batch_size, ScaledValue::ZERO);
        Ok(Self { values, input_len })
    }

    /// All `N` slots, padding included.
    pub fn values(&self) -> &[ScaledValue] {
        &self.values
    }

    /// Number of slots `N`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True only for a zero-slot batch.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How many slots were supplied before padding.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Integer sum over every slot, padding included.
    pub fn sum(&self) -> i128 {
        self.values.iter().map(|v| v.0 as i128).sum()
    }

    /// The public declared sum as a field element.
    pub fn expected_sum(&self) -> F {
        field_from_i128(self.sum())
    }

    /// Slot values as field elements, in slot order.
    pub fn field_elements(&self) -> Vec<F> {
        self.values.iter().map(|v| v.to_field()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> FixedPointEncoder {
        FixedPointEncoder::new(1000, PrecisionPolicy::Round).unwrap()
    }

    #[test]
    fn reference_inputs_scale_and_pad() {
        let batch = encoder().encode_batch(&[1.3, 2.3, 4.234], 128).unwrap();
        assert_eq!(batch.len(), 128);
        assert_eq!(batch.input_len(), 3);
        assert_eq!(batch.values()[..3], [ScaledValue(1300), ScaledValue(2300), ScaledValue(4234)]);
        assert!(batch.values()[3..].iter().all(|v| *v == ScaledValue::ZERO));
        assert_eq!(batch.sum(), 7834);
        assert_eq!(batch.expected_sum(), F::from(7834u64));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let enc = encoder();
        assert_eq!(enc.encode(0.0005).unwrap(), ScaledValue(1));
        assert_eq!(enc.encode(-0.0005).unwrap(), ScaledValue(-1));
        assert_eq!(enc.encode(1.2344).unwrap(), ScaledValue(1234));
    }

    #[test]
    fn reject_policy_refuses_extra_decimals() {
        let strict = FixedPointEncoder::new(1000, PrecisionPolicy::Reject).unwrap();
        assert_eq!(strict.encode(4.234).unwrap(), ScaledValue(4234));
        assert!(matches!(strict.encode(4.2345), Err(EncodingError::PrecisionLoss { .. })));
    }

    #[test]
    fn non_finite_and_huge_values_rejected() {
        let enc = encoder();
        assert!(matches!(enc.encode(f64::NAN), Err(EncodingError::NonFinite(_))));
        assert!(matches!(enc.encode(f64::INFINITY), Err(EncodingError::NonFinite(_))));
        assert!(matches!(enc.encode(1e16), Err(EncodingError::OutOfRange { .. })));
        assert!(ScaledValue::new(MAX_SCALED_MAGNITUDE).is_ok());
        assert!(ScaledValue::new(MAX_SCALED_MAGNITUDE + 1).is_err());
    }

    #[test]
    fn long_batch_is_rejected_not_truncated() {
        let err = encoder().encode_batch(&[1.0; 5], 4).unwrap_err();
        assert_eq!(err, EncodingError::BatchTooLong { len: 5, batch_size: 4 });
    }

    #[test]
    fn full_padding_batch_sums_to_zero() {
        let batch = encoder().encode_batch(&[], 8).unwrap();
        assert_eq!(batch.sum(), 0);
        assert_eq!(batch.input_len(), 0);
    }

    #[test]
    fn negative_values_decode_from_field() {
        let enc = encoder();
        let v = enc.encode(-2.5).unwrap();
        assert_eq!(enc.decode_field(&v.to_field()).unwrap(), -2.5);
    }

    #[test]
    fn stored_values_are_range_checked() {
        let v: ScaledValue = serde_json::from_str("-2500").unwrap();
        assert_eq!(v, ScaledValue(-2500));
        assert_eq!(serde_json::to_string(&v).unwrap(), "-2500");
        let too_big = (MAX_SCALED_MAGNITUDE + 1).to_string();
        assert!(serde_json::from_str::<ScaledValue>(&too_big).is_err());
    }

    #[test]
    fn stored_batch_must_end_in_padding() {
        let batch = encoder().encode_batch(&[1.3, 2.3], 4).unwrap();
        let json = serde_json::to_string(&batch).unwrap();
        assert_eq!(serde_json::from_str::<Batch>(&json).unwrap(), batch);

        let overlong = r#"{"values": [1300, 2300, 0, 0], "input_len": 5}"#;
        assert!(serde_json::from_str::<Batch>(overlong).is_err());
        let dirty = r#"{"values": [1300, 2300, 0, 7], "input_len": 2}"#;
        assert!(serde_json::from_str::<Batch>(dirty).is_err());
    }

    #[test]
    fn zero_scale_rejected() {
        assert!(matches!(
            FixedPointEncoder::new(0, PrecisionPolicy::Round),
            Err(ConfigError::ZeroScale)
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `decode(encode(x))` is within half a scale step of `x`.
        #[test]
        fn roundtrip_within_half_step(x in -1.0e9f64..1.0e9f64, scale in prop::sample::select(vec![1u64, 10, 100, 1000, 1_000_000])) {
            let enc = FixedPointEncoder::new(scale, PrecisionPolicy::Round).unwrap();
            let decoded = enc.decode(enc.encode(x).unwrap());
            let bound = 1.0 / (2.0 * scale as f64);
            // f64 multiplication adds relative error ~ x * 2^-52
            let slack = x.abs() * f64::EPSILON * 4.0;
            prop_assert!((decoded - x).abs() <= bound + slack, "x={x} decoded={decoded}");
        }

        /// Encoding is deterministic and sign-symmetric.
        #[test]
        fn encode_is_odd(x in -1.0e6f64..1.0e6f64) {
            let enc = FixedPointEncoder::new(1000, PrecisionPolicy::Round).unwrap();
            let pos = enc.encode(x).unwrap().get();
            let neg = enc.encode(-x).unwrap().get();
            prop_assert_eq!(pos, -neg);
            prop_assert_eq!(enc.encode(x).unwrap().get(), pos);
        }

        /// The field sum equals the integer sum for any padded batch.
        #[test]
        fn field_sum_matches_integer_sum(values in prop::collection::vec(-1.0e6f64..1.0e6f64, 0..16)) {
            let enc = FixedPointEncoder::new(1000, PrecisionPolicy::Round).unwrap();
            let batch = enc.encode_batch(&values, 16).unwrap();
            let field_sum: F = batch.field_elements().into_iter().sum();
            prop_assert_eq!(field_sum, batch.expected_sum());
        }
    }
}
