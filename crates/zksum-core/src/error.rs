//! # Error Types — Configuration and Encoding
//!
//! The two error classes that are raised before any cryptographic work:
//!
//! - [`ConfigError`]: the requested circuit shape is invalid. Fatal for the
//!   whole pipeline; nothing is compiled.
//! - [`EncodingError`]: a single input value cannot be represented. The value
//!   is rejected, never clamped.

use thiserror::Error;

/// The pipeline configuration describes an impossible circuit shape.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A batch must hold at least one value.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// The fixed-point scale must be positive.
    #[error("scale factor must be at least 1")]
    ZeroScale,

    /// Tree mode pairs siblings level by level, so `N` must be `2^depth`.
    #[error("tree mode requires a power-of-two batch size, got {batch_size}")]
    NotPowerOfTwo {
        /// The rejected batch size.
        batch_size: usize,
    },

    /// An environment override carried an unknown value.
    #[error("unrecognized value {value:?} for {var}")]
    UnknownOverride {
        /// Environment variable name.
        var: &'static str,
        /// The value that could not be parsed.
        value: String,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A real-valued input cannot be mapped into the field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// NaN and infinities have no fixed-point representation.
    #[error("value {0} is not finite")]
    NonFinite(f64),

    /// `|value * scale|` exceeds the exactly representable range.
    #[error("value {value} scales to {scaled:e}, outside the safe range of ±{max}")]
    OutOfRange {
        /// The original input.
        value: f64,
        /// `value * scale` before rounding.
        scaled: f64,
        /// The largest accepted magnitude.
        max: i64,
    },

    /// Under `PrecisionPolicy::Reject`, the value has more decimals than the
    /// scale can hold.
    #[error("value {value} is not representable at scale {scale} without rounding")]
    PrecisionLoss {
        /// The original input.
        value: f64,
        /// The configured scale.
        scale: u64,
    },

    /// More inputs than circuit slots.
    #[error("batch of {len} values exceeds the circuit batch size {batch_size}")]
    BatchTooLong {
        /// Number of supplied values.
        len: usize,
        /// Fixed circuit batch size.
        batch_size: usize,
    },

    /// A stored batch whose slots are not its inputs followed by zero padding.
    #[error("batch of {len} slots cannot hold {input_len} inputs followed by zero padding")]
    MalformedBatch {
        /// Recorded number of inputs.
        input_len: usize,
        /// Number of slots.
        len: usize,
    },

    /// A field element does not lie in the signed window around zero and so
    /// has no integer interpretation.
    #[error("field element {0} lies outside the signed integer window")]
    OutsideSignedWindow(String),
}
