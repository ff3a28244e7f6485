//! # zksum-core — Foundational Types for zksum
//!
//! This crate is the leaf of the zksum workspace. It defines the data model
//! that every later stage of the pipeline agrees on: the circuit field, the
//! fixed-point encoding of real-valued inputs, the fixed-size [`Batch`], and
//! the [`PipelineConfig`] that fixes a circuit shape.
//!
//! ## Key Design Principles
//!
//! 1. **One field.** Every value, digest and public input is an element of
//!    the BN254 scalar field, exposed as [`F`]. No other crate picks its own.
//!
//! 2. **One scale.** [`FixedPointEncoder`] owns the scale factor. Encode and
//!    decode go through the same instance, so the public commitment and any
//!    external decoder can never disagree about the scale.
//!
//! 3. **Shape is validated before cryptography.** [`PipelineConfig::validate`]
//!    is the only way to obtain [`CircuitParams`]; it rejects every
//!    configuration error (zero batch, non-power-of-two tree) up front.
//!
//! 4. **Hard batch boundary.** Short batches are padded with zero; long
//!    batches are rejected, never truncated.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zksum-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![forbid(unsafe_code)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod field;

pub use config::{
    CircuitParams, CommitmentMode, HashKind, PipelineConfig, PrecisionPolicy, DEFAULT_BATCH_SIZE,
    DEFAULT_SCALE,
};
pub use encoding::{Batch, FixedPointEncoder, ScaledValue, MAX_SCALED_MAGNITUDE};
pub use error::{ConfigError, EncodingError};
pub use field::{field_from_i128, field_to_i128, from_decimal, to_decimal};

/// Scalar field of every circuit in the workspace (BN254 `Fr`).
pub type F = ark_bn254::Fr;
