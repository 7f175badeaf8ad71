//! # Error Types
//!
//! Leaf error types shared by the compiler crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error while parsing or computing with exact decimals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// The input is not a decimal literal.
    #[error("invalid decimal literal '{0}'")]
    Invalid(String),

    /// The value does not fit the 128-bit mantissa or exceeds the scale limit.
    #[error("decimal '{0}' is out of the representable range")]
    Overflow(String),

    /// Scaling by `10^places` left a fractional remainder.
    #[error("decimal {value} has more than {places} fractional digits")]
    NotIntegral {
        /// Rendering of the offending value.
        value: String,
        /// Number of fractional digits permitted.
        places: u32,
    },
}

/// Error while building a field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The integer does not fit below `2^(modulus_bits - 1)`.
    #[error("value needs {needed} bits but the field holds {capacity}")]
    Overflow {
        /// Bits required by the value.
        needed: u32,
        /// Bits available in the field.
        capacity: u32,
    },

    /// The byte string is longer than the field can hold.
    #[error("{len} bytes do not fit in a field element of {max} bytes")]
    TooManyBytes {
        /// Length of the rejected input.
        len: usize,
        /// Maximum number of bytes accepted.
        max: usize,
    },

    /// The configured modulus size is unusable.
    #[error("modulus of {0} bits is outside the supported range 9..=256")]
    UnsupportedModulus(u32),
}

/// Error while parsing a rendered [`ContentDigest`](crate::ContentDigest).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    /// The string does not start with `sha256:`.
    #[error("digest '{0}' does not start with 'sha256:'")]
    MissingPrefix(String),

    /// The part after the prefix is not 64 hex digits.
    #[error("expected 64 hex digits, got '{0}'")]
    InvalidHex(String),
}
