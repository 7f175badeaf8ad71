//! # credschema-core: Foundational Types for the Credential Schema Compiler
//!
//! Every other crate in the workspace depends on `credschema-core`; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`, which produces RFC 8785 (JCS) bytes. Two
//!    parties holding the same schema document always hash the same bytes.
//!
//! 2. **`Decimal`, never `f64`.** Schema constraints (`minimum`,
//!    `multipleOf`) and attribute values are read from their shortest
//!    decimal rendering and kept as an exact `(mantissa, scale)` pair. No
//!    encoding decision ever depends on a floating-point mantissa.
//!
//! 3. **`FieldElement` is bounded by configuration.** The modulus of the
//!    proof system's scalar field is supplied through `FieldConfig`; this
//!    crate only guarantees that every element it builds fits below
//!    `2^(modulus_bits - 1)`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credschema-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod decimal;
pub mod digest;
pub mod error;
pub mod field;

pub use canonical::CanonicalBytes;
pub use decimal::Decimal;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, DecimalError, DigestParseError, FieldError};
pub use field::{FieldConfig, FieldElement, DEFAULT_MODULUS_BITS, FIELD_ELEMENT_BYTES};
