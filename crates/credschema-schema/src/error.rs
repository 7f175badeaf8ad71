//! # Error Types
//!
//! `SchemaError` covers everything that can go wrong while compiling or
//! restoring a schema; construction aborts on the first one. `EncodingError`
//! is raised per attribute value at encode time, since it depends on the
//! value rather than on the schema shape.
//!
//! Every variant names the dotted path it concerns (empty for the root).

use credschema_core::{CanonicalizationError, DecimalError};
use thiserror::Error;

/// Error while compiling, restoring, or fingerprinting a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `$ref` names a definition that exists neither locally nor built in.
    #[error("unknown reference '{reference}' at '{path}'")]
    UnknownReference {
        /// Dotted path of the referencing node.
        path: String,
        /// The reference string as written.
        reference: String,
    },

    /// A chain of `$ref`s loops back on itself.
    #[error("cyclic reference through '{reference}' at '{path}'")]
    CyclicReference {
        /// Dotted path of the referencing node.
        path: String,
        /// The definition name that closed the cycle.
        reference: String,
    },

    /// An `allOf` (or a `$ref` with siblings) does not have the
    /// one-reference-plus-one-refinement shape.
    #[error("invalid allOf at '{path}': {reason}")]
    InvalidCombinator {
        /// Dotted path of the combinator.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The node's `type` is absent or outside the supported vocabulary.
    #[error("unsupported type at '{path}': {reason}")]
    UnsupportedType {
        /// Dotted path of the node.
        path: String,
        /// What is unsupported.
        reason: String,
    },

    /// A property name cannot be used as a path segment.
    #[error("invalid property name '{name}' under '{path}'")]
    InvalidPropertyName {
        /// Dotted path of the parent object.
        path: String,
        /// The rejected name.
        name: String,
    },

    /// The document root is not `type: object`.
    #[error("schema root must have type 'object'")]
    RootNotObject,

    /// A mandatory top-level field is absent.
    #[error("mandatory field '{field}' is missing")]
    MissingMandatoryField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A mandatory top-level field has the wrong type.
    #[error("mandatory field '{field}' must be {expected}")]
    MandatoryFieldType {
        /// Name of the field.
        field: &'static str,
        /// Human-readable expectation.
        expected: &'static str,
    },

    /// `credentialStatus` deviates from the fixed revocation block.
    #[error("malformed credentialStatus: {reason}")]
    MalformedStatusBlock {
        /// What deviates.
        reason: String,
    },

    /// `minimum`/`multipleOf` are missing, conflicting, or unusable.
    #[error("inconsistent numeric constraint at '{path}': {reason}")]
    InconsistentNumericConstraint {
        /// Dotted path of the leaf.
        path: String,
        /// What is inconsistent.
        reason: String,
    },

    /// Items of an array normalize to different shapes.
    #[error("array at '{path}' has items of different shapes")]
    HeterogeneousArrayShape {
        /// Dotted path of the array.
        path: String,
    },

    /// The version stamp of a serialized schema is absent or malformed.
    #[error("version mismatch: {reason}")]
    VersionMismatch {
        /// What is wrong with the stamp.
        reason: String,
    },

    /// A numeric keyword could not be read as an exact decimal.
    #[error("invalid number at '{path}': {source}")]
    Decimal {
        /// Dotted path of the node.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: DecimalError,
    },

    /// The serialized payload does not match the expected layout.
    #[error("malformed serialized schema: {0}")]
    Serde(#[from] serde_json::Error),

    /// Canonical bytes for the fingerprint could not be produced.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error while encoding one attribute value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The value lies outside the range the semantic type can represent.
    #[error("value at '{path}' is out of bounds: {reason}")]
    OutOfBounds {
        /// Dotted attribute path.
        path: String,
        /// Which bound was violated.
        reason: String,
    },

    /// The value has more fractional digits than the type declares.
    #[error("value {value} at '{path}' has more than {places} decimal places")]
    NotIntegral {
        /// Dotted attribute path.
        path: String,
        /// The rejected value.
        value: String,
        /// Decimal places permitted.
        places: u32,
    },

    /// A string does not fit in one field element.
    #[error("string at '{path}' is {len} long; at most {max} fit")]
    StringTooLong {
        /// Dotted attribute path.
        path: String,
        /// Length of the rejected value (bytes, or characters when compressed).
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The JSON value has the wrong kind for the semantic type.
    #[error("value at '{path}' must be {expected}")]
    ValueType {
        /// Dotted attribute path.
        path: String,
        /// Human-readable expectation.
        expected: &'static str,
    },

    /// Compressed reversible strings accept ASCII only.
    #[error("value at '{path}' contains non-ASCII characters and cannot be compressed")]
    NonAsciiForCompression {
        /// Dotted attribute path.
        path: String,
    },

    /// The encoding is one-way.
    #[error("value at '{path}' is hashed and cannot be decoded")]
    Irreversible {
        /// Dotted attribute path.
        path: String,
    },

    /// The credential lacks an attribute the schema declares.
    #[error("credential is missing attribute '{path}'")]
    MissingAttribute {
        /// Dotted attribute path.
        path: String,
    },

    /// The credential carries an attribute the schema does not declare.
    #[error("attribute '{path}' is not in the schema")]
    UnknownAttribute {
        /// Dotted attribute path.
        path: String,
    },

    /// The value could not be read as an exact decimal.
    #[error("invalid number at '{path}': {source}")]
    Decimal {
        /// Dotted attribute path.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: DecimalError,
    },
}
