//! # credschema-schema: Credential Schema Compiler
//!
//! Turns a JSON-Schema document describing a credential into a
//! deterministic mapping from attribute path to semantic type and
//! field-element encoder. A prover and a verifier compiling byte-identical
//! documents derive byte-identical encodings without exchanging anything
//! else.
//!
//! ## Pipeline
//!
//! ```text
//! raw document
//!   -> definitions  ($ref / allOf expansion, built-in table)
//!   -> node         (typed parse: Object / Array / Leaf)
//!   -> infer        (leaf -> SemanticType)
//!   -> normalize    (envelope checks, InternalSchema)
//!   -> flatten      (sorted dotted paths)
//!   -> encoder      (path -> Encoder)
//! ```
//!
//! [`CredentialSchema`] ties the stages together and adds the versioned
//! wire form, the linked-data context, and credential encoding.
//!
//! ## Crate Policy
//!
//! - Pure and synchronous: no I/O, no global mutable state.
//! - Errors are returned, never panicked. Construction stops at the first
//!   structural violation.
//! - Logging goes through `tracing`; installing a subscriber is up to the
//!   caller.

pub mod config;
pub mod context;
pub mod credential;
pub mod definitions;
pub mod encoder;
pub mod error;
pub mod flatten;
pub mod generate;
pub mod infer;
pub mod node;
pub mod normalize;
pub mod types;

pub use config::{ConfigError, ParsingOptions, SchemaConfig, DEFAULT_CONTEXT_PREFIX};
pub use context::json_ld_context;
pub use credential::{CredentialSchema, CREDENTIAL_SCHEMA_VERSION};
pub use definitions::{BuiltinRole, Definitions, Resolver};
pub use encoder::{EncodedCredential, Encoder, EncoderRegistry};
pub use error::{EncodingError, SchemaError};
pub use flatten::{flatten, flatten_values};
pub use generate::generate_from_credential;
pub use infer::infer;
pub use node::{Primitive, ResolvedLeaf, SchemaNode};
pub use normalize::{normalize, normalize_with};
pub use types::{FlattenedSchema, InternalSchema, SchemaEntry, SemanticType};
