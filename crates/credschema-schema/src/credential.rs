//! # CredentialSchema
//!
//! The public entity. Owns the original document verbatim, its normalized
//! form, the options it was parsed with, and a lazily built
//! [`EncoderRegistry`].
//!
//! ## Lifecycle
//!
//! - [`CredentialSchema::new`] validates and normalizes a raw document.
//! - [`CredentialSchema::from_json`] restores a serialized schema without
//!   re-validating it. The stored version string is kept as is.
//!
//! Both paths build the registry from the flattened schema on first use,
//! at most once, so a restored schema encodes exactly like the original.
//!
//! ## Wire Form
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "jsonSchema": { "...": "original document" },
//!   "schema": { "...": "normalized schema" },
//!   "parsingOptions": { "useDefaults": false, "...": "..." }
//! }
//! ```

use std::collections::BTreeMap;

use credschema_core::{sha256_digest, CanonicalBytes, ContentDigest, FieldElement};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{ParsingOptions, SchemaConfig};
use crate::context::json_ld_context;
use crate::encoder::{EncodedCredential, Encoder, EncoderRegistry};
use crate::error::{EncodingError, SchemaError};
use crate::flatten::{flatten, flatten_values};
use crate::normalize::{normalize, CREDENTIAL_STATUS};
use crate::types::{FlattenedSchema, InternalSchema, SemanticType};

/// Version stamped on schemas built by this library.
pub const CREDENTIAL_SCHEMA_VERSION: &str = "0.1.0";

/// A compiled credential schema.
#[derive(Debug, Clone)]
pub struct CredentialSchema {
    version: String,
    schema: InternalSchema,
    json_schema: Value,
    parsing_options: ParsingOptions,
    config: SchemaConfig,
    encoders: OnceCell<EncoderRegistry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSchema {
    version: String,
    json_schema: Value,
    schema: InternalSchema,
    #[serde(default)]
    parsing_options: ParsingOptions,
}

impl CredentialSchema {
    /// Compile `json_schema` with default options and configuration.
    pub fn new(json_schema: Value) -> Result<Self, SchemaError> {
        Self::with_options(json_schema, ParsingOptions::default(), &SchemaConfig::default())
    }

    /// Compile `json_schema`.
    ///
    /// # Errors
    ///
    /// The first structural violation found by the depth-first walk.
    pub fn with_options(
        json_schema: Value,
        parsing_options: ParsingOptions,
        config: &SchemaConfig,
    ) -> Result<Self, SchemaError> {
        let schema = normalize(&json_schema, &parsing_options)?;
        debug!(
            version = CREDENTIAL_SCHEMA_VERSION,
            fields = schema.len(),
            "compiled credential schema"
        );
        Ok(Self {
            version: CREDENTIAL_SCHEMA_VERSION.to_string(),
            schema,
            json_schema,
            parsing_options,
            config: config.clone(),
            encoders: OnceCell::new(),
        })
    }

    /// Restore a schema from its wire form with the default configuration.
    pub fn from_json(doc: &Value) -> Result<Self, SchemaError> {
        Self::from_json_with_config(doc, &SchemaConfig::default())
    }

    /// Restore a schema from its wire form.
    ///
    /// # Errors
    ///
    /// `SchemaError::VersionMismatch` if `version` is missing or not a
    /// string; `SchemaError::Serde` if the rest of the payload is malformed.
    pub fn from_json_with_config(doc: &Value, config: &SchemaConfig) -> Result<Self, SchemaError> {
        match doc.get("version") {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(SchemaError::VersionMismatch {
                    reason: format!("version must be a string, got {other}"),
                });
            }
            None => {
                return Err(SchemaError::VersionMismatch {
                    reason: "missing version".to_string(),
                });
            }
        }
        let wire = WireSchema::deserialize(doc)?;
        if wire.version != CREDENTIAL_SCHEMA_VERSION {
            warn!(
                stored = %wire.version,
                current = CREDENTIAL_SCHEMA_VERSION,
                "restoring credential schema with a different version"
            );
        }
        debug!(version = %wire.version, "restored credential schema");
        Ok(Self {
            version: wire.version,
            schema: wire.schema,
            json_schema: wire.json_schema,
            parsing_options: wire.parsing_options,
            config: config.clone(),
            encoders: OnceCell::new(),
        })
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Value {
        json!({
            "version": self.version,
            "jsonSchema": self.json_schema,
            "schema": self.schema,
            "parsingOptions": self.parsing_options,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn schema(&self) -> &InternalSchema {
        &self.schema
    }

    /// The original document, `$ref`s and all.
    pub fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    pub fn parsing_options(&self) -> &ParsingOptions {
        &self.parsing_options
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// True if the schema declares a revocation block.
    pub fn has_status(&self) -> bool {
        self.schema.contains(CREDENTIAL_STATUS)
    }

    /// The canonical attribute ordering.
    pub fn flatten(&self) -> FlattenedSchema {
        flatten(&self.schema)
    }

    /// Encoders keyed by flattened path. Built on first call.
    pub fn encoders(&self) -> &EncoderRegistry {
        self.encoders
            .get_or_init(|| EncoderRegistry::build(&self.flatten(), &self.config.field))
    }

    pub fn encoder_for(&self, path: &str) -> Option<&Encoder> {
        self.encoders().get(path)
    }

    /// Semantic type of the attribute at `path`.
    pub fn type_of(&self, path: &str) -> Option<&SemanticType> {
        self.schema.leaf(path)
    }

    /// Encode a single attribute value.
    pub fn encode_attribute(&self, path: &str, value: &Value) -> Result<FieldElement, EncodingError> {
        self.encoders().encode(path, value)
    }

    /// Encode every attribute of `credential` in canonical order.
    ///
    /// # Errors
    ///
    /// `EncodingError::UnknownAttribute` for the first value the schema does
    /// not declare, then `EncodingError::MissingAttribute` for the first
    /// declared attribute without a value, then any per-value failure.
    pub fn encode_credential(&self, credential: &Value) -> Result<EncodedCredential, EncodingError> {
        let registry = self.encoders();
        let values: BTreeMap<String, &Value> = flatten_values(credential).into_iter().collect();

        if let Some(unknown) = values.keys().find(|path| registry.get(path).is_none()) {
            return Err(EncodingError::UnknownAttribute {
                path: unknown.clone(),
            });
        }

        let mut names = Vec::with_capacity(registry.len());
        let mut encoded = Vec::with_capacity(registry.len());
        for (path, encoder) in registry.iter() {
            let value = values
                .get(path)
                .ok_or_else(|| EncodingError::MissingAttribute {
                    path: path.to_string(),
                })?;
            encoded.push(encoder.encode(value)?);
            names.push(path.to_string());
        }
        Ok(EncodedCredential {
            names,
            values: encoded,
        })
    }

    /// Linked-data context with one term per path segment.
    pub fn json_ld_context(&self) -> Value {
        json_ld_context(&self.flatten(), &self.config.context_prefix)
    }

    /// SHA-256 over the canonical bytes of [`CredentialSchema::to_json`].
    pub fn fingerprint(&self) -> Result<ContentDigest, SchemaError> {
        let canonical = CanonicalBytes::new(&self.to_json())?;
        Ok(sha256_digest(&canonical))
    }
}

impl PartialEq for CredentialSchema {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.schema == other.schema
            && self.json_schema == other.json_schema
            && self.parsing_options == other.parsing_options
    }
}
