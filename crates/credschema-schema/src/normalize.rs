//! # Schema Normalizer
//!
//! Validates the credential envelope and lowers the typed tree to an
//! [`InternalSchema`]. The walk is depth-first and stops at the first
//! violation; no partial schema is ever returned.
//!
//! ## Envelope
//!
//! | field | requirement |
//! |---|---|
//! | `credentialVersion` | mandatory, `string` |
//! | `credentialSchema` | mandatory, `string` |
//! | `credentialSubject` | mandatory, object or fixed array of objects |
//! | `credentialStatus` | optional, exactly the revocation block |
//!
//! Other top-level fields are free-form.

use serde_json::Value;
use tracing::debug;

use crate::config::ParsingOptions;
use crate::definitions::{Definitions, Resolver};
use crate::error::SchemaError;
use crate::infer::infer;
use crate::node::SchemaNode;
use crate::types::{child_path, InternalSchema, SchemaEntry, SemanticType};

pub const CREDENTIAL_VERSION: &str = "credentialVersion";
pub const CREDENTIAL_SCHEMA: &str = "credentialSchema";
pub const CREDENTIAL_SUBJECT: &str = "credentialSubject";
pub const CREDENTIAL_STATUS: &str = "credentialStatus";

/// Fields of the revocation block, in canonical order.
pub const STATUS_FIELDS: [&str; 3] = ["registryId", "revocationCheck", "revocationId"];

const MANDATORY_FIELDS: [&str; 3] = [CREDENTIAL_VERSION, CREDENTIAL_SCHEMA, CREDENTIAL_SUBJECT];

/// Normalize `document` using the built-in definitions table.
pub fn normalize(document: &Value, options: &ParsingOptions) -> Result<InternalSchema, SchemaError> {
    normalize_with(document, options, Definitions::builtin())
}

/// Normalize `document` against an explicit built-in table.
pub fn normalize_with(
    document: &Value,
    options: &ParsingOptions,
    builtin: &Definitions,
) -> Result<InternalSchema, SchemaError> {
    if document.get("type").and_then(Value::as_str) != Some("object") {
        return Err(SchemaError::RootNotObject);
    }

    let declared = document.get("properties").and_then(Value::as_object);
    for field in MANDATORY_FIELDS {
        if !declared.is_some_and(|props| props.contains_key(field)) {
            return Err(SchemaError::MissingMandatoryField { field });
        }
    }

    let resolver = Resolver::for_document(document, builtin);
    let root = SchemaNode::parse(document, "", &resolver)?;
    let properties = root.as_object().ok_or(SchemaError::RootNotObject)?;

    if let Some(subject) = properties.get(CREDENTIAL_SUBJECT) {
        check_subject_shape(subject)?;
    }
    if let Some(status) = properties.get(CREDENTIAL_STATUS) {
        check_status_shape(status)?;
    }

    let mut schema = InternalSchema::new();
    for (name, node) in properties {
        let entry = lower(node, name, options)?;
        schema.insert(name.clone(), entry);
    }

    for field in [CREDENTIAL_VERSION, CREDENTIAL_SCHEMA] {
        if schema.get(field).and_then(SchemaEntry::as_leaf) != Some(&SemanticType::String) {
            return Err(SchemaError::MandatoryFieldType {
                field,
                expected: "a plain string",
            });
        }
    }
    if let Some(status) = schema.get(CREDENTIAL_STATUS).and_then(SchemaEntry::as_nested) {
        for field in STATUS_FIELDS {
            if status.get(field).and_then(SchemaEntry::as_leaf) != Some(&SemanticType::String) {
                return Err(SchemaError::MalformedStatusBlock {
                    reason: format!("'{field}' must be a plain string"),
                });
            }
        }
    }

    debug!(top_level_fields = schema.len(), "normalized credential schema");
    Ok(schema)
}

fn check_subject_shape(subject: &SchemaNode) -> Result<(), SchemaError> {
    let ok = match subject {
        SchemaNode::Object { .. } => true,
        SchemaNode::Array { items } => items.iter().all(SchemaNode::is_object),
        SchemaNode::Leaf(_) => false,
    };
    if ok {
        Ok(())
    } else {
        Err(SchemaError::MandatoryFieldType {
            field: CREDENTIAL_SUBJECT,
            expected: "an object or a fixed-length array of objects",
        })
    }
}

fn check_status_shape(status: &SchemaNode) -> Result<(), SchemaError> {
    let properties = status.as_object().ok_or_else(|| SchemaError::MalformedStatusBlock {
        reason: "must be an object".to_string(),
    })?;
    let mut names: Vec<&str> = properties.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names != STATUS_FIELDS {
        return Err(SchemaError::MalformedStatusBlock {
            reason: format!(
                "expected exactly {:?}, found {:?}",
                STATUS_FIELDS, names
            ),
        });
    }
    Ok(())
}

fn lower(node: &SchemaNode, path: &str, options: &ParsingOptions) -> Result<SchemaEntry, SchemaError> {
    match node {
        SchemaNode::Leaf(leaf) => infer(leaf, options).map(SchemaEntry::Leaf),
        SchemaNode::Object { properties } => {
            let mut nested = InternalSchema::new();
            for (name, child) in properties {
                nested.insert(name.clone(), lower(child, &child_path(path, name), options)?);
            }
            Ok(SchemaEntry::Nested(nested))
        }
        SchemaNode::Array { items } => {
            let mut nested = InternalSchema::new();
            let mut first: Option<SchemaEntry> = None;
            for (i, item) in items.iter().enumerate() {
                let entry = lower(item, &child_path(path, &i.to_string()), options)?;
                match &first {
                    Some(shape) if *shape != entry => {
                        return Err(SchemaError::HeterogeneousArrayShape {
                            path: path.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => first = Some(entry.clone()),
                }
                nested.insert(i.to_string(), entry);
            }
            Ok(SchemaEntry::Nested(nested))
        }
    }
}
