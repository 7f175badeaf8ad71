//! # Flattener
//!
//! The canonical attribute ordering. Leaves are collected depth-first and
//! then sorted by their full dotted path, byte-wise. The sort, not the
//! traversal, defines the order: it is the only thing signer, prover and
//! verifier agree on without exchanging metadata.

use serde_json::Value;
use tracing::debug;

use crate::types::{child_path, FlattenedSchema, InternalSchema, SchemaEntry, SemanticType};

/// Flatten `schema` into sorted `(path, type)` sequences.
pub fn flatten(schema: &InternalSchema) -> FlattenedSchema {
    let mut leaves = Vec::new();
    collect(schema, "", &mut leaves);
    leaves.sort_by(|(a, _), (b, _)| a.cmp(b));

    let (names, types) = leaves.into_iter().unzip();
    let flattened = FlattenedSchema { names, types };
    debug!(attributes = flattened.len(), "flattened schema");
    flattened
}

fn collect(schema: &InternalSchema, prefix: &str, out: &mut Vec<(String, SemanticType)>) {
    for (name, entry) in schema.iter() {
        let path = child_path(prefix, name);
        match entry {
            SchemaEntry::Leaf(ty) => out.push((path, ty.clone())),
            SchemaEntry::Nested(nested) => collect(nested, &path, out),
        }
    }
}

/// Flatten a concrete credential into sorted `(path, value)` pairs.
///
/// Objects and arrays are descended into; every other value is a leaf.
/// Empty objects and arrays contribute nothing.
pub fn flatten_values(credential: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    collect_values(credential, "", &mut out);
    out.sort_by(|(a, _), (b, _)| a.cmp(b));
    out
}

fn collect_values<'v>(value: &'v Value, prefix: &str, out: &mut Vec<(String, &'v Value)>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                collect_values(child, &child_path(prefix, name), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_values(child, &child_path(prefix, &i.to_string()), out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf)),
    }
}
