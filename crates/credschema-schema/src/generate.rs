//! # Schema Generation
//!
//! Derives a raw JSON schema from a sample credential, for callers that
//! have data but no schema. The result is an ordinary document: it goes
//! through [`CredentialSchema::new`](crate::CredentialSchema::new) like any
//! hand-written one.
//!
//! | sample value | generated node |
//! |---|---|
//! | string | `{"type": "string"}` |
//! | integer | `{"type": "integer", "minimum": m}` |
//! | float | `{"type": "number", "minimum": m, "multipleOf": 10^-dp}` |
//! | array | tuple `items` |
//! | object | `properties` |
//!
//! `m` is [`ParsingOptions::default_minimum_integer`], lowered to the
//! sample value when the sample is smaller. `dp` is the number of
//! fractional digits in the sample.

use credschema_core::Decimal;
use serde_json::{json, Map, Number, Value};

use crate::config::ParsingOptions;
use crate::error::SchemaError;
use crate::types::child_path;

/// JSON-Schema dialect stamped on generated documents.
pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Generate a raw schema describing `credential`.
///
/// # Errors
///
/// `SchemaError::UnsupportedType` for booleans, nulls, and empty arrays
/// or objects anywhere in the sample; `SchemaError::RootNotObject` if
/// `credential` is not an object.
pub fn generate_from_credential(
    credential: &Value,
    options: &ParsingOptions,
) -> Result<Value, SchemaError> {
    let root = credential.as_object().ok_or(SchemaError::RootNotObject)?;
    let mut node = object_node(root, "", options)?;
    if let Value::Object(map) = &mut node {
        map.insert("$schema".to_string(), json!(JSON_SCHEMA_DRAFT));
    }
    Ok(node)
}

fn object_node(
    map: &Map<String, Value>,
    path: &str,
    options: &ParsingOptions,
) -> Result<Value, SchemaError> {
    if map.is_empty() {
        return Err(unsupported(path, "empty object"));
    }
    let mut properties = Map::new();
    for (name, value) in map {
        properties.insert(name.clone(), node_for(value, &child_path(path, name), options)?);
    }
    Ok(json!({"type": "object", "properties": properties}))
}

fn node_for(value: &Value, path: &str, options: &ParsingOptions) -> Result<Value, SchemaError> {
    match value {
        Value::String(_) => Ok(json!({"type": "string"})),
        Value::Number(n) => number_node(n, path, options),
        Value::Array(items) if !items.is_empty() => {
            let items = items
                .iter()
                .enumerate()
                .map(|(i, item)| node_for(item, &child_path(path, &i.to_string()), options))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json!({"type": "array", "items": items}))
        }
        Value::Array(_) => Err(unsupported(path, "empty array")),
        Value::Object(map) => object_node(map, path, options),
        Value::Bool(_) => Err(unsupported(path, "boolean")),
        Value::Null => Err(unsupported(path, "null")),
    }
}

fn number_node(n: &Number, path: &str, options: &ParsingOptions) -> Result<Value, SchemaError> {
    let decimal_err = |source| SchemaError::Decimal {
        path: path.to_string(),
        source,
    };
    let value = Decimal::from_json_number(n).map_err(decimal_err)?;
    let default = Decimal::from_i128(options.default_minimum_integer.into());
    let minimum = if value.checked_sub(&default).map_err(decimal_err)?.is_negative() {
        value
    } else {
        default
    };
    let minimum = to_number(&minimum, path)?;

    if n.is_f64() {
        let step = Decimal::new(1, value.scale()).map_err(decimal_err)?;
        Ok(json!({
            "type": "number",
            "minimum": minimum,
            "multipleOf": to_number(&step, path)?
        }))
    } else {
        Ok(json!({"type": "integer", "minimum": minimum}))
    }
}

fn to_number(value: &Decimal, path: &str) -> Result<Number, SchemaError> {
    value
        .to_json_number()
        .ok_or_else(|| unsupported(path, "number outside the JSON range"))
}

fn unsupported(path: &str, what: &str) -> SchemaError {
    SchemaError::UnsupportedType {
        path: path.to_string(),
        reason: format!("cannot generate a schema for {what}"),
    }
}
