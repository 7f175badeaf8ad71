//! # Typed Schema Tree
//!
//! A recursive-descent pass that turns a raw JSON-Schema document into a
//! closed [`SchemaNode`] tree. Every node is resolved through the
//! [`Resolver`] first, so the tree never contains `$ref` or `allOf`.
//!
//! Only three shapes exist:
//!
//! - `Object` with a non-empty `properties` map,
//! - `Array` of fixed length (tuple `items`, or a single `items` with
//!   `minItems == maxItems`),
//! - `Leaf` of primitive type `string`, `integer` or `number`.
//!
//! Anything else is rejected where it is found.

use std::collections::BTreeMap;

use credschema_core::Decimal;
use serde_json::Value;

use crate::definitions::{BuiltinRole, ResolvedNode, Resolver};
use crate::error::SchemaError;
use crate::types::{child_path, PATH_SEPARATOR};

/// JSON-Schema primitive types a leaf may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Integer,
    Number,
}

impl Primitive {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

/// A leaf after reference resolution: its primitive type, the numeric
/// keywords that matter for encoding, and the built-in roles it inherited.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLeaf {
    pub path: String,
    pub primitive: Primitive,
    pub minimum: Option<Decimal>,
    pub multiple_of: Option<Decimal>,
    pub roles: Vec<BuiltinRole>,
}

impl ResolvedLeaf {
    pub fn has_role(&self, role: BuiltinRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_positive_only(&self) -> bool {
        self.roles.iter().any(BuiltinRole::is_positive_only)
    }
}

/// A node of the typed schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object { properties: BTreeMap<String, SchemaNode> },
    Array { items: Vec<SchemaNode> },
    Leaf(ResolvedLeaf),
}

impl SchemaNode {
    /// Parse `value`, found at dotted `path`.
    pub fn parse(value: &Value, path: &str, resolver: &Resolver<'_>) -> Result<Self, SchemaError> {
        let resolved = resolver.resolve(value, path)?;
        let ty = match resolved.get("type") {
            Some(Value::String(ty)) => ty.as_str(),
            Some(other) => {
                return Err(unsupported(path, format!("'type' must be a string, got {other}")));
            }
            None => return Err(unsupported(path, "missing 'type'".to_string())),
        };
        match ty {
            "object" => parse_object(&resolved, path, resolver),
            "array" => parse_array(&resolved, path, resolver),
            "string" => parse_leaf(resolved, path, Primitive::String),
            "integer" => parse_leaf(resolved, path, Primitive::Integer),
            "number" => parse_leaf(resolved, path, Primitive::Number),
            other => Err(unsupported(path, format!("type '{other}'"))),
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, SchemaNode>> {
        match self {
            Self::Object { properties } => Some(properties),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }
}

fn unsupported(path: &str, reason: String) -> SchemaError {
    SchemaError::UnsupportedType {
        path: path.to_string(),
        reason,
    }
}

fn parse_object(
    resolved: &ResolvedNode,
    path: &str,
    resolver: &Resolver<'_>,
) -> Result<SchemaNode, SchemaError> {
    let properties = match resolved.get("properties") {
        Some(Value::Object(map)) if !map.is_empty() => map,
        Some(Value::Object(_)) | None => {
            return Err(unsupported(path, "object without properties".to_string()));
        }
        Some(other) => {
            return Err(unsupported(path, format!("'properties' must be an object, got {other}")));
        }
    };

    let mut parsed = BTreeMap::new();
    for (name, child) in properties {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(SchemaError::InvalidPropertyName {
                path: path.to_string(),
                name: name.clone(),
            });
        }
        let node = SchemaNode::parse(child, &child_path(path, name), resolver)?;
        parsed.insert(name.clone(), node);
    }
    Ok(SchemaNode::Object { properties: parsed })
}

fn parse_array(
    resolved: &ResolvedNode,
    path: &str,
    resolver: &Resolver<'_>,
) -> Result<SchemaNode, SchemaError> {
    let items = match resolved.get("items") {
        Some(Value::Array(tuple)) if !tuple.is_empty() => tuple
            .iter()
            .enumerate()
            .map(|(i, item)| SchemaNode::parse(item, &child_path(path, &i.to_string()), resolver))
            .collect::<Result<Vec<_>, _>>()?,
        Some(item @ Value::Object(_)) => {
            let min = resolved.get("minItems").and_then(Value::as_u64);
            let max = resolved.get("maxItems").and_then(Value::as_u64);
            let len = match (min, max) {
                (Some(min), Some(max)) if min == max && min > 0 => min,
                _ => {
                    return Err(unsupported(
                        path,
                        "array length must be fixed by equal minItems and maxItems".to_string(),
                    ));
                }
            };
            (0..len)
                .map(|i| SchemaNode::parse(item, &child_path(path, &i.to_string()), resolver))
                .collect::<Result<Vec<_>, _>>()?
        }
        _ => return Err(unsupported(path, "array without items".to_string())),
    };
    Ok(SchemaNode::Array { items })
}

fn parse_leaf(
    resolved: ResolvedNode,
    path: &str,
    primitive: Primitive,
) -> Result<SchemaNode, SchemaError> {
    let (minimum, multiple_of) = if primitive.is_numeric() {
        let minimum = numeric_keyword(&resolved, "minimum", path)?;
        let multiple_of = numeric_keyword(&resolved, "multipleOf", path)?;
        if let Some(step) = &multiple_of {
            if !step.is_positive() {
                return Err(SchemaError::InconsistentNumericConstraint {
                    path: path.to_string(),
                    reason: format!("multipleOf must be positive, got {step}"),
                });
            }
        }
        (minimum, multiple_of)
    } else {
        (None, None)
    };
    Ok(SchemaNode::Leaf(ResolvedLeaf {
        path: path.to_string(),
        primitive,
        minimum,
        multiple_of,
        roles: resolved.roles,
    }))
}

fn numeric_keyword(
    resolved: &ResolvedNode,
    key: &str,
    path: &str,
) -> Result<Option<Decimal>, SchemaError> {
    match resolved.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => Decimal::from_json_number(n)
            .map(Some)
            .map_err(|source| SchemaError::Decimal {
                path: path.to_string(),
                source,
            }),
        Some(other) => Err(unsupported(path, format!("'{key}' must be a number, got {other}"))),
    }
}
