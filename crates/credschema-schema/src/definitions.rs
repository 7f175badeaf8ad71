//! # Reference Resolution
//!
//! Expands `$ref: "#/definitions/<name>"` and `allOf` combinators into a
//! single flat JSON object per node.
//!
//! Names are looked up in the document's own `definitions` first and then
//! in the built-in table. A local definition replaces a built-in of the
//! same name entirely, including the built-in's role (positive-only,
//! reversible): roles are attached to the built-in bodies, not to names.
//!
//! An `allOf` must contain exactly one `$ref` element and at most one other
//! object (the refinement), whose keys are merged over the expansion. A
//! `$ref` node with sibling keys is read as the same combinator with the
//! siblings as refinement.

use std::collections::BTreeMap;

use credschema_core::Decimal;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Prefix every supported `$ref` starts with.
pub const DEFINITIONS_REF_PREFIX: &str = "#/definitions/";

/// Keywords that constrain numbers.
const NUMERIC_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Semantics a built-in definition contributes beyond its JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinRole {
    /// `positiveInteger`: integers that can never be negative.
    PositiveInteger,
    /// `positiveNumber`: numbers that can never be negative.
    PositiveNumber,
    /// `encryptableString`: strings that must be recoverable from the field.
    EncryptableString,
    /// `encryptableCompString`: as above, compressed.
    EncryptableCompString,
}

impl BuiltinRole {
    pub fn is_positive_only(&self) -> bool {
        matches!(self, Self::PositiveInteger | Self::PositiveNumber)
    }
}

#[derive(Debug, Clone)]
struct BuiltinDefinition {
    body: Value,
    role: Option<BuiltinRole>,
}

/// An immutable table of named definitions.
#[derive(Debug, Clone)]
pub struct Definitions {
    entries: BTreeMap<&'static str, BuiltinDefinition>,
}

static BUILTIN: Lazy<Definitions> = Lazy::new(Definitions::builtin_table);

impl Definitions {
    /// The built-in table, constructed once per process.
    pub fn builtin() -> &'static Definitions {
        &BUILTIN
    }

    fn builtin_table() -> Self {
        let mut entries = BTreeMap::new();
        let mut add = |name: &'static str, body: Value, role: Option<BuiltinRole>| {
            entries.insert(name, BuiltinDefinition { body, role });
        };
        add(
            "positiveInteger",
            json!({"type": "integer", "minimum": 0}),
            Some(BuiltinRole::PositiveInteger),
        );
        add("integer", json!({"type": "integer"}), None);
        add(
            "positiveNumber",
            json!({"type": "number", "minimum": 0}),
            Some(BuiltinRole::PositiveNumber),
        );
        add("number", json!({"type": "number"}), None);
        add(
            "encryptableString",
            json!({"type": "string"}),
            Some(BuiltinRole::EncryptableString),
        );
        add(
            "encryptableCompString",
            json!({"type": "string"}),
            Some(BuiltinRole::EncryptableCompString),
        );
        Self { entries }
    }

    /// Names in the table, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The JSON body of a definition.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|d| &d.body)
    }

    pub fn role(&self, name: &str) -> Option<BuiltinRole> {
        self.entries.get(name).and_then(|d| d.role)
    }
}

/// A node after `$ref`/`allOf` expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    /// Merged keywords of the expansion and its refinements.
    pub keywords: Map<String, Value>,
    /// Definition names passed through, outermost first.
    pub chain: Vec<String>,
    /// Roles of built-in definitions passed through.
    pub roles: Vec<BuiltinRole>,
}

impl ResolvedNode {
    pub fn has_role(&self, role: BuiltinRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_positive_only(&self) -> bool {
        self.roles.iter().any(BuiltinRole::is_positive_only)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keywords.get(key)
    }
}

/// Resolves references for one schema document.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    local: Option<&'a Map<String, Value>>,
    builtin: &'a Definitions,
}

enum Lookup<'a> {
    Local(&'a Value),
    Builtin(&'a Value, Option<BuiltinRole>),
}

impl<'a> Resolver<'a> {
    pub fn new(local: Option<&'a Map<String, Value>>, builtin: &'a Definitions) -> Self {
        Self { local, builtin }
    }

    /// A resolver over `document["definitions"]` and `builtin`.
    pub fn for_document(document: &'a Value, builtin: &'a Definitions) -> Self {
        Self::new(
            document.get("definitions").and_then(Value::as_object),
            builtin,
        )
    }

    fn lookup(&self, name: &str) -> Option<Lookup<'a>> {
        if let Some(body) = self.local.and_then(|defs| defs.get(name)) {
            return Some(Lookup::Local(body));
        }
        self.builtin
            .entries
            .get(name)
            .map(|d| Lookup::Builtin(&d.body, d.role))
    }

    /// Expand `node`, found at dotted `path`.
    pub fn resolve(&self, node: &Value, path: &str) -> Result<ResolvedNode, SchemaError> {
        let mut visiting = Vec::new();
        self.resolve_inner(node, path, &mut visiting)
    }

    fn resolve_inner(
        &self,
        node: &Value,
        path: &str,
        visiting: &mut Vec<String>,
    ) -> Result<ResolvedNode, SchemaError> {
        let map = node.as_object().ok_or_else(|| SchemaError::UnsupportedType {
            path: path.to_string(),
            reason: format!("expected a schema object, got {node}"),
        })?;

        if let Some(all_of) = map.get("allOf") {
            let elements = all_of.as_array().ok_or_else(|| combinator(path, "allOf must be an array"))?;
            let (refs, refinements): (Vec<&Value>, Vec<&Value>) =
                elements.iter().partition(|e| e.get("$ref").is_some());
            if refs.len() != 1 {
                return Err(combinator(
                    path,
                    &format!("expected exactly one $ref element, found {}", refs.len()),
                ));
            }
            if refinements.len() > 1 {
                return Err(combinator(
                    path,
                    &format!("expected at most one refinement, found {}", refinements.len()),
                ));
            }
            let mut resolved = self.resolve_inner(refs[0], path, visiting)?;
            if let Some(refinement) = refinements.first() {
                let refinement = refinement
                    .as_object()
                    .ok_or_else(|| combinator(path, "refinement must be an object"))?;
                merge_refinement(&mut resolved, refinement.iter(), path)?;
            }
            merge_refinement(
                &mut resolved,
                map.iter().filter(|(k, _)| k.as_str() != "allOf"),
                path,
            )?;
            return Ok(resolved);
        }

        if let Some(reference) = map.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| SchemaError::UnknownReference {
                path: path.to_string(),
                reference: reference.to_string(),
            })?;
            let mut resolved = self.resolve_reference(reference, path, visiting)?;
            merge_refinement(
                &mut resolved,
                map.iter().filter(|(k, _)| k.as_str() != "$ref"),
                path,
            )?;
            return Ok(resolved);
        }

        Ok(ResolvedNode {
            keywords: map.clone(),
            chain: Vec::new(),
            roles: Vec::new(),
        })
    }

    fn resolve_reference(
        &self,
        reference: &str,
        path: &str,
        visiting: &mut Vec<String>,
    ) -> Result<ResolvedNode, SchemaError> {
        let unknown = || SchemaError::UnknownReference {
            path: path.to_string(),
            reference: reference.to_string(),
        };
        let name = reference
            .strip_prefix(DEFINITIONS_REF_PREFIX)
            .filter(|n| !n.is_empty())
            .ok_or_else(unknown)?;
        if visiting.iter().any(|v| v == name) {
            return Err(SchemaError::CyclicReference {
                path: path.to_string(),
                reference: name.to_string(),
            });
        }
        let (body, role) = match self.lookup(name).ok_or_else(unknown)? {
            Lookup::Local(body) => (body, None),
            Lookup::Builtin(body, role) => (body, role),
        };

        visiting.push(name.to_string());
        let mut resolved = self.resolve_inner(body, path, visiting)?;
        visiting.pop();

        resolved.chain.insert(0, name.to_string());
        if let Some(role) = role {
            resolved.roles.insert(0, role);
        }
        Ok(resolved)
    }
}

fn combinator(path: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidCombinator {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn merge_refinement<'v>(
    resolved: &mut ResolvedNode,
    refinement: impl Iterator<Item = (&'v String, &'v Value)>,
    path: &str,
) -> Result<(), SchemaError> {
    for (key, value) in refinement {
        match key.as_str() {
            "$ref" | "allOf" => {
                return Err(combinator(path, &format!("nested '{key}' inside a refinement")));
            }
            "type" => {
                if let Some(existing) = resolved.keywords.get("type") {
                    if existing != value {
                        return Err(combinator(
                            path,
                            &format!("refinement changes type from {existing} to {value}"),
                        ));
                    }
                }
            }
            k if NUMERIC_KEYWORDS.contains(&k) => {
                let base_type = resolved.keywords.get("type").and_then(Value::as_str);
                if !matches!(base_type, Some("integer" | "number")) {
                    return Err(SchemaError::InconsistentNumericConstraint {
                        path: path.to_string(),
                        reason: format!(
                            "'{k}' refines a definition of type {}",
                            base_type.unwrap_or("(none)")
                        ),
                    });
                }
                if k == "multipleOf" {
                    if let Some(existing) = resolved.keywords.get("multipleOf") {
                        let before = decimal_places_of(existing, path)?;
                        let after = decimal_places_of(value, path)?;
                        if before != after {
                            return Err(SchemaError::InconsistentNumericConstraint {
                                path: path.to_string(),
                                reason: format!(
                                    "multipleOf refinement changes decimal places from {before} to {after}"
                                ),
                            });
                        }
                    }
                }
            }
            _ => {}
        }
        resolved.keywords.insert(key.clone(), value.clone());
    }
    Ok(())
}

fn decimal_places_of(value: &Value, path: &str) -> Result<u32, SchemaError> {
    let number = value
        .as_number()
        .ok_or_else(|| SchemaError::InconsistentNumericConstraint {
            path: path.to_string(),
            reason: format!("multipleOf must be a number, got {value}"),
        })?;
    Decimal::from_json_number(number)
        .map(|d| d.scale())
        .map_err(|source| SchemaError::Decimal {
            path: path.to_string(),
            source,
        })
}
