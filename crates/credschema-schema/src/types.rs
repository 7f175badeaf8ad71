//! # Schema Types
//!
//! The normalized, typed view of a credential schema. `InternalSchema` is
//! what every downstream operation (flattening, encoding, context
//! projection, serialization) reads; it never holds `$ref`s or combinators.

use std::collections::BTreeMap;

use credschema_core::Decimal;
use serde::{Deserialize, Serialize};

/// Separator between segments of a flattened attribute path.
pub const PATH_SEPARATOR: char = '.';

/// The closed set of value types an attribute can have.
///
/// Numeric variants carry what both parties need to rebuild the affine
/// transform `scaled = (value - minimum) * 10^decimal_places` that maps a
/// real-world value to a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SemanticType {
    /// Free text, hashed into the field.
    String,
    /// An integer no smaller than `minimum`.
    Integer { minimum: Decimal },
    /// A non-negative integer.
    PositiveInteger,
    /// A number no smaller than `minimum` with no fractional digits.
    Number {
        minimum: Decimal,
        #[serde(rename = "decimalPlaces")]
        decimal_places: u32,
    },
    /// A number no smaller than `minimum` with `decimal_places > 0`.
    DecimalNumber {
        minimum: Decimal,
        #[serde(rename = "decimalPlaces")]
        decimal_places: u32,
    },
    /// A non-negative number with no fractional digits.
    PositiveNumber {
        #[serde(rename = "decimalPlaces")]
        decimal_places: u32,
    },
    /// A non-negative number with `decimal_places > 0`.
    PositiveDecimalNumber {
        #[serde(rename = "decimalPlaces")]
        decimal_places: u32,
    },
    /// Text laid out in the field so it can be recovered (e.g. after
    /// verifiable encryption).
    StringReversible { compress: bool },
}

impl SemanticType {
    /// `(minimum, decimal_places)` of the numeric transform, or `None` for
    /// string types.
    pub fn numeric_transform(&self) -> Option<(Decimal, u32)> {
        match self {
            Self::Integer { minimum } => Some((*minimum, 0)),
            Self::PositiveInteger => Some((Decimal::ZERO, 0)),
            Self::Number {
                minimum,
                decimal_places,
            }
            | Self::DecimalNumber {
                minimum,
                decimal_places,
            } => Some((*minimum, *decimal_places)),
            Self::PositiveNumber { decimal_places }
            | Self::PositiveDecimalNumber { decimal_places } => {
                Some((Decimal::ZERO, *decimal_places))
            }
            Self::String | Self::StringReversible { .. } => None,
        }
    }

    /// True for the integer variants.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer { .. } | Self::PositiveInteger)
    }
}

/// A node of the normalized schema.
///
/// Serialized untagged: a leaf is an object with a string `type`, a nested
/// schema is an object of entries. A nested field literally named `type`
/// holds an object, never a string, so the two cannot be confused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaEntry {
    Leaf(SemanticType),
    Nested(InternalSchema),
}

impl SchemaEntry {
    pub fn as_leaf(&self) -> Option<&SemanticType> {
        match self {
            Self::Leaf(t) => Some(t),
            Self::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&InternalSchema> {
        match self {
            Self::Nested(s) => Some(s),
            Self::Leaf(_) => None,
        }
    }
}

/// Field name to entry, ordered by name. Array items appear under the keys
/// `"0"`, `"1"`, ....
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalSchema(BTreeMap<String, SchemaEntry>);

impl InternalSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, entry: SchemaEntry) {
        self.0.insert(name, entry);
    }

    /// Look up a leaf by dotted path.
    pub fn leaf(&self, path: &str) -> Option<&SemanticType> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_nested()?.get(segment)?;
        }
        current.as_leaf()
    }
}

impl FromIterator<(String, SchemaEntry)> for InternalSchema {
    fn from_iter<I: IntoIterator<Item = (String, SchemaEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Canonical attribute ordering: parallel sequences of dotted paths and
/// their types, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedSchema {
    pub names: Vec<String>,
    pub types: Vec<SemanticType>,
}

impl FlattenedSchema {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of `name` in the canonical ordering.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .ok()
    }

    pub fn type_of(&self, name: &str) -> Option<&SemanticType> {
        self.index_of(name).map(|i| &self.types[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SemanticType)> {
        self.names.iter().map(String::as_str).zip(self.types.iter())
    }
}

pub(crate) fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{segment}")
    }
}
