//! # Canonical JSON
//!
//! `CanonicalBytes` is what schema fingerprints are computed over. Its only
//! constructor normalizes numbers and then emits RFC 8785 (JCS) bytes via
//! `serde_jcs`: sorted keys, no whitespace, ECMAScript number rendering.
//!
//! ## Number Normalization
//!
//! Schema documents are written by hand and by generators, so `-180` and
//! `-180.0` both occur for the same bound. Integral floats within `i64`
//! are rewritten as integers before serialization; every other number is
//! left to JCS.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// JCS bytes of a value after number normalization. The inner buffer is
/// private; [`CanonicalBytes::new`] is the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// # Errors
    ///
    /// `CanonicalizationError::SerializationFailed` if `obj` has no JSON
    /// representation.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let normalized = normalize_numbers(serde_json::to_value(obj)?);
        Ok(Self(serde_jcs::to_vec(&normalized)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(integral_float_to_int(n)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        other => other,
    }
}

fn integral_float_to_int(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        // |f| < 2^63 keeps the cast exact for integral values.
        Some(f) if f.fract() == 0.0 && f.abs() < 9.223_372_036_854_776e18 => {
            Number::from(f as i64)
        }
        _ => n,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e6f64..1.0e6).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6).prop_map(|m| {
                    Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        /// Same input always produces the same bytes.
        #[test]
        fn canonical_bytes_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Canonical bytes are valid JSON.
        #[test]
        fn canonical_bytes_valid_json(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok(), "Not valid JSON: {:?}", parsed.err());
        }

        /// Canonicalizing canonical output is a fixed point.
        #[test]
        fn canonical_bytes_idempotent(value in json_value()) {
            let once = CanonicalBytes::new(&value).unwrap();
            let reparsed: Value = serde_json::from_slice(once.as_bytes()).unwrap();
            let twice = CanonicalBytes::new(&reparsed).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
