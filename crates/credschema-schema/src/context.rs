//! Linked-data context projection.
//!
//! One term per distinct path segment of the flattened schema, array
//! indices included, each mapped to `prefix + segment`.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::types::{FlattenedSchema, PATH_SEPARATOR};

/// JSON-LD processing mode announced in the header entry.
pub const JSON_LD_VERSION: f64 = 1.1;

/// Build `{"@context": [{"@version": 1.1}, {term: prefix + term, ...}]}`.
pub fn json_ld_context(flattened: &FlattenedSchema, prefix: &str) -> Value {
    let segments: BTreeSet<&str> = flattened
        .names
        .iter()
        .flat_map(|name| name.split(PATH_SEPARATOR))
        .collect();

    let terms: Map<String, Value> = segments
        .into_iter()
        .map(|segment| (segment.to_string(), Value::String(format!("{prefix}{segment}"))))
        .collect();

    json!({
        "@context": [
            {"@version": JSON_LD_VERSION},
            terms
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SemanticType;

    #[test]
    fn test_distinct_segments() {
        let flat = FlattenedSchema {
            names: vec![
                "credentialSubject.items.0.id".into(),
                "credentialSubject.items.1.id".into(),
                "credentialVersion".into(),
            ],
            types: vec![SemanticType::String; 3],
        };
        let ctx = json_ld_context(&flat, "https://example.org/#");
        let terms = ctx["@context"][1].as_object().unwrap();
        let keys: Vec<_> = terms.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 6);
        for k in ["credentialSubject", "items", "0", "1", "id", "credentialVersion"] {
            assert_eq!(terms[k], json!(format!("https://example.org/#{k}")));
        }
        assert_eq!(ctx["@context"][0], json!({"@version": 1.1}));
    }

    #[test]
    fn test_empty_schema_has_only_header() {
        let ctx = json_ld_context(&FlattenedSchema::default(), "p:");
        assert_eq!(ctx, json!({"@context": [{"@version": 1.1}, {}]}));
    }
}
