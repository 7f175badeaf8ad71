//! # Canonical Byte Vectors
//!
//! Schema fingerprints are only comparable between parties if both sides
//! produce the same canonical bytes. These vectors pin the output of
//! `CanonicalBytes::new` for the shapes that occur in compiled schemas.

use credschema_core::{sha256_digest, CanonicalBytes, ContentDigest};

const VECTORS: &[(&str, &str)] = &[
    (r#"{"type":"string"}"#, r#"{"type":"string"}"#),
    (
        r#"{"type":"number","multipleOf":0.01,"minimum":-180.0}"#,
        r#"{"minimum":-180,"multipleOf":0.01,"type":"number"}"#,
    ),
    (
        r##"{"properties":{"b":{"$ref":"#/definitions/x"},"a":{"type":"integer"}}}"##,
        r##"{"properties":{"a":{"type":"integer"},"b":{"$ref":"#/definitions/x"}}}"##,
    ),
    (
        r#"{"version":"0.1.0","parsingOptions":{"useDefaults":false}}"#,
        r#"{"parsingOptions":{"useDefaults":false},"version":"0.1.0"}"#,
    ),
    (r#"[3, 2, 1]"#, r#"[3,2,1]"#),
    (r#"{"n":null,"t":true}"#, r#"{"n":null,"t":true}"#),
];

#[test]
fn test_canonical_bytes_match_vectors() {
    for (input, expected) in VECTORS {
        let value: serde_json::Value = serde_json::from_str(input).unwrap();
        let canonical = CanonicalBytes::new(&value).unwrap();
        assert_eq!(
            std::str::from_utf8(canonical.as_bytes()).unwrap(),
            *expected,
            "canonical mismatch for {input}"
        );
    }
}

#[test]
fn test_whitespace_and_order_do_not_change_digest() {
    let compact: serde_json::Value =
        serde_json::from_str(r#"{"minimum":0,"type":"integer"}"#).unwrap();
    let spread: serde_json::Value =
        serde_json::from_str("{\n  \"type\": \"integer\",\n  \"minimum\": 0.0\n}").unwrap();
    let a = sha256_digest(&CanonicalBytes::new(&compact).unwrap());
    let b = sha256_digest(&CanonicalBytes::new(&spread).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_digest_string_is_stable() {
    let value = serde_json::json!({"type": "object"});
    let digest = sha256_digest(&CanonicalBytes::new(&value).unwrap());
    let rendered = digest.to_string();
    let parsed: ContentDigest = rendered.parse().unwrap();
    assert_eq!(parsed, digest);
    assert_eq!(parsed.to_hex(), rendered.trim_start_matches("sha256:"));
}
