//! # Serialization Round-Trip Tests
//!
//! `from_json(to_json(x))` must agree with `x` on version, normalized
//! schema, original document, and encoder key set, and must encode every
//! credential identically.

use credschema_schema::{
    generate_from_credential, CredentialSchema, ParsingOptions, SchemaConfig,
    CREDENTIAL_SCHEMA_VERSION,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness. Set `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rich_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "definitions": {
            "latitude": {"type": "number", "minimum": -90, "multipleOf": 0.0001}
        },
        "properties": {
            "credentialVersion": {"type": "string"},
            "credentialSchema": {"type": "string"},
            "credentialStatus": {
                "type": "object",
                "properties": {
                    "registryId": {"type": "string"},
                    "revocationCheck": {"type": "string"},
                    "revocationId": {"type": "string"}
                }
            },
            "issuer": {"type": "string"},
            "credentialSubject": {
                "type": "object",
                "properties": {
                    "fname": {"type": "string"},
                    "ssn": {"$ref": "#/definitions/encryptableString"},
                    "age": {"$ref": "#/definitions/positiveInteger"},
                    "score": {"type": "integer", "minimum": -100},
                    "salary": {"allOf": [
                        {"$ref": "#/definitions/positiveNumber"},
                        {"multipleOf": 0.01}
                    ]},
                    "home": {"$ref": "#/definitions/latitude"},
                    "visits": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "city": {"$ref": "#/definitions/encryptableCompString"},
                                "days": {"$ref": "#/definitions/positiveInteger"}
                            }
                        },
                        "minItems": 2,
                        "maxItems": 2
                    }
                }
            }
        }
    })
}

fn credential(age: u32, score: i32, salary_cents: u32, lat_e4: i32) -> Value {
    json!({
        "credentialVersion": "0.1.0",
        "credentialSchema": "https://example.org/rich.json",
        "credentialStatus": {
            "registryId": "reg-1",
            "revocationCheck": "membership",
            "revocationId": "5"
        },
        "issuer": "did:example:issuer",
        "credentialSubject": {
            "fname": "Ada",
            "ssn": "123-45-6789",
            "age": age,
            "score": score,
            "salary": f64::from(salary_cents) / 100.0,
            "home": f64::from(lat_e4) / 10_000.0,
            "visits": [
                {"city": "Paris", "days": 3},
                {"city": "Lagos", "days": 10}
            ]
        }
    })
}

#[test]
fn test_round_trip_preserves_everything() {
    init_tracing();
    let original = CredentialSchema::new(rich_schema()).unwrap();
    let restored = CredentialSchema::from_json(&original.to_json()).unwrap();

    assert_eq!(restored.version(), original.version());
    assert_eq!(restored.schema(), original.schema());
    assert_eq!(restored.json_schema(), original.json_schema());
    assert_eq!(restored, original);
    assert_eq!(
        restored.encoders().keys().collect::<Vec<_>>(),
        original.encoders().keys().collect::<Vec<_>>()
    );
    assert!(restored.has_status());
}

#[test]
fn test_wire_form_shape() {
    let schema = CredentialSchema::new(rich_schema()).unwrap();
    let wire = schema.to_json();
    let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
    for key in ["version", "jsonSchema", "schema", "parsingOptions"] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
    assert_eq!(wire["version"], json!(CREDENTIAL_SCHEMA_VERSION));
    // The original document is kept with its references intact.
    assert_eq!(
        wire["jsonSchema"]["properties"]["credentialSubject"]["properties"]["age"],
        json!({"$ref": "#/definitions/positiveInteger"})
    );
    assert_eq!(
        wire["schema"]["credentialSubject"]["home"],
        json!({"type": "decimalNumber", "minimum": "-90", "decimalPlaces": 4})
    );
}

#[test]
fn test_round_trip_keeps_parsing_options() {
    let doc = json!({
        "type": "object",
        "properties": {
            "credentialVersion": {"type": "string"},
            "credentialSchema": {"type": "string"},
            "credentialSubject": {
                "type": "object",
                "properties": {"n": {"type": "integer"}}
            }
        }
    });
    let schema =
        CredentialSchema::with_options(doc, ParsingOptions::with_defaults(), &SchemaConfig::default())
            .unwrap();
    let restored = CredentialSchema::from_json(&schema.to_json()).unwrap();
    assert!(restored.parsing_options().use_defaults);
    assert_eq!(restored, schema);
}

#[test]
fn test_restored_foreign_version_is_not_rewritten() {
    init_tracing();
    let schema = CredentialSchema::new(rich_schema()).unwrap();
    let mut wire = schema.to_json();
    wire["version"] = json!("9.9.9");
    let restored = CredentialSchema::from_json(&wire).unwrap();
    assert_eq!(restored.version(), "9.9.9");
    assert_eq!(restored.to_json()["version"], json!("9.9.9"));
}

#[test]
fn test_fingerprint_survives_round_trip() {
    let schema = CredentialSchema::new(rich_schema()).unwrap();
    let restored = CredentialSchema::from_json(&schema.to_json()).unwrap();
    assert_eq!(
        schema.fingerprint().unwrap().to_hex(),
        restored.fingerprint().unwrap().to_hex()
    );
}

proptest! {
    #[test]
    fn restored_schema_encodes_identically(
        age in 0u32..150,
        score in -100i32..1000,
        salary_cents in 0u32..10_000_000,
        lat_e4 in -900_000i32..900_000,
    ) {
        let original = CredentialSchema::new(rich_schema()).unwrap();
        let restored = CredentialSchema::from_json(&original.to_json()).unwrap();
        let cred = credential(age, score, salary_cents, lat_e4);
        let a = original.encode_credential(&cred).unwrap();
        let b = restored.encode_credential(&cred).unwrap();
        prop_assert_eq!(a, b);
    }
}

fn sample_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        (-10_000_000i64..10_000_000).prop_map(|cents| json!(cents as f64 / 100.0)),
    ]
}

fn sample_credential() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map("[a-z]{1,8}", sample_leaf(), 1..8).prop_map(|subject| {
        json!({
            "credentialVersion": "0.1.0",
            "credentialSchema": "https://example.org/generated.json",
            "credentialSubject": subject,
        })
    })
}

proptest! {
    #[test]
    fn generated_schema_survives_text_round_trip(sample in sample_credential()) {
        let raw = generate_from_credential(&sample, &ParsingOptions::default()).unwrap();
        let original = CredentialSchema::new(raw).unwrap();

        let stored = serde_json::to_string(&original.to_json()).unwrap();
        let restored = CredentialSchema::from_json(&serde_json::from_str(&stored).unwrap()).unwrap();

        prop_assert_eq!(&restored, &original);
        prop_assert_eq!(restored.flatten(), original.flatten());
        prop_assert_eq!(
            restored.encode_credential(&sample).unwrap(),
            original.encode_credential(&sample).unwrap()
        );
    }
}
