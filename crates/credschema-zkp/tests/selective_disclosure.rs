//! # Selective Disclosure Flow
//!
//! Compile a schema, encode a credential, reveal a subset of attributes,
//! and check a mock proof on both sides of a serialized schema.

#![cfg(feature = "mock")]

use credschema_schema::CredentialSchema;
use credschema_zkp::{MockProofSystem, ProofSystem, WitnessVector};
use serde_json::{json, Value};

fn schema_doc() -> Value {
    json!({
        "type": "object",
        "properties": {
            "credentialVersion": {"type": "string"},
            "credentialSchema": {"type": "string"},
            "credentialSubject": {
                "type": "object",
                "properties": {
                    "fname": {"type": "string"},
                    "age": {"$ref": "#/definitions/positiveInteger"},
                    "long": {"type": "number", "minimum": -180, "multipleOf": 0.001}
                }
            }
        }
    })
}

fn credential() -> Value {
    json!({
        "credentialVersion": "0.1.0",
        "credentialSchema": "https://example.org/s.json",
        "credentialSubject": {"fname": "Ada", "age": 36, "long": -0.127}
    })
}

#[test]
fn test_prover_and_verifier_agree() {
    let prover_schema = CredentialSchema::new(schema_doc()).unwrap();
    let verifier_schema = CredentialSchema::from_json(&prover_schema.to_json()).unwrap();
    let sys = MockProofSystem;

    let (pk, _) = sys.setup(&prover_schema).unwrap();
    let (_, vk) = sys.setup(&verifier_schema).unwrap();

    let witness: WitnessVector = prover_schema
        .encode_credential(&credential())
        .unwrap()
        .into();
    let split = witness
        .partition_by_name(["credentialSubject.age"])
        .unwrap();
    assert_eq!(split.revealed, vec![witness.index_of("credentialSubject.age").unwrap()]);

    let proof = sys
        .prove(&pk, &split.public_inputs, &split.private_inputs)
        .unwrap();

    // The verifier re-encodes the revealed value from its own schema.
    let age = verifier_schema
        .encode_attribute("credentialSubject.age", &json!(36))
        .unwrap();
    assert!(sys.verify(&vk, &proof, age.as_bytes()).unwrap());

    let wrong = verifier_schema
        .encode_attribute("credentialSubject.age", &json!(35))
        .unwrap();
    assert!(!sys.verify(&vk, &proof, wrong.as_bytes()).unwrap());
}

#[test]
fn test_different_schema_rejects_proof() {
    let schema = CredentialSchema::new(schema_doc()).unwrap();
    let mut other_doc = schema_doc();
    other_doc["properties"]["credentialSubject"]["properties"]["lname"] =
        json!({"type": "string"});
    let other = CredentialSchema::new(other_doc).unwrap();

    let sys = MockProofSystem;
    let (pk, _) = sys.setup(&schema).unwrap();
    let (_, other_vk) = sys.setup(&other).unwrap();
    let proof = sys.prove(&pk, &[], &[]).unwrap();
    assert!(sys.verify(&other_vk, &proof, &[]).is_err());
}
