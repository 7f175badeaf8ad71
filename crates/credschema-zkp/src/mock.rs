//! # Mock Proof System
//!
//! A deterministic, transparent stand-in for a real prover. A proof is
//! `SHA-256(tag || schema fingerprint || public inputs)`, so it binds the
//! revealed values to one compiled schema and nothing more.
//!
//! ## Security Notice
//!
//! This implementation provides NO zero-knowledge and NO soundness: anyone
//! holding the public inputs can produce a valid proof. It exists so that
//! schema, witness and verifier plumbing can be exercised end to end.

use credschema_core::{ContentDigest, FIELD_ELEMENT_BYTES};
use credschema_schema::CredentialSchema;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::traits::{ProofError, ProofSystem, VerifyError};

const TRANSCRIPT_TAG: &[u8] = b"credschema.mock-proof.v1";

/// A mock proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProof {
    /// Fingerprint of the schema the proof was made under.
    pub schema: ContentDigest,
    /// SHA-256 transcript hash.
    pub bytes: Vec<u8>,
}

/// A mock verifying key, bound to one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockVerifyingKey {
    pub schema: ContentDigest,
}

/// A mock proving key, bound to one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProvingKey {
    pub schema: ContentDigest,
}

/// Deterministic, transparent proof system with no ZK privacy.
#[derive(Debug, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Derive the key pair for `schema` from its fingerprint.
    pub fn setup(
        &self,
        schema: &CredentialSchema,
    ) -> Result<(MockProvingKey, MockVerifyingKey), ProofError> {
        let fingerprint = schema
            .fingerprint()
            .map_err(|e| ProofError::ProverError(e.to_string()))?;
        debug!(schema = %fingerprint, "mock proof system setup");
        Ok((
            MockProvingKey {
                schema: fingerprint,
            },
            MockVerifyingKey {
                schema: fingerprint,
            },
        ))
    }

    fn transcript(schema: &ContentDigest, public_inputs: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(TRANSCRIPT_TAG);
        hasher.update(schema.as_bytes());
        hasher.update(public_inputs);
        hasher.finalize().to_vec()
    }
}

fn check_alignment(label: &str, bytes: &[u8]) -> Result<(), String> {
    if bytes.len() % FIELD_ELEMENT_BYTES != 0 {
        return Err(format!(
            "{label} length {} is not a multiple of {FIELD_ELEMENT_BYTES}",
            bytes.len()
        ));
    }
    Ok(())
}

impl ProofSystem for MockProofSystem {
    type Proof = MockProof;
    type VerifyingKey = MockVerifyingKey;
    type ProvingKey = MockProvingKey;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        public_inputs: &[u8],
        private_inputs: &[u8],
    ) -> Result<Self::Proof, ProofError> {
        check_alignment("public inputs", public_inputs).map_err(ProofError::WitnessError)?;
        check_alignment("private inputs", private_inputs).map_err(ProofError::WitnessError)?;
        Ok(MockProof {
            schema: pk.schema,
            bytes: Self::transcript(&pk.schema, public_inputs),
        })
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError> {
        if proof.bytes.len() != 32 {
            return Err(VerifyError::InvalidProof(format!(
                "expected 32 proof bytes, got {}",
                proof.bytes.len()
            )));
        }
        if proof.schema != vk.schema {
            return Err(VerifyError::KeyMismatch(format!(
                "proof made under {}, key is for {}",
                proof.schema, vk.schema
            )));
        }
        check_alignment("public inputs", public_inputs).map_err(VerifyError::InvalidProof)?;
        Ok(proof.bytes == Self::transcript(&vk.schema, public_inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credschema_core::{sha256_digest, CanonicalBytes};

    fn keys(seed: u8) -> (MockProvingKey, MockVerifyingKey) {
        let schema = sha256_digest(&CanonicalBytes::new(&seed).unwrap());
        (MockProvingKey { schema }, MockVerifyingKey { schema })
    }

    #[test]
    fn test_prove_verify() {
        let sys = MockProofSystem;
        let (pk, vk) = keys(1);
        let public = [7u8; 64];
        let proof = sys.prove(&pk, &public, &[0u8; 32]).unwrap();
        assert!(sys.verify(&vk, &proof, &public).unwrap());
        assert!(!sys.verify(&vk, &proof, &[8u8; 64]).unwrap());
    }

    #[test]
    fn test_proof_is_deterministic() {
        let sys = MockProofSystem;
        let (pk, _) = keys(1);
        let a = sys.prove(&pk, &[1u8; 32], &[]).unwrap();
        let b = sys.prove(&pk, &[1u8; 32], &[2u8; 32]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_misaligned_inputs() {
        let sys = MockProofSystem;
        let (pk, vk) = keys(1);
        assert!(matches!(
            sys.prove(&pk, &[0u8; 31], &[]),
            Err(ProofError::WitnessError(_))
        ));
        assert!(matches!(
            sys.prove(&pk, &[], &[0u8; 33]),
            Err(ProofError::WitnessError(_))
        ));
        let proof = sys.prove(&pk, &[], &[]).unwrap();
        assert!(matches!(
            sys.verify(&vk, &proof, &[0u8; 5]),
            Err(VerifyError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_truncated_proof() {
        let sys = MockProofSystem;
        let (pk, vk) = keys(1);
        let mut proof = sys.prove(&pk, &[], &[]).unwrap();
        proof.bytes.truncate(16);
        assert!(matches!(
            sys.verify(&vk, &proof, &[]),
            Err(VerifyError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_key_for_other_schema() {
        let sys = MockProofSystem;
        let (pk, _) = keys(1);
        let (_, other_vk) = keys(2);
        let proof = sys.prove(&pk, &[], &[]).unwrap();
        assert!(matches!(
            sys.verify(&other_vk, &proof, &[]),
            Err(VerifyError::KeyMismatch(_))
        ));
    }
}
