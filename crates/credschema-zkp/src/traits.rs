//! # Proof System Trait
//!
//! The interface a proof system exposes to the schema layer. Inputs are
//! opaque byte strings: the concatenated field elements of a
//! [`WitnessVector`](crate::witness::WitnessVector), split into the
//! revealed (public) and hidden (private) parts. The proof system never
//! sees attribute names.
//!
//! Implementations must be `Send + Sync`; proving and verifying are pure.

use thiserror::Error;

/// Error during proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The statement cannot be satisfied by the witness.
    #[error("circuit error: {0}")]
    CircuitError(String),
    /// The witness is malformed.
    #[error("witness error: {0}")]
    WitnessError(String),
    /// Internal prover error.
    #[error("prover error: {0}")]
    ProverError(String),
}

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof is structurally invalid.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    /// The verifying key belongs to a different schema.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),
}

/// Abstract interface for a zero-knowledge proof system.
pub trait ProofSystem: Send + Sync {
    /// The proof type produced by this system.
    type Proof: Send + Sync;
    /// The verifying key type.
    type VerifyingKey: Clone + Send + Sync;
    /// The proving key type.
    type ProvingKey: Send + Sync;

    /// Generate a proof.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        public_inputs: &[u8],
        private_inputs: &[u8],
    ) -> Result<Self::Proof, ProofError>;

    /// Verify a proof. `Ok(false)` means well-formed but wrong.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError>;
}
