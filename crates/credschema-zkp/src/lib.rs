//! # credschema-zkp: Proof-System Boundary
//!
//! What the schema layer hands to a zero-knowledge proof system, and the
//! interface it expects back. The proof system itself is out of scope.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): `ProofSystem` takes opaque byte strings and
//!   returns a proof or a verification verdict. Real backends implement it.
//!
//! - **Witness** (`witness.rs`): `WitnessVector` is an encoded credential in
//!   canonical attribute order, split into revealed and hidden inputs.
//!
//! - **Mock** (`mock.rs`): `MockProofSystem` hashes the revealed inputs with
//!   the schema fingerprint. Deterministic, transparent, not zero knowledge.
//!
//! ## Crate Policy
//!
//! - Depends on `credschema-core` and `credschema-schema` internally.
//! - The mock is behind the default `mock` feature.
//! - No `unsafe`.

#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod witness;

#[cfg(feature = "mock")]
pub use mock::MockProofSystem;
pub use traits::{ProofError, ProofSystem, VerifyError};
pub use witness::{PartitionedWitness, WitnessError, WitnessVector};
