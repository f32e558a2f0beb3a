//! Proof orchestration for the note pool circuits.
//!
//! This crate provides:
//! - Circuit artifact lookup (`<kind>_js/<kind>.wasm`, `<kind>_final.zkey`, `<kind>_vk.json`)
//! - Groth16 proving through an external backend (snarkjs by default)
//! - Verification, either through the backend or natively with arkworks
//! - Chain calldata export and test fixture generation

pub mod artifacts;
pub mod backend;
pub mod calldata;
pub mod config;
pub mod fixtures;
pub mod proof;
pub mod prove;
pub mod verify;

#[cfg(test)]
mod testing;

pub use artifacts::{ArtifactNotFound, ArtifactStore, CircuitArtifacts};
pub use backend::{BackendError, Groth16Prover, Groth16Verifier, SnarkjsCli};
pub use calldata::{calldata_labels, to_chain_calldata, ProofArtifact, PROOF_SCALARS};
pub use config::{ConfigError, ProverConfig};
pub use fixtures::{
    render_source_constants, to_fixture, Fixture, FixtureError, FixtureFailure, FixtureGenerator,
    FixtureReport,
};
pub use proof::{Groth16Proof, ProofResult, Scalar, VerifyingKeyJson};
pub use prove::{prove_with_timeout, ProofOrchestrator, ProofRequest, ProofStage, ProveError};
pub use verify::NativeVerifier;
