//! Proving and verification backends.
//!
//! The Groth16 prover itself is external. [`SnarkjsCli`] shells out to the
//! snarkjs command line; [`crate::verify::NativeVerifier`] checks proofs
//! in-process.

use std::io;
use std::path::Path;
use std::process::{Command, Output};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use notepool_circuits::FieldElement;

use crate::artifacts::CircuitArtifacts;
use crate::proof::{Groth16Proof, ProofResult, VerifyingKeyJson};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {detail}")]
    Failed {
        program: String,
        status: String,
        detail: String,
    },
    #[error("malformed proof data: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces a proof and public signals from a witness-generator input.
pub trait Groth16Prover: Send + Sync {
    fn full_prove(
        &self,
        input: &Value,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofResult, BackendError>;
}

/// Checks a proof against a verification key.
///
/// `Ok(false)` is a rejected proof; `Err` means the check could not run.
pub trait Groth16Verifier: Send + Sync {
    fn verify(
        &self,
        vk: &VerifyingKeyJson,
        public_signals: &[FieldElement],
        proof: &Groth16Proof,
    ) -> Result<bool, BackendError>;
}

impl<T: Groth16Prover + ?Sized> Groth16Prover for std::sync::Arc<T> {
    fn full_prove(
        &self,
        input: &Value,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofResult, BackendError> {
        (**self).full_prove(input, artifacts)
    }
}

impl<T: Groth16Verifier + ?Sized> Groth16Verifier for std::sync::Arc<T> {
    fn verify(
        &self,
        vk: &VerifyingKeyJson,
        public_signals: &[FieldElement],
        proof: &Groth16Proof,
    ) -> Result<bool, BackendError> {
        (**self).verify(vk, public_signals, proof)
    }
}

/// The snarkjs command line (`snarkjs groth16 fullprove` / `groth16 verify`).
///
/// Each call works in its own temporary directory, removed afterwards.
#[derive(Clone, Debug)]
pub struct SnarkjsCli {
    program: String,
    args: Vec<String>,
}

impl Default for SnarkjsCli {
    fn default() -> Self {
        Self::new("snarkjs", Vec::new())
    }
}

impl SnarkjsCli {
    /// `args` go before the subcommand, e.g. `("npx", ["snarkjs"])`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, subcommand: &[&str], files: &[&Path]) -> Result<Output, BackendError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).args(subcommand).args(files);
        debug!(program = %self.program, ?subcommand, "running snarkjs");

        command.output().map_err(|source| BackendError::Spawn {
            program: self.program.clone(),
            source,
        })
    }

    fn failure(&self, output: &Output) -> BackendError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        BackendError::Failed {
            program: self.program.clone(),
            status: output.status.to_string(),
            detail,
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), BackendError> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

impl Groth16Prover for SnarkjsCli {
    fn full_prove(
        &self,
        input: &Value,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofResult, BackendError> {
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("input.json");
        let proof_path = workdir.path().join("proof.json");
        let public_path = workdir.path().join("public.json");
        write_json(&input_path, input)?;

        info!(circuit = %artifacts.kind, "snarkjs fullprove");
        let output = self.run(
            &["groth16", "fullprove"],
            &[
                input_path.as_path(),
                artifacts.wasm.as_path(),
                artifacts.zkey.as_path(),
                proof_path.as_path(),
                public_path.as_path(),
            ],
        )?;
        if !output.status.success() {
            return Err(self.failure(&output));
        }

        let proof: Groth16Proof = serde_json::from_slice(&std::fs::read(&proof_path)?)?;
        let public_signals: Vec<FieldElement> =
            serde_json::from_slice(&std::fs::read(&public_path)?)?;

        Ok(ProofResult {
            proof,
            public_signals,
        })
    }
}

impl Groth16Verifier for SnarkjsCli {
    fn verify(
        &self,
        vk: &VerifyingKeyJson,
        public_signals: &[FieldElement],
        proof: &Groth16Proof,
    ) -> Result<bool, BackendError> {
        let workdir = tempfile::tempdir()?;
        let vk_path = workdir.path().join("verification_key.json");
        let public_path = workdir.path().join("public.json");
        let proof_path = workdir.path().join("proof.json");
        write_json(&vk_path, vk)?;
        write_json(&public_path, public_signals)?;
        write_json(&proof_path, proof)?;

        let output = self.run(
            &["groth16", "verify"],
            &[vk_path.as_path(), public_path.as_path(), proof_path.as_path()],
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // snarkjs prints "OK!" for a valid proof and "Invalid proof" (exit 1)
        // otherwise; anything else is a backend fault.
        if stdout.contains("OK!") {
            Ok(true)
        } else if stdout.contains("Invalid proof") {
            Ok(false)
        } else {
            Err(self.failure(&output))
        }
    }
}
