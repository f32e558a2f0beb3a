//! Proof orchestration.
//!
//! A request moves through
//! `Assembling -> Proving -> Verifying -> {Accepted, Rejected}`, dropping to
//! `Failed` if a backend call errors. Nothing is retried: a failed proof is
//! reported to the caller, who decides whether to try again.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use notepool_circuits::{CircuitInput, CircuitKind, FieldElement, InputError, UnknownCircuit};

use crate::artifacts::{ArtifactNotFound, ArtifactStore};
use crate::backend::{Groth16Prover, Groth16Verifier};
use crate::proof::{Groth16Proof, ProofResult};

#[derive(Error, Debug)]
pub enum ProveError {
    #[error(transparent)]
    UnknownCircuit(#[from] UnknownCircuit),
    #[error(transparent)]
    ArtifactNotFound(#[from] ArtifactNotFound),
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("{circuit} proving failed: {detail}")]
    ProvingFailed { circuit: CircuitKind, detail: String },
    #[error("{circuit} verifier failed: {detail}")]
    VerifierFailed { circuit: CircuitKind, detail: String },
    #[error("{circuit} proving timed out after {timeout:?}")]
    TimedOut {
        circuit: CircuitKind,
        timeout: Duration,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProveError {
    /// Errors caused by the caller (bad circuit name, missing files, bad
    /// input) rather than by the backend.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ProveError::UnknownCircuit(_)
                | ProveError::ArtifactNotFound(_)
                | ProveError::InvalidInput(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "reason", rename_all = "lowercase")]
pub enum ProofStage {
    Assembling,
    Proving,
    Verifying,
    Accepted,
    Rejected,
    Failed(String),
}

impl ProofStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProofStage::Accepted | ProofStage::Rejected | ProofStage::Failed(_)
        )
    }

    pub fn can_transition_to(&self, next: &ProofStage) -> bool {
        matches!(
            (self, next),
            (ProofStage::Assembling, ProofStage::Proving)
                | (ProofStage::Proving, ProofStage::Verifying)
                | (ProofStage::Proving, ProofStage::Failed(_))
                | (ProofStage::Verifying, ProofStage::Accepted)
                | (ProofStage::Verifying, ProofStage::Rejected)
                | (ProofStage::Verifying, ProofStage::Failed(_))
        )
    }
}

/// One proof request and the stages it went through.
#[derive(Clone, Debug, Serialize)]
pub struct ProofRequest {
    pub circuit: CircuitKind,
    stages: Vec<ProofStage>,
    result: Option<ProofResult>,
}

impl ProofRequest {
    fn new(circuit: CircuitKind) -> Self {
        Self {
            circuit,
            stages: vec![ProofStage::Assembling],
            result: None,
        }
    }

    fn enter(&mut self, next: ProofStage) {
        debug_assert!(
            self.stage().can_transition_to(&next),
            "invalid transition {:?} -> {next:?}",
            self.stage()
        );
        self.stages.push(next);
    }

    pub fn stage(&self) -> &ProofStage {
        // never empty: starts at Assembling
        &self.stages[self.stages.len() - 1]
    }

    pub fn stages(&self) -> &[ProofStage] {
        &self.stages
    }

    pub fn is_accepted(&self) -> bool {
        *self.stage() == ProofStage::Accepted
    }

    /// The proof, once one was produced (accepted or not).
    pub fn result(&self) -> Option<&ProofResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<ProofResult> {
        self.result
    }
}

/// Resolves artifacts and drives the proving and verification backends.
pub struct ProofOrchestrator<P, V> {
    store: ArtifactStore,
    prover: P,
    verifier: V,
}

impl<P: Groth16Prover, V: Groth16Verifier> ProofOrchestrator<P, V> {
    pub fn new(store: ArtifactStore, prover: P, verifier: V) -> Self {
        Self {
            store,
            prover,
            verifier,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Prove `input` with its circuit's artifacts.
    pub fn prove(&self, input: &CircuitInput) -> Result<ProofResult, ProveError> {
        let kind = input.kind();
        let artifacts = self.store.resolve(kind)?;

        info!(circuit = %kind, "generating proof");
        let started = Instant::now();
        let result = self
            .prover
            .full_prove(&input.to_signals(), &artifacts)
            .map_err(|e| ProveError::ProvingFailed {
                circuit: kind,
                detail: e.to_string(),
            })?;
        info!(
            circuit = %kind,
            signals = result.public_signals.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "proof generated"
        );
        Ok(result)
    }

    /// Prove a dynamically supplied input, e.g. one loaded from a file.
    pub fn prove_named(&self, circuit: &str, input: &Value) -> Result<ProofResult, ProveError> {
        let kind: CircuitKind = circuit.parse()?;
        let input = CircuitInput::from_signals(kind, input)?;
        self.prove(&input)
    }

    /// Check a proof against the kind's verification key. A rejected proof
    /// is `Ok(false)`.
    pub fn verify(
        &self,
        kind: CircuitKind,
        proof: &Groth16Proof,
        public_signals: &[FieldElement],
    ) -> Result<bool, ProveError> {
        let vk = self.store.load_verification_key(kind)?;
        let valid = self
            .verifier
            .verify(&vk, public_signals, proof)
            .map_err(|e| ProveError::VerifierFailed {
                circuit: kind,
                detail: e.to_string(),
            })?;
        info!(circuit = %kind, valid, "proof verified");
        Ok(valid)
    }

    pub fn verify_named(
        &self,
        circuit: &str,
        proof: &Groth16Proof,
        public_signals: &[FieldElement],
    ) -> Result<bool, ProveError> {
        self.verify(circuit.parse()?, proof, public_signals)
    }

    /// Run a request through proving and verification.
    ///
    /// Structural problems (missing artifacts or verification key) abort
    /// with `Err` before any proving starts. Backend failures end the
    /// request in `Failed`.
    pub fn prove_and_verify(&self, input: &CircuitInput) -> Result<ProofRequest, ProveError> {
        let kind = input.kind();
        self.store.resolve(kind)?;
        self.store.verification_key_path(kind)?;

        let mut request = ProofRequest::new(kind);
        request.enter(ProofStage::Proving);

        let result = match self.prove(input) {
            Ok(result) => result,
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                warn!(circuit = %kind, error = %e, "proving failed");
                request.enter(ProofStage::Failed(e.to_string()));
                return Ok(request);
            }
        };

        request.enter(ProofStage::Verifying);
        let verdict = self.verify(kind, &result.proof, &result.public_signals);
        request.result = Some(result);

        match verdict {
            Ok(true) => request.enter(ProofStage::Accepted),
            Ok(false) => {
                warn!(circuit = %kind, "proof rejected");
                request.enter(ProofStage::Rejected);
            }
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                warn!(circuit = %kind, error = %e, "verification failed");
                request.enter(ProofStage::Failed(e.to_string()));
            }
        }
        Ok(request)
    }
}

/// Prove on a blocking thread and stop waiting after `timeout`.
///
/// On timeout the backend is not interrupted; the proof may still finish in
/// the background and is discarded.
pub async fn prove_with_timeout<P, V>(
    orchestrator: Arc<ProofOrchestrator<P, V>>,
    input: CircuitInput,
    timeout: Duration,
) -> Result<ProofResult, ProveError>
where
    P: Groth16Prover + 'static,
    V: Groth16Verifier + 'static,
{
    let kind = input.kind();
    let task = tokio::task::spawn_blocking(move || orchestrator.prove(&input));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(ProveError::ProvingFailed {
            circuit: kind,
            detail: format!("proving task aborted: {join}"),
        }),
        Err(_) => {
            warn!(circuit = %kind, ?timeout, "abandoning proof after timeout");
            Err(ProveError::TimedOut {
                circuit: kind,
                timeout,
            })
        }
    }
}
