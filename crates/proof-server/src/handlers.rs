//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use notepool_circuits::{
    empty_root, CircuitInput, CircuitKind, FieldElement, MerkleError, MerkleProof, MerkleTree,
    Note, Position, MAX_DEPTH,
};
use notepool_prover::{
    calldata_labels, prove_with_timeout, to_chain_calldata, ProofArtifact, ProofResult,
    ProveError, Scalar,
};

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<MerkleError> for ApiError {
    fn from(e: MerkleError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<ProveError> for ApiError {
    fn from(e: ProveError) -> Self {
        let status = match &e {
            ProveError::UnknownCircuit(_) => StatusCode::NOT_FOUND,
            ProveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProveError::ArtifactNotFound(_) => StatusCode::SERVICE_UNAVAILABLE,
            // the circuit rejected the witness
            ProveError::ProvingFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ProveError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %e, "request failed");
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============ Commitments ============

#[derive(Serialize)]
pub struct CommitmentResponse {
    pub commitment: FieldElement,
}

pub async fn note_commitment(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(note): Json<Note>,
) -> Json<CommitmentResponse> {
    let state = state.read().await;
    Json(CommitmentResponse {
        commitment: note.commitment(&state.hasher),
    })
}

pub async fn position_commitment(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(position): Json<Position>,
) -> Json<CommitmentResponse> {
    let state = state.read().await;
    Json(CommitmentResponse {
        commitment: position.commitment(&state.hasher),
    })
}

#[derive(Deserialize)]
pub struct GenerateNoteRequest {
    pub amount: u128,
}

#[derive(Serialize)]
pub struct GenerateNoteResponse {
    pub secret: FieldElement,
    pub nullifier: FieldElement,
    pub amount: u128,
    pub commitment: FieldElement,
}

pub async fn generate_note(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(req): Json<GenerateNoteRequest>,
) -> Json<GenerateNoteResponse> {
    let note = Note::random(req.amount);
    let state = state.read().await;
    Json(GenerateNoteResponse {
        commitment: note.commitment(&state.hasher),
        secret: note.secret,
        nullifier: note.nullifier,
        amount: note.amount,
    })
}

// ============ Accumulator ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeProofRequest {
    pub leaves: Vec<FieldElement>,
    pub leaf_index: u64,
    /// Defaults to the configured tree depth
    #[serde(default)]
    pub depth: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeProofResponse {
    pub root: FieldElement,
    pub leaf: FieldElement,
    pub leaf_index: u64,
    #[serde(flatten)]
    pub proof: MerkleProof,
}

pub async fn tree_proof(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(req): Json<TreeProofRequest>,
) -> ApiResult<TreeProofResponse> {
    let state = state.read().await;
    let depth = req.depth.unwrap_or(state.tree_depth);

    let tree = MerkleTree::build(&state.hasher, &req.leaves, depth)?;
    let proof = tree.prove_inclusion(req.leaf_index)?;
    let leaf = tree.leaf(req.leaf_index).unwrap_or_default();

    Ok(Json(TreeProofResponse {
        root: tree.root(),
        leaf,
        leaf_index: req.leaf_index,
        proof,
    }))
}

#[derive(Deserialize)]
pub struct EmptyRootQuery {
    pub depth: Option<u32>,
}

#[derive(Serialize)]
pub struct EmptyRootResponse {
    pub depth: u32,
    pub root: FieldElement,
}

pub async fn empty_tree_root(
    State(state): State<Arc<RwLock<AppState>>>,
    Query(query): Query<EmptyRootQuery>,
) -> ApiResult<EmptyRootResponse> {
    let state = state.read().await;
    let depth = query.depth.unwrap_or(state.tree_depth);
    if depth > MAX_DEPTH {
        return Err(ApiError::bad_request(format!(
            "depth {depth} exceeds the maximum of {MAX_DEPTH}"
        )));
    }

    Ok(Json(EmptyRootResponse {
        depth,
        root: empty_root(&state.hasher, depth),
    }))
}

// ============ Proofs ============

#[derive(Serialize)]
pub struct ProveResponse {
    #[serde(flatten)]
    pub artifact: ProofArtifact,
    pub verified: bool,
}

/// Prove a circuit input given as its signal object.
pub async fn prove(
    State(state): State<Arc<RwLock<AppState>>>,
    Path(circuit): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<ProveResponse> {
    let kind: CircuitKind = circuit.parse().map_err(ProveError::from)?;
    let input = CircuitInput::from_signals(kind, &body).map_err(ProveError::from)?;

    // Proving can take minutes; don't hold the lock across it.
    let (orchestrator, timeout) = {
        let state = state.read().await;
        (state.orchestrator.clone(), state.prove_timeout)
    };

    info!(circuit = %kind, "proof requested");
    let result = prove_with_timeout(orchestrator.clone(), input, timeout).await?;

    let (proof, signals) = (result.proof.clone(), result.public_signals.clone());
    let verified =
        tokio::task::spawn_blocking(move || orchestrator.verify(kind, &proof, &signals))
            .await
            .map_err(|e| ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("verification task aborted: {e}"),
            })??;

    Ok(Json(ProveResponse {
        artifact: ProofArtifact::new(kind, &result, Utc::now()),
        verified,
    }))
}

#[derive(Serialize)]
pub struct CalldataResponse {
    pub calldata: Vec<Scalar>,
    pub labels: Vec<String>,
}

/// Flatten a snarkjs proof and its public signals into verifier calldata.
pub async fn calldata(Json(req): Json<ProofResult>) -> Json<CalldataResponse> {
    let calldata = to_chain_calldata(&req.proof, &req.public_signals)
        .into_iter()
        .map(Scalar::new)
        .collect();
    Json(CalldataResponse {
        calldata,
        labels: calldata_labels(req.public_signals.len()),
    })
}
