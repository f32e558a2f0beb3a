//! API route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;

use crate::handlers;
use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<RwLock<AppState>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Commitments
        .route("/api/commitment/note", post(handlers::note_commitment))
        .route("/api/commitment/position", post(handlers::position_commitment))
        .route("/api/note/generate", post(handlers::generate_note))
        // Accumulator
        .route("/api/tree/proof", post(handlers::tree_proof))
        .route("/api/tree/empty-root", get(handlers::empty_tree_root))
        // Proofs
        .route("/api/prove/:circuit", post(handlers::prove))
        .route("/api/calldata", post(handlers::calldata))
}
