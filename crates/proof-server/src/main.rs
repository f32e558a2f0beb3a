//! HTTP API server for note commitments, Merkle paths and proof generation.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod handlers;
mod routes;

use config::ServerConfig;
use notepool_circuits::CircomPoseidon;
use notepool_prover::{ArtifactStore, Groth16Prover, Groth16Verifier, ProofOrchestrator, SnarkjsCli};

pub type Orchestrator = ProofOrchestrator<Arc<dyn Groth16Prover>, Arc<dyn Groth16Verifier>>;

/// Application state shared across handlers
pub struct AppState {
    pub hasher: CircomPoseidon,
    pub orchestrator: Arc<Orchestrator>,
    pub tree_depth: u32,
    pub prove_timeout: Duration,
}

fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(Arc::new(RwLock::new(state)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let prover = &config.prover;

    let store = ArtifactStore::new(&prover.artifacts_dir);
    info!(
        artifacts = %store.root().display(),
        available = ?store.available(),
        "circuit artifacts"
    );

    let backend = Arc::new(SnarkjsCli::new(
        prover.snarkjs_program.clone(),
        prover.snarkjs_args.clone(),
    ));
    let state = AppState {
        hasher: CircomPoseidon::new()?,
        orchestrator: Arc::new(ProofOrchestrator::new(
            store,
            backend.clone() as Arc<dyn Groth16Prover>,
            backend as Arc<dyn Groth16Verifier>,
        )),
        tree_depth: prover.tree_depth,
        prove_timeout: prover.prove_timeout,
    };

    info!(addr = %config.addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
