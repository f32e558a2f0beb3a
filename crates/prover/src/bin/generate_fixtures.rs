//! Prove the reference scenarios and write `test_fixtures.json` and
//! `test_fixtures.cairo` for the on-chain verifier tests.
//!
//! Usage: generate-fixtures [output_dir]
//!
//! Scenarios that fail are reported and skipped; the command exits non-zero
//! only when no fixture could be produced.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notepool_prover::{ArtifactStore, FixtureGenerator, ProofOrchestrator, ProverConfig, SnarkjsCli};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ProverConfig::from_env()?;
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir.clone());

    let backend = Arc::new(SnarkjsCli::new(
        config.snarkjs_program.clone(),
        config.snarkjs_args.clone(),
    ));
    let store = ArtifactStore::new(&config.artifacts_dir);
    info!(
        artifacts = %store.root().display(),
        available = ?store.available(),
        depth = config.tree_depth,
        "generating fixtures"
    );

    let orchestrator = ProofOrchestrator::new(store, backend.clone(), backend);
    let generator = FixtureGenerator::new(&orchestrator, config.tree_depth)?;
    let report = generator.generate_all();

    for failure in &report.failures {
        warn!(fixture = %failure.name, error = %failure.error, "skipped");
    }
    if report.fixtures.is_empty() {
        bail!("no fixtures generated");
    }

    let (json_path, source_path) = report.write_outputs(&output_dir, Utc::now())?;
    println!("Fixtures saved to: {}", json_path.display());
    println!("Cairo constants saved to: {}", source_path.display());
    Ok(())
}
