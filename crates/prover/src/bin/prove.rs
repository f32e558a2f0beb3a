//! Prove one circuit input, verify it, and save the proof with calldata.
//!
//! Usage: prove <circuit> <input.json>
//!
//! Configuration comes from `NOTEPOOL_*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notepool_circuits::{CircuitInput, CircuitKind};
use notepool_prover::{
    prove_with_timeout, ArtifactStore, ProofArtifact, ProofOrchestrator, ProverConfig, SnarkjsCli,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [circuit, input_file] = args.as_slice() else {
        eprintln!("Usage: prove <circuit> <input.json>");
        eprintln!("Circuits: {}", CircuitKind::ALL.map(|k| k.as_str()).join(", "));
        std::process::exit(1);
    };

    let kind: CircuitKind = circuit.parse()?;
    let input_path = PathBuf::from(input_file);
    let text = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", input_path.display()))?;
    let input = CircuitInput::from_signals(kind, &value)?;

    let config = ProverConfig::from_env()?;
    let backend = Arc::new(SnarkjsCli::new(
        config.snarkjs_program.clone(),
        config.snarkjs_args.clone(),
    ));
    let orchestrator = Arc::new(ProofOrchestrator::new(
        ArtifactStore::new(&config.artifacts_dir),
        backend.clone(),
        backend,
    ));

    info!(circuit = %kind, "generating proof");
    let result = prove_with_timeout(orchestrator.clone(), input, config.prove_timeout).await?;
    info!(public_signals = ?result.public_signals, "proof generated");

    let valid = orchestrator.verify(kind, &result.proof, &result.public_signals)?;
    if valid {
        info!("local verification passed");
    } else {
        warn!("local verification failed");
    }

    let artifact = ProofArtifact::new(kind, &result, Utc::now());
    let path = artifact.write_to(&config.output_dir)?;
    println!("Proof saved to: {}", path.display());

    if !valid {
        bail!("{kind} proof did not verify");
    }
    Ok(())
}
