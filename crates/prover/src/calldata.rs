//! Flattening proofs into the scalar sequence the on-chain verifier reads.
//!
//! Order: `pi_a` (x, y), `pi_b` (x.c0, x.c1, y.c0, y.c1), `pi_c` (x, y),
//! then every public signal. The verifier contract depends on this order.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::info;

use notepool_circuits::{CircuitKind, FieldElement};

use crate::proof::{Groth16Proof, ProofResult, Scalar};
use crate::prove::ProveError;

/// Scalars taken from the proof itself, ahead of the public signals.
pub const PROOF_SCALARS: usize = 8;

const PROOF_LABELS: [&str; PROOF_SCALARS] = [
    "PI_A_X", "PI_A_Y", "PI_B_X1", "PI_B_X2", "PI_B_Y1", "PI_B_Y2", "PI_C_X", "PI_C_Y",
];

pub fn to_chain_calldata(proof: &Groth16Proof, public_signals: &[FieldElement]) -> Vec<BigUint> {
    let mut calldata = Vec::with_capacity(PROOF_SCALARS + public_signals.len());
    let proof_scalars = [
        &proof.pi_a[0],
        &proof.pi_a[1],
        &proof.pi_b[0][0],
        &proof.pi_b[0][1],
        &proof.pi_b[1][0],
        &proof.pi_b[1][1],
        &proof.pi_c[0],
        &proof.pi_c[1],
    ];
    calldata.extend(proof_scalars.into_iter().map(|s| s.as_biguint().clone()));
    calldata.extend(public_signals.iter().map(FieldElement::to_biguint));
    calldata
}

/// Constant-style names for each calldata position.
pub fn calldata_labels(public_signals: usize) -> Vec<String> {
    PROOF_LABELS
        .iter()
        .map(|label| label.to_string())
        .chain((0..public_signals).map(|i| format!("PUBLIC_{i}")))
        .collect()
}

/// A single proving run, as written to disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    pub circuit: CircuitKind,
    pub proof: Groth16Proof,
    pub public_signals: Vec<FieldElement>,
    pub calldata: Vec<Scalar>,
    /// Unix milliseconds
    pub timestamp: i64,
}

impl ProofArtifact {
    pub fn new(circuit: CircuitKind, result: &ProofResult, at: DateTime<Utc>) -> Self {
        Self {
            circuit,
            proof: result.proof.clone(),
            public_signals: result.public_signals.clone(),
            calldata: to_chain_calldata(&result.proof, &result.public_signals)
                .into_iter()
                .map(Scalar::new)
                .collect(),
            timestamp: at.timestamp_millis(),
        }
    }

    /// `<circuit>_proof_<timestamp>.json`
    pub fn file_name(&self) -> String {
        format!("{}_proof_{}.json", self.circuit, self.timestamp)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ProveError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        info!(circuit = %self.circuit, path = %path.display(), "proof written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn proof() -> Groth16Proof {
        serde_json::from_value(json!({
            "pi_a": ["1", "2", "1"],
            "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
            "pi_c": ["7", "8", "1"],
        }))
        .unwrap()
    }

    #[test]
    fn test_fixed_order() {
        let signals = [FieldElement::from(9u64), FieldElement::from(10u64)];
        let calldata = to_chain_calldata(&proof(), &signals);

        let expected: Vec<BigUint> = (1u32..=10).map(BigUint::from).collect();
        assert_eq!(calldata, expected);
    }

    #[test]
    fn test_length_is_eight_plus_signals() {
        for n in [0usize, 1, 7] {
            let signals = vec![FieldElement::from(3u64); n];
            assert_eq!(to_chain_calldata(&proof(), &signals).len(), PROOF_SCALARS + n);
            assert_eq!(calldata_labels(n).len(), PROOF_SCALARS + n);
        }
    }

    #[test]
    fn test_projective_coordinates_dropped() {
        let calldata = to_chain_calldata(&proof(), &[]);
        // neither pi_a's z nor pi_b's third row appear
        assert!(!calldata[..2].contains(&BigUint::from(0u32)));
        assert_eq!(calldata[6], BigUint::from(7u32));
    }

    #[test]
    fn test_labels() {
        let labels = calldata_labels(2);
        assert_eq!(labels[0], "PI_A_X");
        assert_eq!(labels[5], "PI_B_Y2");
        assert_eq!(labels[7], "PI_C_Y");
        assert_eq!(labels[9], "PUBLIC_1");
    }

    #[test]
    fn test_artifact_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProofResult {
            proof: proof(),
            public_signals: vec![FieldElement::from(42u64)],
        };
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let artifact = ProofArtifact::new(CircuitKind::Withdraw, &result, at);

        assert_eq!(artifact.file_name(), "withdraw_proof_1700000000123.json");
        let path = artifact.write_to(&dir.path().join("proofs")).unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(written["circuit"], "withdraw");
        assert_eq!(written["publicSignals"], json!(["42"]));
        assert_eq!(written["calldata"].as_array().unwrap().len(), 9);
        assert_eq!(written["calldata"][8], "42");
        assert_eq!(written["timestamp"], 1_700_000_000_123i64);
    }
}
