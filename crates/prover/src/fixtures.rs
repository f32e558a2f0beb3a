//! Test fixtures for downstream verifier tests.
//!
//! A fixture is one proven scenario: its input, proof, public signals and
//! calldata. The generator proves the reference scenarios one by one; a
//! failing scenario is recorded and the rest still run.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use notepool_circuits::{
    CircomPoseidon, CircuitInput, CircuitKind, FieldElement, HashError, InclusionWitness,
    LpInput, LpParams, MembershipInput, MerkleError, MerkleTree, Note, SwapInput, SwapParams,
    WithdrawInput,
};

use crate::backend::{Groth16Prover, Groth16Verifier};
use crate::calldata::{calldata_labels, to_chain_calldata, PROOF_SCALARS};
use crate::proof::{Groth16Proof, ProofResult, Scalar};
use crate::prove::{ProofOrchestrator, ProofStage, ProveError};

pub const FIXTURES_JSON: &str = "test_fixtures.json";
pub const FIXTURES_SOURCE: &str = "test_fixtures.cairo";

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error("{0} scenario amounts underflow")]
    AmountUnderflow(CircuitKind),
    #[error("{circuit} proof failed: {reason}")]
    Failed { circuit: CircuitKind, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Values shared by the reference scenarios.
pub mod reference {
    use super::*;

    pub const SECRET_IN: u64 = 123;
    pub const NULLIFIER: u64 = 456;
    pub const AMOUNT: u128 = 1_000_000;
    pub const SECRET_OUT: u64 = 789;
    pub const NULLIFIER_OUT: u64 = 101_112;
    pub const RECIPIENT: u64 = 0x1234_5678_90ab_cdef;

    /// 2^128, i.e. a price of 1.0 in Q128
    pub const SQRT_PRICE_OLD: &str = "340282366920938463463374607431768211456";
    pub const SQRT_PRICE_NEW: &str = "340000000000000000000000000000000000000";

    pub fn spent_note() -> Note {
        Note::new(SECRET_IN.into(), NULLIFIER.into(), AMOUNT)
    }

    pub fn lp_params() -> LpParams {
        LpParams {
            tick_lower: -600,
            tick_upper: 600,
            liquidity: 500_000,
        }
    }

    pub fn swap_params() -> SwapParams {
        SwapParams {
            amount_specified: 100_000,
            zero_for_one: true,
            amount0_delta: 100_000,
            // about 1% fee
            amount1_delta: 99_000,
            sqrt_price_old: price(SQRT_PRICE_OLD),
            new_sqrt_price_x128: price(SQRT_PRICE_NEW),
            new_tick: -1,
            liquidity: 1_000_000,
        }
    }

    fn price(decimal: &str) -> FieldElement {
        // both literals are well below the field modulus
        decimal.parse().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub name: String,
    pub input: Value,
    pub proof: Groth16Proof,
    pub public_signals: Vec<FieldElement>,
    pub calldata: Vec<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl Fixture {
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }
}

/// Snapshot an already computed proof. No proving happens here.
pub fn to_fixture(name: &str, input: &CircuitInput, result: &ProofResult) -> Fixture {
    Fixture {
        name: name.to_string(),
        input: input.to_signals(),
        proof: result.proof.clone(),
        public_signals: result.public_signals.clone(),
        calldata: to_chain_calldata(&result.proof, &result.public_signals)
            .into_iter()
            .map(Scalar::new)
            .collect(),
        verified: None,
    }
}

/// Render fixtures as Cairo constants, one per calldata element, in
/// calldata order, plus a function returning each fixture's calldata.
pub fn render_source_constants(fixtures: &[Fixture], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("// Auto-generated test fixtures for E2E proof verification\n");
    out.push_str("// Generated by: notepool-prover generate-fixtures\n");
    let _ = writeln!(
        out,
        "// Generated at: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );

    for fixture in fixtures {
        let prefix = constant_prefix(&fixture.name);
        let labels = calldata_labels(fixture.calldata.len().saturating_sub(PROOF_SCALARS));
        let names: Vec<String> = labels
            .iter()
            .map(|label| format!("{prefix}_{label}"))
            .collect();

        let _ = writeln!(out);
        let _ = writeln!(out, "// ==================== {prefix} FIXTURE ====================");
        out.push_str("// Proof components (pi_a, pi_b, pi_c)\n");
        for (i, (name, value)) in names.iter().zip(&fixture.calldata).enumerate() {
            if i == PROOF_SCALARS {
                out.push_str("\n// Public signals\n");
            }
            let _ = writeln!(out, "const {name}: felt252 = {value};");
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "fn {}_calldata() -> Array<felt252> {{",
            prefix.to_ascii_lowercase()
        );
        let _ = writeln!(out, "    array![{}]", names.join(", "));
        out.push_str("}\n");
    }
    out
}

fn constant_prefix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FixtureFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of a generation batch.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FixtureReport {
    pub fixtures: Vec<Fixture>,
    pub failures: Vec<FixtureFailure>,
}

impl FixtureReport {
    /// Write `test_fixtures.json` and `test_fixtures.cairo` under `dir`.
    pub fn write_outputs(
        &self,
        dir: &Path,
        generated_at: DateTime<Utc>,
    ) -> Result<(PathBuf, PathBuf), FixtureError> {
        std::fs::create_dir_all(dir)?;

        let json_path = dir.join(FIXTURES_JSON);
        std::fs::write(&json_path, serde_json::to_vec_pretty(&self.fixtures)?)?;

        let source_path = dir.join(FIXTURES_SOURCE);
        std::fs::write(
            &source_path,
            render_source_constants(&self.fixtures, generated_at),
        )?;

        info!(
            fixtures = self.fixtures.len(),
            failures = self.failures.len(),
            dir = %dir.display(),
            "fixtures written"
        );
        Ok((json_path, source_path))
    }
}

/// Proves the reference scenarios at a given tree depth.
pub struct FixtureGenerator<'a, P, V> {
    orchestrator: &'a ProofOrchestrator<P, V>,
    hasher: CircomPoseidon,
    depth: u32,
}

impl<'a, P: Groth16Prover, V: Groth16Verifier> FixtureGenerator<'a, P, V> {
    /// Scenario order matches the fixture file layout.
    pub const SCENARIOS: [CircuitKind; 4] = [
        CircuitKind::Membership,
        CircuitKind::Withdraw,
        CircuitKind::Lp,
        CircuitKind::Swap,
    ];

    pub fn new(orchestrator: &'a ProofOrchestrator<P, V>, depth: u32) -> Result<Self, FixtureError> {
        Ok(Self {
            orchestrator,
            hasher: CircomPoseidon::new()?,
            depth,
        })
    }

    /// The spent note alone in a fresh tree, proven at index 0.
    fn witness(&self, note: &Note) -> Result<InclusionWitness, FixtureError> {
        let tree = MerkleTree::build(&self.hasher, &[note.commitment(&self.hasher)], self.depth)?;
        Ok(InclusionWitness::from_tree(&tree, 0)?)
    }

    pub fn scenario_input(&self, kind: CircuitKind) -> Result<CircuitInput, FixtureError> {
        let h = &self.hasher;
        let spent = reference::spent_note();
        let witness = self.witness(&spent)?;
        let output_note = |amount: u128| {
            Note::new(
                reference::SECRET_OUT.into(),
                reference::NULLIFIER_OUT.into(),
                amount,
            )
        };

        Ok(match kind {
            CircuitKind::Membership => MembershipInput::assemble(h, &spent, &witness).into(),
            CircuitKind::Withdraw => {
                WithdrawInput::assemble(&spent, &witness, reference::RECIPIENT.into()).into()
            }
            CircuitKind::Lp => {
                let params = reference::lp_params();
                let change = params
                    .change_amount(spent.amount)
                    .ok_or(FixtureError::AmountUnderflow(kind))?;
                LpInput::assemble(h, &spent, &witness, &params, &output_note(change)).into()
            }
            CircuitKind::Swap => {
                let params = reference::swap_params();
                let out = params
                    .output_amount(spent.amount)
                    .ok_or(FixtureError::AmountUnderflow(kind))?;
                SwapInput::assemble(h, &spent, &witness, &params, &output_note(out)).into()
            }
        })
    }

    /// Prove and verify one scenario.
    pub fn generate(&self, kind: CircuitKind) -> Result<Fixture, FixtureError> {
        let input = self.scenario_input(kind)?;
        let request = self.orchestrator.prove_and_verify(&input)?;

        if let ProofStage::Failed(reason) = request.stage() {
            return Err(FixtureError::Failed {
                circuit: kind,
                reason: reason.clone(),
            });
        }

        let verified = request.is_accepted();
        let result = request.into_result().ok_or_else(|| FixtureError::Failed {
            circuit: kind,
            reason: "no proof produced".to_string(),
        })?;
        Ok(to_fixture(kind.as_str(), &input, &result).with_verified(verified))
    }

    /// Run every scenario; failures are collected, never propagated.
    pub fn generate_all(&self) -> FixtureReport {
        let mut report = FixtureReport::default();
        for kind in Self::SCENARIOS {
            match self.generate(kind) {
                Ok(fixture) => {
                    info!(circuit = %kind, verified = ?fixture.verified, "fixture generated");
                    report.fixtures.push(fixture);
                }
                Err(e) => {
                    warn!(circuit = %kind, error = %e, "fixture failed");
                    report.failures.push(FixtureFailure {
                        name: kind.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBackend;
    use crate::verify::NativeVerifier;
    use chrono::TimeZone;

    const DEPTH: u32 = 3;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn orchestrator(
        dir: &Path,
        backend: TestBackend,
        kinds: &[CircuitKind],
    ) -> ProofOrchestrator<TestBackend, NativeVerifier> {
        let store = backend.install(dir, kinds);
        ProofOrchestrator::new(store, backend, NativeVerifier)
    }

    #[test]
    fn test_all_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), TestBackend::new(), &CircuitKind::ALL);
        let generator = FixtureGenerator::new(&orch, DEPTH).unwrap();

        let report = generator.generate_all();
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        let names: Vec<&str> = report.fixtures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["membership", "withdraw", "lp", "swap"]);

        for fixture in &report.fixtures {
            assert_eq!(fixture.verified, Some(true));
            assert_eq!(fixture.calldata.len(), PROOF_SCALARS + fixture.public_signals.len());
        }
    }

    #[test]
    fn test_scenario_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), TestBackend::new(), &[]);
        let generator = FixtureGenerator::new(&orch, DEPTH).unwrap();

        let lp = generator.scenario_input(CircuitKind::Lp).unwrap().to_signals();
        assert_eq!(lp["amount_out"], "500000");
        assert_eq!(lp["tick_lower"], "-600");

        let swap = generator.scenario_input(CircuitKind::Swap).unwrap().to_signals();
        assert_eq!(swap["amount_out"], "999000");
        assert_eq!(swap["new_tick"], "-1");
        assert_eq!(swap["pathIndices"].as_array().unwrap().len(), DEPTH as usize);

        let withdraw = generator.scenario_input(CircuitKind::Withdraw).unwrap().to_signals();
        assert_eq!(withdraw["recipient"], "1311768467294899695");
    }

    #[test]
    fn test_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(
            dir.path(),
            TestBackend::new().failing_on(CircuitKind::Swap),
            &CircuitKind::ALL,
        );
        let generator = FixtureGenerator::new(&orch, DEPTH).unwrap();

        let report = generator.generate_all();
        assert_eq!(report.fixtures.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "swap");
        assert!(report.failures[0].error.contains("Assert Failed"));
    }

    #[test]
    fn test_missing_artifacts_recorded_per_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(
            dir.path(),
            TestBackend::new(),
            &[CircuitKind::Membership, CircuitKind::Withdraw],
        );
        let generator = FixtureGenerator::new(&orch, DEPTH).unwrap();

        let report = generator.generate_all();
        assert_eq!(report.fixtures.len(), 2);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, ["lp", "swap"]);
        assert!(report.failures[0].error.contains("not found"));
    }

    #[test]
    fn test_to_fixture_is_pure_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), TestBackend::new(), &[]);
        let generator = FixtureGenerator::new(&orch, DEPTH).unwrap();
        let input = generator.scenario_input(CircuitKind::Membership).unwrap();

        let (proof, public_signals) = TestBackend::new().prove_value(input.root());
        let result = ProofResult {
            proof,
            public_signals,
        };
        let fixture = to_fixture("membership", &input, &result);

        assert_eq!(fixture.input, input.to_signals());
        assert_eq!(fixture.verified, None);
        assert_eq!(fixture.calldata[8], Scalar::from(&input.root()));
        assert_eq!(fixture, to_fixture("membership", &input, &result));
    }

    fn sample_fixture(name: &str, signals: u64) -> Fixture {
        Fixture {
            name: name.to_string(),
            input: Value::Null,
            proof: serde_json::from_value(serde_json::json!({
                "pi_a": ["1", "2", "1"],
                "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
                "pi_c": ["7", "8", "1"],
            }))
            .unwrap(),
            public_signals: (0..signals).map(|i| FieldElement::from(100 + i)).collect(),
            calldata: (1..=8)
                .chain(100..100 + signals)
                .map(Scalar::from)
                .collect(),
            verified: Some(true),
        }
    }

    #[test]
    fn test_render_source_constants() {
        let text = render_source_constants(&[sample_fixture("membership", 2)], generated_at());

        assert!(text.starts_with("// Auto-generated test fixtures"));
        assert!(text.contains("// Generated at: 2026-01-02T03:04:05.000Z"));
        assert!(text.contains("// ==================== MEMBERSHIP FIXTURE ===================="));
        assert!(text.contains("const MEMBERSHIP_PI_A_X: felt252 = 1;"));
        assert!(text.contains("const MEMBERSHIP_PI_B_Y2: felt252 = 6;"));
        assert!(text.contains("const MEMBERSHIP_PI_C_Y: felt252 = 8;"));
        assert!(text.contains("const MEMBERSHIP_PUBLIC_1: felt252 = 101;"));
        assert!(text.contains("fn membership_calldata() -> Array<felt252> {"));

        // constants appear in calldata order
        let a = text.find("MEMBERSHIP_PI_B_X1:").unwrap();
        let b = text.find("MEMBERSHIP_PI_C_X:").unwrap();
        let c = text.find("MEMBERSHIP_PUBLIC_0:").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_render_is_deterministic_and_prefixes_names() {
        let fixtures = [sample_fixture("membership", 1), sample_fixture("lp-v2", 1)];
        let first = render_source_constants(&fixtures, generated_at());
        assert_eq!(first, render_source_constants(&fixtures, generated_at()));
        assert!(first.contains("const LP_V2_PUBLIC_0: felt252 = 100;"));
        assert!(first.contains("const MEMBERSHIP_PUBLIC_0: felt252 = 100;"));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let report = FixtureReport {
            fixtures: vec![sample_fixture("withdraw", 1)],
            failures: vec![],
        };

        let out = dir.path().join("proofs");
        let (json_path, source_path) = report.write_outputs(&out, generated_at()).unwrap();
        assert_eq!(json_path, out.join(FIXTURES_JSON));

        let written: Vec<Fixture> =
            serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
        assert_eq!(written, report.fixtures);

        let source = std::fs::read_to_string(source_path).unwrap();
        assert!(source.contains("WITHDRAW_PUBLIC_0"));
    }
}
