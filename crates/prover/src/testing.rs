//! A real Groth16 backend over a one-constraint circuit, for tests.
//!
//! The circuit proves knowledge of `a, b` with `a * b = c` and exposes `c`.
//! [`TestBackend`] proves `a = root, b = 1`, so every proof's single public
//! signal is the input's `root`.

use std::path::Path;

use ark_bn254::{Bn254, Fr};
use ark_ff::One;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_relations::lc;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;

use notepool_circuits::{CircuitKind, FieldElement};

use crate::artifacts::{ArtifactStore, CircuitArtifacts};
use crate::backend::{BackendError, Groth16Prover};
use crate::proof::{Groth16Proof, ProofResult, VerifyingKeyJson};

#[derive(Clone)]
struct MulCircuit {
    a: Option<Fr>,
    b: Option<Fr>,
}

impl ConstraintSynthesizer<Fr> for MulCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let a = cs.new_witness_variable(|| self.a.ok_or(SynthesisError::AssignmentMissing))?;
        let b = cs.new_witness_variable(|| self.b.ok_or(SynthesisError::AssignmentMissing))?;
        let c = cs.new_input_variable(|| {
            let a = self.a.ok_or(SynthesisError::AssignmentMissing)?;
            let b = self.b.ok_or(SynthesisError::AssignmentMissing)?;
            Ok(a * b)
        })?;
        cs.enforce_constraint(lc!() + a, lc!() + b, lc!() + c)?;
        Ok(())
    }
}

pub(crate) struct TestBackend {
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
    fail_on: Option<CircuitKind>,
}

impl TestBackend {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(42);
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(
            MulCircuit { a: None, b: None },
            &mut rng,
        )
        .unwrap();
        Self {
            pk,
            vk,
            fail_on: None,
        }
    }

    /// Proving `kind` fails the way an unsatisfied circuit does.
    pub fn failing_on(mut self, kind: CircuitKind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    pub fn vk_json(&self) -> VerifyingKeyJson {
        VerifyingKeyJson::from_ark(&self.vk)
    }

    pub fn prove_value(&self, value: FieldElement) -> (Groth16Proof, Vec<FieldElement>) {
        let mut rng = StdRng::seed_from_u64(7);
        let circuit = MulCircuit {
            a: Some(value.inner()),
            b: Some(Fr::one()),
        };
        let proof = Groth16::<Bn254>::prove(&self.pk, circuit, &mut rng).unwrap();
        (Groth16Proof::from_ark(&proof), vec![value])
    }

    /// Lay out stub circuit files and this backend's verification key.
    pub fn install(&self, root: &Path, kinds: &[CircuitKind]) -> ArtifactStore {
        let store = ArtifactStore::new(root);
        for &kind in kinds {
            let paths = store.paths(kind);
            std::fs::create_dir_all(paths.wasm.parent().unwrap()).unwrap();
            std::fs::write(&paths.wasm, b"wasm").unwrap();
            std::fs::write(&paths.zkey, b"zkey").unwrap();
            std::fs::write(
                &paths.verification_key,
                serde_json::to_vec(&self.vk_json()).unwrap(),
            )
            .unwrap();
        }
        store
    }
}

impl Groth16Prover for TestBackend {
    fn full_prove(
        &self,
        input: &Value,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofResult, BackendError> {
        if self.fail_on == Some(artifacts.kind) {
            return Err(BackendError::Failed {
                program: "test-prover".to_string(),
                status: "exit status: 1".to_string(),
                detail: format!("Assert Failed. Error in template {}", artifacts.kind),
            });
        }

        let root: FieldElement = input["root"]
            .as_str()
            .ok_or_else(|| BackendError::Malformed("input has no root".to_string()))?
            .parse()
            .map_err(|e| BackendError::Malformed(format!("{e}")))?;
        let (proof, public_signals) = self.prove_value(root);
        Ok(ProofResult {
            proof,
            public_signals,
        })
    }
}
