//! In-process Groth16 verification over BN254.
//!
//! snarkjs JSON is converted to arkworks types. Coordinates must be
//! canonical base field elements, points must be normalised (`z = 1`, or the
//! point at infinity) and on the curve in the prime-order subgroup.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::debug;

use notepool_circuits::FieldElement;

use crate::backend::{BackendError, Groth16Verifier};
use crate::proof::{Groth16Proof, Scalar, VerifyingKeyJson};

/// Verifies snarkjs proofs with `ark-groth16`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeVerifier;

impl Groth16Verifier for NativeVerifier {
    fn verify(
        &self,
        vk: &VerifyingKeyJson,
        public_signals: &[FieldElement],
        proof: &Groth16Proof,
    ) -> Result<bool, BackendError> {
        let vk = vk.to_ark()?;
        let proof = proof.to_ark()?;

        if public_signals.len() + 1 != vk.gamma_abc_g1.len() {
            return Err(BackendError::Malformed(format!(
                "verification key expects {} public signals, got {}",
                vk.gamma_abc_g1.len().saturating_sub(1),
                public_signals.len()
            )));
        }

        let inputs: Vec<Fr> = public_signals.iter().map(FieldElement::inner).collect();
        let valid = Groth16::<Bn254>::verify(&vk, &inputs, &proof)
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        debug!(valid, signals = inputs.len(), "native groth16 verification");
        Ok(valid)
    }
}

impl Groth16Proof {
    pub fn from_ark(proof: &Proof<Bn254>) -> Self {
        Self {
            pi_a: g1_to_json(&proof.a),
            pi_b: g2_to_json(&proof.b),
            pi_c: g1_to_json(&proof.c),
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
        }
    }

    pub fn to_ark(&self) -> Result<Proof<Bn254>, BackendError> {
        Ok(Proof {
            a: g1_from_json(&self.pi_a)?,
            b: g2_from_json(&self.pi_b)?,
            c: g1_from_json(&self.pi_c)?,
        })
    }
}

impl VerifyingKeyJson {
    pub fn from_ark(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            vk_alpha_1: g1_to_json(&vk.alpha_g1),
            vk_beta_2: g2_to_json(&vk.beta_g2),
            vk_gamma_2: g2_to_json(&vk.gamma_g2),
            vk_delta_2: g2_to_json(&vk.delta_g2),
            ic: vk.gamma_abc_g1.iter().map(g1_to_json).collect(),
        }
    }

    pub fn to_ark(&self) -> Result<VerifyingKey<Bn254>, BackendError> {
        if self.ic.len() != self.n_public + 1 {
            return Err(BackendError::Malformed(format!(
                "IC has {} points for {} public signals",
                self.ic.len(),
                self.n_public
            )));
        }
        Ok(VerifyingKey {
            alpha_g1: g1_from_json(&self.vk_alpha_1)?,
            beta_g2: g2_from_json(&self.vk_beta_2)?,
            gamma_g2: g2_from_json(&self.vk_gamma_2)?,
            delta_g2: g2_from_json(&self.vk_delta_2)?,
            gamma_abc_g1: self
                .ic
                .iter()
                .map(g1_from_json)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

fn fq_from_scalar(value: &Scalar) -> Result<Fq, BackendError> {
    let modulus: BigUint = Fq::MODULUS.into();
    if value.as_biguint() >= &modulus {
        return Err(BackendError::Malformed(format!(
            "coordinate {value} is not a base field element"
        )));
    }
    Ok(Fq::from_be_bytes_mod_order(&value.as_biguint().to_bytes_be()))
}

fn fq_to_scalar(value: &Fq) -> Scalar {
    Scalar::new(value.into_bigint().into())
}

fn fq2_from_pair(pair: &[Scalar; 2]) -> Result<Fq2, BackendError> {
    Ok(Fq2::new(fq_from_scalar(&pair[0])?, fq_from_scalar(&pair[1])?))
}

fn g1_from_json(point: &[Scalar; 3]) -> Result<G1Affine, BackendError> {
    let z = point[2].as_biguint();
    if z.is_zero() {
        return Ok(G1Affine::identity());
    }
    if !z.is_one() {
        return Err(BackendError::Malformed("G1 point is not normalised".to_string()));
    }

    let p = G1Affine::new_unchecked(fq_from_scalar(&point[0])?, fq_from_scalar(&point[1])?);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BackendError::Malformed("G1 point is not on the curve".to_string()));
    }
    Ok(p)
}

fn g2_from_json(point: &[[Scalar; 2]; 3]) -> Result<G2Affine, BackendError> {
    let [z0, z1] = &point[2];
    if z0.as_biguint().is_zero() && z1.as_biguint().is_zero() {
        return Ok(G2Affine::identity());
    }
    if !z0.as_biguint().is_one() || !z1.as_biguint().is_zero() {
        return Err(BackendError::Malformed("G2 point is not normalised".to_string()));
    }

    let p = G2Affine::new_unchecked(fq2_from_pair(&point[0])?, fq2_from_pair(&point[1])?);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BackendError::Malformed("G2 point is not on the curve".to_string()));
    }
    Ok(p)
}

fn g1_to_json(point: &G1Affine) -> [Scalar; 3] {
    if point.infinity {
        return [Scalar::zero(), Scalar::one(), Scalar::zero()];
    }
    [fq_to_scalar(&point.x), fq_to_scalar(&point.y), Scalar::one()]
}

fn g2_to_json(point: &G2Affine) -> [[Scalar; 2]; 3] {
    if point.infinity {
        return [
            [Scalar::zero(), Scalar::zero()],
            [Scalar::one(), Scalar::zero()],
            [Scalar::zero(), Scalar::zero()],
        ];
    }
    [
        [fq_to_scalar(&point.x.c0), fq_to_scalar(&point.x.c1)],
        [fq_to_scalar(&point.y.c0), fq_to_scalar(&point.y.c1)],
        [Scalar::one(), Scalar::zero()],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestBackend;

    #[test]
    fn test_accepts_valid_proof() {
        let backend = TestBackend::new();
        let (proof, signals) = backend.prove_value(FieldElement::from(1234u64));
        let vk = backend.vk_json();

        assert!(NativeVerifier.verify(&vk, &signals, &proof).unwrap());
    }

    #[test]
    fn test_rejects_wrong_public_signal() {
        let backend = TestBackend::new();
        let (proof, _) = backend.prove_value(FieldElement::from(1234u64));

        let wrong = [FieldElement::from(1235u64)];
        assert!(!NativeVerifier.verify(&backend.vk_json(), &wrong, &proof).unwrap());
    }

    #[test]
    fn test_survives_json_round_trip() {
        let backend = TestBackend::new();
        let (proof, signals) = backend.prove_value(FieldElement::from(99u64));

        let proof: Groth16Proof =
            serde_json::from_str(&serde_json::to_string(&proof).unwrap()).unwrap();
        let vk: VerifyingKeyJson =
            serde_json::from_str(&serde_json::to_string(&backend.vk_json()).unwrap()).unwrap();
        assert_eq!(vk.n_public, 1);
        assert!(NativeVerifier.verify(&vk, &signals, &proof).unwrap());
    }

    #[test]
    fn test_signal_count_mismatch_is_an_error() {
        let backend = TestBackend::new();
        let (proof, signals) = backend.prove_value(FieldElement::from(5u64));
        let mut extra = signals.clone();
        extra.push(FieldElement::from(1u64));

        assert!(matches!(
            NativeVerifier.verify(&backend.vk_json(), &extra, &proof),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_off_curve_point_is_an_error() {
        let backend = TestBackend::new();
        let (mut proof, signals) = backend.prove_value(FieldElement::from(5u64));
        proof.pi_a[1] = Scalar::from(3u64);

        assert!(matches!(
            NativeVerifier.verify(&backend.vk_json(), &signals, &proof),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_coordinate_above_modulus_is_an_error() {
        let backend = TestBackend::new();
        let (mut proof, _) = backend.prove_value(FieldElement::from(5u64));
        let modulus: BigUint = Fq::MODULUS.into();
        proof.pi_c[0] = Scalar::new(modulus);

        assert!(proof.to_ark().is_err());
    }

    #[test]
    fn test_points_round_trip_through_json() {
        let backend = TestBackend::new();
        let (proof, _) = backend.prove_value(FieldElement::from(77u64));
        let ark = proof.to_ark().unwrap();
        assert_eq!(Groth16Proof::from_ark(&ark), proof);

        let infinity = g1_to_json(&G1Affine::identity());
        assert_eq!(g1_from_json(&infinity).unwrap(), G1Affine::identity());
    }
}
