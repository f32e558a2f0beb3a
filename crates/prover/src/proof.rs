//! Groth16 proofs and verification keys in the JSON layout snarkjs uses.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{Num, One, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use notepool_circuits::FieldElement;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid scalar literal {0:?}")]
pub struct ParseScalarError(pub String);

/// A non-negative integer as it appears in snarkjs JSON.
///
/// Curve coordinates live in the base field, which is wider than the scalar
/// field, so they are not [`FieldElement`]s.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Scalar(BigUint);

impl Scalar {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(BigUint::one())
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for Scalar {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<&FieldElement> for Scalar {
    fn from(value: &FieldElement) -> Self {
        Self(value.to_biguint())
    }
}

impl FromStr for Scalar {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => BigUint::from_str_radix(hex, 16),
            None => BigUint::from_str_radix(trimmed, 10),
        };
        parsed
            .map(Self)
            .map_err(|_| ParseScalarError(s.to_string()))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self.0)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> de::Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Scalar::from(v))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn groth16() -> String {
    "groth16".to_string()
}

fn bn128() -> String {
    "bn128".to_string()
}

/// A Groth16 proof over BN254 with projective coordinates, as snarkjs
/// writes it. `pi_b` holds `[[x.c0, x.c1], [y.c0, y.c1], [z.c0, z.c1]]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: [Scalar; 3],
    pub pi_b: [[Scalar; 2]; 3],
    pub pi_c: [Scalar; 3],
    #[serde(default = "groth16")]
    pub protocol: String,
    #[serde(default = "bn128")]
    pub curve: String,
}

/// snarkjs verification key JSON. Unknown members such as
/// `vk_alphabeta_12` are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyingKeyJson {
    #[serde(default = "groth16")]
    pub protocol: String,
    #[serde(default = "bn128")]
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: [Scalar; 3],
    pub vk_beta_2: [[Scalar; 2]; 3],
    pub vk_gamma_2: [[Scalar; 2]; 3],
    pub vk_delta_2: [[Scalar; 2]; 3],
    #[serde(rename = "IC")]
    pub ic: Vec<[Scalar; 3]>,
}

/// What the proving backend hands back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResult {
    pub proof: Groth16Proof,
    #[serde(rename = "publicSignals")]
    pub public_signals: Vec<FieldElement>,
}
