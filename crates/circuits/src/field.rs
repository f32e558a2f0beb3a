//! BN254 scalar field elements and bit masking.
//!
//! Every value that is hashed, stored in the accumulator or handed to a
//! circuit passes through [`FieldElement`], which keeps it canonically
//! reduced modulo the scalar field prime.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::BigUint;
use num_traits::{Num, One};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Bit width the circuits range-check commitments against.
pub const MASK_BITS: u32 = 250;

/// Errors when parsing a field element literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("empty field element literal")]
    Empty,
    #[error("invalid field element literal {0:?}")]
    Invalid(String),
}

/// Keep the low `bits` bits of `value`.
///
/// `value` may be wider than the field; the result is always `< 2^bits`.
pub fn mask(value: &BigUint, bits: u32) -> BigUint {
    let all_ones = (BigUint::one() << bits) - BigUint::one();
    value & &all_ones
}

/// An element of the BN254 scalar field.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(Fr);

impl FieldElement {
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Reduce an integer of any width modulo the field prime.
    pub fn from_biguint(value: &BigUint) -> Self {
        Self(Fr::from_be_bytes_mod_order(&value.to_bytes_be()))
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.into_bigint().to_bytes_be())
    }

    /// Map a signed integer into the field: negatives become `p - |value|`.
    ///
    /// This is how circom reads negative decimal inputs, so values derived
    /// here agree with the witness the circuit computes.
    pub fn from_signed(value: i64) -> Self {
        let magnitude = Fr::from(value.unsigned_abs());
        if value < 0 {
            Self(-magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Keep the low `bits` bits of the canonical representative.
    pub fn mask(&self, bits: u32) -> Self {
        Self::from_biguint(&mask(&self.to_biguint(), bits))
    }

    /// 32-byte big-endian hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.into_bigint().to_bytes_be()))
    }

    pub fn inner(&self) -> Fr {
        self.0
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self(Fr::from(value))
    }
}

impl FromStr for FieldElement {
    type Err = FieldError;

    /// Accepts decimal, `0x` hex, and a leading `-` for negatives.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if digits.is_empty() {
            return Err(FieldError::Empty);
        }

        let parsed = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => BigUint::from_str_radix(hex, 16),
            None => BigUint::from_str_radix(digits, 10),
        }
        .map_err(|_| FieldError::Invalid(s.to_string()))?;

        let value = Self::from_biguint(&parsed);
        Ok(if negative { Self(-value.0) } else { value })
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_biguint())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl<'de> de::Visitor<'de> for FieldVisitor {
            type Value = FieldElement;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal or 0x-prefixed field element")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FieldElement::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FieldElement::from_signed(v))
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_drops_high_bits() {
        let value = (BigUint::one() << 251u32) + BigUint::from(7u32);
        assert_eq!(mask(&value, MASK_BITS), BigUint::from(7u32));
    }

    #[test]
    fn test_mask_bound_holds_for_wide_values() {
        let bound = BigUint::one() << MASK_BITS;
        let wide = (BigUint::one() << 300u32) - BigUint::one();
        assert!(mask(&wide, MASK_BITS) < bound);
        assert_eq!(mask(&wide, MASK_BITS), bound - BigUint::one());
    }

    #[test]
    fn test_mask_is_identity_below_bound() {
        let small = BigUint::from(123_456u32);
        assert_eq!(mask(&small, MASK_BITS), small);
    }

    #[test]
    fn test_field_mask_matches_integer_mask() {
        let fe: FieldElement = "0x3fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            .parse()
            .unwrap();
        let expected = mask(&fe.to_biguint(), MASK_BITS);
        assert_eq!(fe.mask(MASK_BITS).to_biguint(), expected);
    }

    #[test]
    fn test_parse_decimal_and_hex_agree() {
        let dec: FieldElement = "1311768467294899695".parse().unwrap();
        let hex: FieldElement = "0x1234567890abcdef".parse().unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec, FieldElement::from(0x1234567890abcdefu64));
    }

    #[test]
    fn test_modulus_reduces_to_zero() {
        let p = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
        let fe: FieldElement = p.parse().unwrap();
        assert!(fe.is_zero());
    }

    #[test]
    fn test_signed_mapping() {
        let neg = FieldElement::from_signed(-600);
        let pos = FieldElement::from_signed(600);
        assert_eq!(FieldElement::from(neg.inner() + pos.inner()), FieldElement::zero());

        let p = BigUint::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap();
        assert_eq!(neg.to_biguint(), p - BigUint::from(600u32));
        assert_eq!("-600".parse::<FieldElement>().unwrap(), neg);
    }

    #[test]
    fn test_invalid_literals() {
        assert_eq!("".parse::<FieldElement>(), Err(FieldError::Empty));
        assert!(matches!(
            "12ab".parse::<FieldElement>(),
            Err(FieldError::Invalid(_))
        ));
        assert!("0xzz".parse::<FieldElement>().is_err());
    }

    #[test]
    fn test_hex_is_fixed_width() {
        let hex = FieldElement::from(255u64).to_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.ends_with("ff"));
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let fe = FieldElement::from(1_000_000u64);
        let json = serde_json::to_string(&fe).unwrap();
        assert_eq!(json, "\"1000000\"");

        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fe);

        let from_number: FieldElement = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, FieldElement::from(42u64));
    }
}
