//! Notes and LP positions as held by their owner.

use ark_bn254::Fr;
use ark_std::UniformRand;
use serde::{Deserialize, Serialize};

use crate::commitment::{derive_note_commitment, derive_position_commitment};
use crate::field::FieldElement;
use crate::poseidon::FieldHasher;

/// A private note. Only its commitment is ever published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub secret: FieldElement,
    pub nullifier: FieldElement,
    pub amount: u128,
}

impl Note {
    pub fn new(secret: FieldElement, nullifier: FieldElement, amount: u128) -> Self {
        Self {
            secret,
            nullifier,
            amount,
        }
    }

    /// Fresh note with a uniformly random secret and nullifier.
    pub fn random(amount: u128) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            secret: FieldElement::from(Fr::rand(&mut rng)),
            nullifier: FieldElement::from(Fr::rand(&mut rng)),
            amount,
        }
    }

    pub fn commitment<H: FieldHasher + ?Sized>(&self, hasher: &H) -> FieldElement {
        derive_note_commitment(
            hasher,
            self.secret,
            self.nullifier,
            FieldElement::from(self.amount),
        )
    }
}

/// A concentrated-liquidity position bound to a secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub secret: FieldElement,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl Position {
    pub fn new(secret: FieldElement, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            secret,
            tick_lower,
            tick_upper,
        }
    }

    pub fn commitment<H: FieldHasher + ?Sized>(&self, hasher: &H) -> FieldElement {
        derive_position_commitment(hasher, self.secret, self.tick_lower, self.tick_upper)
    }
}
