//! circomlib-compatible Poseidon (t = 3, x^5 S-box).

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonError, PoseidonHasher};
use thiserror::Error;

use super::FieldHasher;
use crate::field::FieldElement;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Poseidon parameters unavailable: {0}")]
    Parameters(#[from] PoseidonError),
}

/// Poseidon with the circom parameter set for two inputs.
#[derive(Clone, Copy, Debug)]
pub struct CircomPoseidon {
    _checked: (),
}

impl CircomPoseidon {
    /// Check that the parameter set loads. Safe to call repeatedly; the
    /// resulting hasher behaves identically however often it is built.
    pub fn new() -> Result<Self, HashError> {
        Poseidon::<Fr>::new_circom(2)?;
        Ok(Self { _checked: () })
    }
}

impl FieldHasher for CircomPoseidon {
    fn hash2(&self, left: FieldElement, right: FieldElement) -> FieldElement {
        // Parameters were validated in `new`, and two inputs always match width 3.
        let mut poseidon =
            Poseidon::<Fr>::new_circom(2).expect("circom parameters validated in new()");
        let digest = poseidon
            .hash(&[left.inner(), right.inner()])
            .expect("two inputs match the width-3 permutation");
        FieldElement::from(digest)
    }
}
