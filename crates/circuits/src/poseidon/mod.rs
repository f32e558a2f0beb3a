//! Two-to-one hashing over the BN254 scalar field.
//!
//! Commitments and Merkle nodes are both built from a single primitive,
//! `hash2(left, right)`. The trait keeps that primitive swappable; the
//! deployed circuits and contracts use circomlib's Poseidon, provided by
//! [`CircomPoseidon`].

mod circom;


pub use circom::{CircomPoseidon, HashError};

use crate::field::FieldElement;

/// A fixed-arity, deterministic hash of two field elements.
pub trait FieldHasher: Send + Sync {
    fn hash2(&self, left: FieldElement, right: FieldElement) -> FieldElement;
}

impl<H: FieldHasher + ?Sized> FieldHasher for &H {
    fn hash2(&self, left: FieldElement, right: FieldElement) -> FieldElement {
        (**self).hash2(left, right)
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for std::sync::Arc<H> {
    fn hash2(&self, left: FieldElement, right: FieldElement) -> FieldElement {
        (**self).hash2(left, right)
    }
}
