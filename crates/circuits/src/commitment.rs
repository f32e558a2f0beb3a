//! Note and position commitments.
//!
//! note_commitment     = Mask250(H(Mask250(H(secret, nullifier)), amount))
//! position_commitment = Mask250(H(secret, tick_lower + tick_upper))
//!
//! Masking after every hash keeps each intermediate inside the 250-bit range
//! the circuits and the on-chain contract check against.

use crate::field::{FieldElement, MASK_BITS};
use crate::poseidon::FieldHasher;

/// Derive the commitment stored in the accumulator for a note.
pub fn derive_note_commitment<H: FieldHasher + ?Sized>(
    hasher: &H,
    secret: FieldElement,
    nullifier: FieldElement,
    amount: FieldElement,
) -> FieldElement {
    let inner = hasher.hash2(secret, nullifier).mask(MASK_BITS);
    hasher.hash2(inner, amount).mask(MASK_BITS)
}

/// Derive the identity of an LP position.
///
/// The tick sum is computed in `i64` (two `i32` ticks cannot overflow it)
/// and mapped to `p - |sum|` when negative.
pub fn derive_position_commitment<H: FieldHasher + ?Sized>(
    hasher: &H,
    secret: FieldElement,
    tick_lower: i32,
    tick_upper: i32,
) -> FieldElement {
    let tick_sum = i64::from(tick_lower) + i64::from(tick_upper);
    hasher
        .hash2(secret, FieldElement::from_signed(tick_sum))
        .mask(MASK_BITS)
}
