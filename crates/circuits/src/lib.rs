//! Commitments, accumulator and circuit inputs for the shielded note pool.
//!
//! This crate provides:
//! - `FieldElement`: BN254 scalar field values with 250-bit masking
//! - `CircomPoseidon`: the two-to-one hash shared with the circuits and contract
//! - Note and LP position commitments
//! - `MerkleTree`: the fixed-depth accumulator and its inclusion proofs
//! - `CircuitInput`: typed inputs for the membership, withdraw, swap and lp circuits

pub mod commitment;
pub mod field;
pub mod inputs;
pub mod kind;
pub mod merkle;
pub mod note;
pub mod poseidon;


pub use commitment::{derive_note_commitment, derive_position_commitment};
pub use field::{mask, FieldElement, FieldError, MASK_BITS};
pub use inputs::{
    CircuitInput, InclusionWitness, InputError, LpInput, LpParams, MembershipInput, SwapInput,
    SwapParams, WithdrawInput,
};
pub use kind::{CircuitKind, UnknownCircuit};
pub use merkle::{empty_root, MerkleError, MerkleProof, MerkleTree, MAX_DEPTH, TREE_DEPTH};
pub use note::{Note, Position};
pub use poseidon::{CircomPoseidon, FieldHasher, HashError};
