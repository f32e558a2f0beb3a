//! Fixed-depth Merkle accumulator over note commitments.
//!
//! This module provides:
//! - Batch construction of the tree from an ordered list of leaves
//! - Inclusion proofs (sibling path + side bits)
//! - The canonical empty-tree root
//! - Proof replay, mirroring what the membership circuits enforce

mod proof;
mod tree;


pub use proof::MerkleProof;
pub use tree::{empty_root, zero_hashes, MerkleError, MerkleTree, MAX_DEPTH, TREE_DEPTH};
