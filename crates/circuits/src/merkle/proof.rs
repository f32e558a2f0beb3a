//! Inclusion proofs for the Merkle accumulator.

use serde::{Deserialize, Serialize};

use crate::field::FieldElement;
use crate::poseidon::FieldHasher;

/// Siblings from leaf to root plus the side of the path node at each level.
///
/// Serialised with the circuit signal names (`pathElements`, `pathIndices`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub path_elements: Vec<FieldElement>,
    /// 0 = path node is a left child, 1 = right child
    pub path_indices: Vec<u8>,
}

impl MerkleProof {
    pub fn depth(&self) -> usize {
        self.path_elements.len()
    }

    /// Replay the path from `leaf`.
    ///
    /// Returns `None` for a malformed proof (arrays of different length or
    /// an index bit other than 0/1).
    pub fn compute_root<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        leaf: FieldElement,
    ) -> Option<FieldElement> {
        if self.path_elements.len() != self.path_indices.len() {
            return None;
        }

        let mut current = leaf;
        for (sibling, &side) in self.path_elements.iter().zip(&self.path_indices) {
            current = match side {
                0 => hasher.hash2(current, *sibling),
                1 => hasher.hash2(*sibling, current),
                _ => return None,
            };
        }
        Some(current)
    }

    /// Check that `leaf` sits under `root` along this path.
    pub fn verify<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        leaf: FieldElement,
        root: FieldElement,
    ) -> bool {
        self.compute_root(hasher, leaf) == Some(root)
    }
}
