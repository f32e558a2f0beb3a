//! Level-indexed Merkle tree arena.
//!
//! Level 0 holds the leaves; level `depth` holds the root. Logically every
//! level `d` has `2^(depth - d)` slots, the leaves being zero-padded on the
//! right. Only the populated prefix of each level is stored in one flat
//! buffer, addressed through an offset table. A slot past that prefix covers
//! nothing but padding, so its value is the empty-subtree root `zeros[d]`.

use thiserror::Error;
use tracing::debug;

use super::proof::MerkleProof;
use crate::field::FieldElement;
use crate::poseidon::FieldHasher;

/// Depth used by the deployed pool contract.
pub const TREE_DEPTH: u32 = 25;

/// Largest supported depth; leaf indices are `u64` and capacity must fit.
pub const MAX_DEPTH: u32 = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("invalid depth {depth} for {leaves} leaves (capacity 2^depth, max depth 32)")]
    InvalidDepth { depth: u32, leaves: usize },
    #[error("leaf index {index} out of range for tree of depth {depth}")]
    IndexOutOfRange { index: u64, depth: u32 },
}

/// Roots of all-zero subtrees: `zeros[0] = 0`, `zeros[d + 1] = H(zeros[d], zeros[d])`.
pub fn zero_hashes<H: FieldHasher + ?Sized>(hasher: &H, depth: u32) -> Vec<FieldElement> {
    let mut zeros = Vec::with_capacity(depth as usize + 1);
    let mut current = FieldElement::zero();
    zeros.push(current);
    for _ in 0..depth {
        current = hasher.hash2(current, current);
        zeros.push(current);
    }
    zeros
}

/// Root of a tree whose leaves are all zero. This is the "no notes" root the
/// pool contract is initialised with.
pub fn empty_root<H: FieldHasher + ?Sized>(hasher: &H, depth: u32) -> FieldElement {
    let mut current = FieldElement::zero();
    for _ in 0..depth {
        current = hasher.hash2(current, current);
    }
    current
}

/// An immutable snapshot of a fully built tree.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    depth: u32,
    /// Stored prefix of every level, level 0 first
    nodes: Vec<FieldElement>,
    /// `nodes[offsets[d]..offsets[d + 1]]` is the stored prefix of level `d`
    offsets: Vec<usize>,
    zeros: Vec<FieldElement>,
}

impl MerkleTree {
    /// Build the tree for `leaves`, zero-padded to `2^depth` slots.
    pub fn build<H: FieldHasher + ?Sized>(
        hasher: &H,
        leaves: &[FieldElement],
        depth: u32,
    ) -> Result<Self, MerkleError> {
        let too_many = (leaves.len() as u64) > capacity(depth);
        if depth > MAX_DEPTH || too_many {
            return Err(MerkleError::InvalidDepth {
                depth,
                leaves: leaves.len(),
            });
        }

        let zeros = zero_hashes(hasher, depth);

        let mut nodes = Vec::with_capacity(2 * leaves.len() + depth as usize);
        let mut offsets = Vec::with_capacity(depth as usize + 2);
        offsets.push(0);
        nodes.extend_from_slice(leaves);
        offsets.push(nodes.len());

        for level in 0..depth as usize {
            let children = &nodes[offsets[level]..offsets[level + 1]];
            let parents = hash_level(hasher, children, zeros[level]);
            nodes.extend(parents);
            offsets.push(nodes.len());
        }

        debug!(depth, leaves = leaves.len(), stored = nodes.len(), "built merkle tree");

        Ok(Self {
            depth,
            nodes,
            offsets,
            zeros,
        })
    }

    pub fn root(&self) -> FieldElement {
        self.value_at(self.depth as usize, 0)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of leaves the tree was built from (before padding).
    pub fn leaf_count(&self) -> usize {
        self.offsets[1]
    }

    /// Number of leaf slots, `2^depth`.
    pub fn capacity(&self) -> u64 {
        capacity(self.depth)
    }

    /// Logical length of a level, `2^(depth - level)`.
    pub fn level_len(&self, level: u32) -> Option<u64> {
        (level <= self.depth).then(|| 1u64 << (self.depth - level))
    }

    /// Value at `(level, index)`, padding included. `None` outside the tree.
    pub fn node(&self, level: u32, index: u64) -> Option<FieldElement> {
        let len = self.level_len(level)?;
        (index < len).then(|| self.value_at(level as usize, index))
    }

    pub fn leaf(&self, index: u64) -> Option<FieldElement> {
        self.node(0, index)
    }

    /// Empty-subtree root for a level.
    pub fn zero_at(&self, level: u32) -> Option<FieldElement> {
        self.zeros.get(level as usize).copied()
    }

    /// First index holding `commitment` among the supplied leaves.
    pub fn find_leaf(&self, commitment: &FieldElement) -> Option<u64> {
        self.stored(0)
            .iter()
            .position(|leaf| leaf == commitment)
            .map(|i| i as u64)
    }

    /// Sibling path and side bits for the leaf at `leaf_index`.
    ///
    /// The recorded bit is the side of the node on the path (0 = left
    /// child, 1 = right child), not the side of its sibling.
    pub fn prove_inclusion(&self, leaf_index: u64) -> Result<MerkleProof, MerkleError> {
        if leaf_index >= self.capacity() {
            return Err(MerkleError::IndexOutOfRange {
                index: leaf_index,
                depth: self.depth,
            });
        }

        let mut path_elements = Vec::with_capacity(self.depth as usize);
        let mut path_indices = Vec::with_capacity(self.depth as usize);

        let mut index = leaf_index;
        for level in 0..self.depth as usize {
            path_elements.push(self.value_at(level, index ^ 1));
            path_indices.push((index & 1) as u8);
            index >>= 1;
        }

        Ok(MerkleProof {
            path_elements,
            path_indices,
        })
    }

    fn stored(&self, level: usize) -> &[FieldElement] {
        &self.nodes[self.offsets[level]..self.offsets[level + 1]]
    }

    fn value_at(&self, level: usize, index: u64) -> FieldElement {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.stored(level).get(i))
            .copied()
            .unwrap_or(self.zeros[level])
    }
}

fn capacity(depth: u32) -> u64 {
    1u64.checked_shl(depth).unwrap_or(u64::MAX)
}

/// Hash adjacent pairs of a level; an unpaired last child is joined with
/// the level's zero value.
fn hash_level<H: FieldHasher + ?Sized>(
    hasher: &H,
    children: &[FieldElement],
    zero: FieldElement,
) -> Vec<FieldElement> {
    let pair = |chunk: &[FieldElement]| {
        hasher.hash2(chunk[0], chunk.get(1).copied().unwrap_or(zero))
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        children.par_chunks(2).map(pair).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        children.chunks(2).map(pair).collect()
    }
}
