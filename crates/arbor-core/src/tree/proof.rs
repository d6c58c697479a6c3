//! Merkle branches: extracting the sibling roots along a path and checking
//! a leaf against a root with them.

use super::gindex::Gindex;
use super::node::{merkle_hash, Node, Root};
use crate::error::Result;

impl Node {
    /// Sibling roots along the path to `gindex`, ordered from the target
    /// upwards.
    pub fn branch(&self, gindex: Gindex) -> Result<Vec<Root>> {
        // Validates the whole path before any siblings are collected.
        self.get(gindex)?;
        let mut branch = Vec::with_capacity(gindex.depth() as usize);
        let mut current = gindex;
        while let Some(sibling) = current.sibling() {
            branch.push(self.get(sibling)?.root());
            current = current.parent().unwrap_or(Gindex::ROOT);
        }
        Ok(branch)
    }
}

/// Verify a Merkle branch against an expected root.
///
/// `index` is the position of `leaf` among the `2^depth` nodes at `depth`;
/// bit `i` of it selects which side the leaf's path takes at height `i`.
pub fn verify_merkle_branch(leaf: &Root, branch: &[Root], depth: usize, index: u64, root: &Root) -> bool {
    if branch.len() != depth {
        return false;
    }

    let mut current = *leaf;
    for (i, node) in branch.iter().enumerate() {
        if (index >> i) & 1 == 1 {
            current = merkle_hash(node, &current);
        } else {
            current = merkle_hash(&current, node);
        }
    }

    current == *root
}

/// Same check, addressed by gindex instead of `(depth, index)`.
pub fn verify_gindex_branch(leaf: &Root, branch: &[Root], gindex: Gindex, root: &Root) -> bool {
    let depth = gindex.depth();
    let index = gindex.value() ^ (1u64 << depth);
    verify_merkle_branch(leaf, branch, depth as usize, index, root)
}
