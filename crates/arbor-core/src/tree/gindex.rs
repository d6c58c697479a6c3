//! Generalized indices: a root-to-node path encoded in the binary digits of
//! an integer, below its leading 1 bit.

use crate::error::{Error, Result};
use std::fmt;

/// Deepest tree a single view may address. Leaves room for the List length
/// mix-in and keeps every gindex within a `u64`.
pub const MAX_TREE_DEPTH: u32 = 62;

/// A generalized index. `1` is the root, `2g` and `2g + 1` are the left and
/// right children of `g`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gindex(u64);

impl Gindex {
    /// The root of a tree.
    pub const ROOT: Gindex = Gindex(1);

    /// The left child of the root. For a List this is its data subtree.
    pub const LEFT: Gindex = Gindex(0b10);

    /// The right child of the root. For a List this is its length leaf.
    pub const RIGHT: Gindex = Gindex(0b11);

    /// Wrap a raw gindex. Zero names no node.
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(Error::Navigation {
                gindex: 0,
                depth: 0,
            });
        }
        Ok(Gindex(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Number of edges between the root and this node.
    pub fn depth(self) -> u32 {
        63 - self.0.leading_zeros()
    }

    pub fn left(self) -> Gindex {
        Gindex(self.0 << 1)
    }

    pub fn right(self) -> Gindex {
        Gindex((self.0 << 1) | 1)
    }

    /// Parent node, or `None` for the root.
    pub fn parent(self) -> Option<Gindex> {
        if self.0 <= 1 {
            None
        } else {
            Some(Gindex(self.0 >> 1))
        }
    }

    /// Even gindices are left children.
    pub fn is_left(self) -> bool {
        self.0 & 1 == 0
    }

    pub fn is_right(self) -> bool {
        self.0 > 1 && self.0 & 1 == 1
    }

    pub fn sibling(self) -> Option<Gindex> {
        if self.0 <= 1 {
            None
        } else {
            Some(Gindex(self.0 ^ 1))
        }
    }

    /// The path `other` taken relative to the node at `self`.
    pub fn concat(self, other: Gindex) -> Result<Gindex> {
        let shift = other.depth();
        if self.depth() + shift > 63 {
            return Err(Error::Navigation {
                gindex: other.0,
                depth: self.depth() + shift,
            });
        }
        Ok(Gindex((self.0 << shift) | (other.0 ^ (1 << shift))))
    }

    /// Path bits from the root downwards; `false` is left.
    pub fn path(self) -> impl Iterator<Item = bool> {
        let value = self.0;
        (0..self.depth()).rev().map(move |i| (value >> i) & 1 == 1)
    }
}

impl fmt::Debug for Gindex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gindex({:#b})", self.0)
    }
}

impl fmt::Display for Gindex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gindex of the `index`-th node at `depth` below the root.
pub fn gindex_of(index: u64, depth: u32) -> Result<Gindex> {
    if depth > 63 || index >> depth != 0 {
        return Err(Error::OutOfRange {
            index,
            length: 1u64.checked_shl(depth).unwrap_or(u64::MAX),
        });
    }
    Ok(Gindex((1 << depth) | index))
}

/// Minimal depth of a tree holding `count` leaves: `ceil(log2(count))`.
pub fn path_depth(count: u64) -> u32 {
    if count <= 1 {
        0
    } else {
        64 - (count - 1).leading_zeros()
    }
}
