//! Immutable, reference-counted binary tree of 32-byte hash nodes.
//!
//! Every write returns a new root that shares all untouched subtrees with the
//! old one. Old roots stay valid for as long as somebody holds them.

use super::build::{zero_hash, zero_node};
use super::gindex::Gindex;
use crate::error::{Error, Result};
use alloy_primitives::B256;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A 32-byte node root. For a leaf this is its content.
pub type Root = B256;

/// Combine two child roots into their parent root.
pub fn merkle_hash(left: &Root, right: &Root) -> Root {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left.as_slice());
    data[32..].copy_from_slice(right.as_slice());
    let mut hasher = Sha256::new();
    hasher.update(data);
    B256::from_slice(&hasher.finalize())
}

/// Which child of a pair to replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

enum Inner {
    Leaf(Root),
    Pair {
        left: Node,
        right: Node,
        root: OnceLock<Root>,
    },
}

/// A shared tree node: either a 32-byte leaf or a pair of children.
#[derive(Clone)]
pub struct Node(Arc<Inner>);

impl Node {
    pub fn leaf(root: Root) -> Self {
        Node(Arc::new(Inner::Leaf(root)))
    }

    pub fn leaf_bytes(bytes: [u8; 32]) -> Self {
        Self::leaf(B256::new(bytes))
    }

    pub fn pair(left: Node, right: Node) -> Self {
        Node(Arc::new(Inner::Pair {
            left,
            right,
            root: OnceLock::new(),
        }))
    }

    /// The root hash, computed once per pair and then cached.
    pub fn root(&self) -> Root {
        match &*self.0 {
            Inner::Leaf(root) => *root,
            Inner::Pair { left, right, root } => {
                *root.get_or_init(|| merkle_hash(&left.root(), &right.root()))
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(&*self.0, Inner::Leaf(_))
    }

    /// Content of a leaf, `None` for a pair.
    pub fn leaf_value(&self) -> Option<&Root> {
        match &*self.0 {
            Inner::Leaf(root) => Some(root),
            Inner::Pair { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&Node, &Node)> {
        match &*self.0 {
            Inner::Leaf(_) => None,
            Inner::Pair { left, right, .. } => Some((left, right)),
        }
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Read the node at `gindex`.
    pub fn get(&self, gindex: Gindex) -> Result<Node> {
        let mut node = self;
        for (level, go_right) in gindex.path().enumerate() {
            let (left, right) = node.children().ok_or(Error::Navigation {
                gindex: gindex.value(),
                depth: level as u32,
            })?;
            node = if go_right { right } else { left };
        }
        Ok(node.clone())
    }

    /// Return a new root with the node at `gindex` replaced.
    ///
    /// With `expand`, a leaf met on the way down is opened up into a zero
    /// subtree, provided it is itself the root of an all-zero subtree of the
    /// remaining depth. Any other leaf on the path is a navigation error.
    pub fn set(&self, gindex: Gindex, replacement: Node, expand: bool) -> Result<Node> {
        rebuild(self, gindex, gindex.depth(), replacement, expand)
    }

    /// Deferred form of [`Node::set`]: fix the path now, supply the node later.
    pub fn setter(&self, gindex: Gindex, expand: bool) -> impl FnOnce(Node) -> Result<Node> + '_ {
        move |replacement| self.set(gindex, replacement, expand)
    }

    /// Replace everything under `gindex` with one leaf carrying its root.
    pub fn collapse(&self, gindex: Gindex) -> Result<Node> {
        let subtree = self.get(gindex)?;
        if subtree.is_leaf() {
            return Ok(self.clone());
        }
        self.set(gindex, Node::leaf(subtree.root()), false)
    }

    /// Replace one child of this pair.
    pub fn rebind(&self, side: Side, node: Node) -> Result<Node> {
        let (left, right) = self.children().ok_or(Error::Navigation {
            gindex: match side {
                Side::Left => Gindex::LEFT.value(),
                Side::Right => Gindex::RIGHT.value(),
            },
            depth: 0,
        })?;
        Ok(match side {
            Side::Left => Node::pair(node, right.clone()),
            Side::Right => Node::pair(left.clone(), node),
        })
    }

    /// True if this node commits to an all-zero subtree of `depth`.
    pub fn is_zero(&self, depth: u32) -> bool {
        self.root() == zero_hash(depth)
    }
}

fn rebuild(node: &Node, gindex: Gindex, remaining: u32, replacement: Node, expand: bool) -> Result<Node> {
    if remaining == 0 {
        return Ok(replacement);
    }
    let (left, right) = match node.children() {
        Some((left, right)) => (left.clone(), right.clone()),
        None if expand && node.is_zero(remaining) => {
            let zero = zero_node(remaining - 1);
            (zero.clone(), zero)
        }
        None => {
            return Err(Error::Navigation {
                gindex: gindex.value(),
                depth: gindex.depth() - remaining,
            })
        }
    };
    if (gindex.value() >> (remaining - 1)) & 1 == 1 {
        let right = rebuild(&right, gindex, remaining - 1, replacement, expand)?;
        Ok(Node::pair(left, right))
    } else {
        let left = rebuild(&left, gindex, remaining - 1, replacement, expand)?;
        Ok(Node::pair(left, right))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.root() == other.root()
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Inner::Leaf(root) => write!(f, "Leaf({})", root),
            Inner::Pair { .. } => write!(f, "Pair({})", self.root()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::gindex::gindex_of;

    fn leaf(byte: u8) -> Node {
        Node::leaf_bytes([byte; 32])
    }

    #[test]
    fn test_merkle_hash_deterministic() {
        let a = B256::repeat_byte(1);
        let b = B256::repeat_byte(2);
        assert_eq!(merkle_hash(&a, &b), merkle_hash(&a, &b));
        // Order matters
        assert_ne!(merkle_hash(&a, &b), merkle_hash(&b, &a));
    }

    #[test]
    fn test_pair_root_matches_hash() {
        let node = Node::pair(leaf(1), leaf(2));
        assert_eq!(node.root(), merkle_hash(&leaf(1).root(), &leaf(2).root()));
    }

    #[test]
    fn test_get_by_gindex() {
        let tree = Node::pair(Node::pair(leaf(1), leaf(2)), Node::pair(leaf(3), leaf(4)));
        assert_eq!(tree.get(gindex_of(0, 2).unwrap()).unwrap(), leaf(1));
        assert_eq!(tree.get(gindex_of(3, 2).unwrap()).unwrap(), leaf(4));
        assert_eq!(tree.get(Gindex::ROOT).unwrap(), tree);
    }

    #[test]
    fn test_get_below_leaf_fails() {
        let tree = Node::pair(leaf(1), leaf(2));
        let err = tree.get(gindex_of(0, 2).unwrap()).unwrap_err();
        assert!(matches!(err, Error::Navigation { gindex: 4, depth: 1 }));
    }

    #[test]
    fn test_set_shares_siblings() {
        let right = Node::pair(leaf(3), leaf(4));
        let tree = Node::pair(Node::pair(leaf(1), leaf(2)), right.clone());
        let updated = tree.set(gindex_of(1, 2).unwrap(), leaf(9), false).unwrap();

        assert_eq!(updated.get(gindex_of(1, 2).unwrap()).unwrap(), leaf(9));
        assert!(updated.get(Gindex::RIGHT).unwrap().ptr_eq(&right));
        // The old version is untouched.
        assert_eq!(tree.get(gindex_of(1, 2).unwrap()).unwrap(), leaf(2));
    }

    #[test]
    fn test_setter_defers_replacement() {
        let tree = Node::pair(leaf(1), leaf(2));
        let set_left = tree.setter(Gindex::LEFT, false);
        let updated = set_left(leaf(7)).unwrap();
        assert_eq!(updated.get(Gindex::LEFT).unwrap(), leaf(7));
    }

    #[test]
    fn test_set_expands_collapsed_zero_branch() {
        let collapsed = Node::pair(Node::leaf(zero_hash(2)), leaf(5));
        let g = Gindex::LEFT.concat(gindex_of(1, 2).unwrap()).unwrap();

        assert!(matches!(
            collapsed.set(g, leaf(1), false),
            Err(Error::Navigation { .. })
        ));
        let expanded = collapsed.set(g, leaf(1), true).unwrap();
        assert_eq!(expanded.get(g).unwrap(), leaf(1));
    }

    #[test]
    fn test_set_does_not_expand_nonzero_leaf() {
        let tree = Node::pair(leaf(1), leaf(2));
        let g = gindex_of(0, 2).unwrap();
        assert!(matches!(tree.set(g, leaf(3), true), Err(Error::Navigation { .. })));
    }

    #[test]
    fn test_collapse_keeps_root() {
        let tree = Node::pair(Node::pair(leaf(1), leaf(2)), leaf(3));
        let collapsed = tree.collapse(Gindex::LEFT).unwrap();
        assert_eq!(collapsed.root(), tree.root());
        assert!(collapsed.get(Gindex::LEFT).unwrap().is_leaf());
        assert!(collapsed.get(gindex_of(0, 2).unwrap()).is_err());
    }

    #[test]
    fn test_rebind_sibling() {
        let tree = Node::pair(leaf(1), leaf(2));
        let updated = tree.rebind(Side::Right, leaf(5)).unwrap();
        assert_eq!(updated.get(Gindex::RIGHT).unwrap(), leaf(5));
        assert!(updated.get(Gindex::LEFT).unwrap().ptr_eq(tree.children().unwrap().0));
        assert!(leaf(1).rebind(Side::Left, leaf(2)).is_err());
    }
}
