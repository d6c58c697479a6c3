//! Zero subtrees and bulk tree construction.

use super::gindex::MAX_TREE_DEPTH;
use super::node::{Node, Root};
use crate::error::{Error, Result};
use std::cell::RefCell;

thread_local! {
    // Grown on demand; entry `d` is the all-zero tree of depth `d`.
    static ZERO_NODES: RefCell<Vec<Node>> = RefCell::new(vec![Node::leaf(Root::ZERO)]);
}

/// The canonical all-zero tree of `depth`, shared between all callers on
/// this thread.
pub fn zero_node(depth: u32) -> Node {
    ZERO_NODES.with(|cell| {
        let mut nodes = cell.borrow_mut();
        while nodes.len() <= depth as usize {
            let below = nodes[nodes.len() - 1].clone();
            nodes.push(Node::pair(below.clone(), below));
        }
        nodes[depth as usize].clone()
    })
}

/// Root of the all-zero tree of `depth`.
pub fn zero_hash(depth: u32) -> Root {
    zero_node(depth).root()
}

/// Build a tree of `depth` whose leftmost nodes at that depth are `nodes`,
/// right-padded with zero subtrees.
pub fn fill_to_contents(nodes: Vec<Node>, depth: u32) -> Result<Node> {
    check_width(nodes.len() as u64, depth)?;
    if nodes.is_empty() {
        return Ok(zero_node(depth));
    }
    let mut layer = nodes;
    for level in 0..depth {
        if layer.len() % 2 == 1 {
            layer.push(zero_node(level));
        }
        let mut next = Vec::with_capacity(layer.len() / 2);
        let mut iter = layer.into_iter();
        while let (Some(left), Some(right)) = (iter.next(), iter.next()) {
            next.push(Node::pair(left, right));
        }
        layer = next;
    }
    Ok(layer.swap_remove(0))
}

/// Build a tree of `depth` holding `count` copies of `elem` on the left,
/// zero-padded to the right. Identical subtrees are shared.
pub fn fill_to_length(elem: &Node, depth: u32, count: u64) -> Result<Node> {
    check_width(count, depth)?;
    Ok(fill_recursive(elem, depth, count))
}

fn fill_recursive(elem: &Node, depth: u32, count: u64) -> Node {
    if count == 0 {
        return zero_node(depth);
    }
    if depth == 0 {
        return elem.clone();
    }
    let half = 1u64 << (depth - 1);
    if count <= half {
        Node::pair(fill_recursive(elem, depth - 1, count), zero_node(depth - 1))
    } else {
        Node::pair(full_tree(elem, depth - 1), fill_recursive(elem, depth - 1, count - half))
    }
}

fn full_tree(elem: &Node, depth: u32) -> Node {
    let mut node = elem.clone();
    for _ in 0..depth {
        node = Node::pair(node.clone(), node);
    }
    node
}

fn check_width(count: u64, depth: u32) -> Result<()> {
    if depth > MAX_TREE_DEPTH + 1 {
        return Err(Error::Capacity(format!(
            "tree depth {} exceeds the addressable maximum",
            depth
        )));
    }
    if count > 1u64 << depth {
        return Err(Error::Capacity(format!(
            "{} nodes do not fit in a tree of depth {}",
            count, depth
        )));
    }
    Ok(())
}
