//! Readonly iteration over aggregate elements.
//!
//! All iterators walk the backing tree lazily, left to right, and stop after
//! the logical element count; nothing past the last element is touched.
//! Mutating the aggregate does not affect an iterator already created from
//! it: the iterator holds its own handle on the old tree.

use crate::error::{Error, Result};
use crate::tree::{zero_node, Gindex, Node};
use crate::types::{TypeRef, BYTES_PER_CHUNK};
use crate::view::{Aggregate, BasicView, ContainerView, Key, View};

/// Depth-first walk yielding the first `count` nodes at `depth`.
///
/// A leaf above `depth` is only passable when it commits to an all-zero
/// subtree (the result of a collapse); its children are then the canonical
/// zero nodes.
pub struct NodeWalker {
    stack: Vec<(Node, Gindex)>,
    depth: u32,
    remaining: u64,
}

impl NodeWalker {
    pub fn new(root: Node, depth: u32, count: u64) -> Self {
        Self {
            stack: vec![(root, Gindex::ROOT)],
            depth,
            remaining: count,
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<Node>> {
        self.stack.clear();
        self.remaining = 0;
        Some(Err(err))
    }
}

impl Iterator for NodeWalker {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Result<Node>> {
        if self.remaining == 0 {
            return None;
        }
        while let Some((node, gindex)) = self.stack.pop() {
            let level = gindex.depth();
            if level == self.depth {
                self.remaining -= 1;
                return Some(Ok(node));
            }
            match node.children() {
                Some((left, right)) => {
                    self.stack.push((right.clone(), gindex.right()));
                    self.stack.push((left.clone(), gindex.left()));
                }
                None if node.is_zero(self.depth - level) => {
                    let zero = zero_node(self.depth - level - 1);
                    self.stack.push((zero.clone(), gindex.right()));
                    self.stack.push((zero, gindex.left()));
                }
                None => {
                    return self.fail(Error::Navigation {
                        gindex: gindex.value(),
                        depth: level,
                    })
                }
            }
        }
        // The tree ran out of nodes before `count`: more elements were
        // requested than the depth can hold.
        let depth = self.depth;
        self.fail(Error::Navigation {
            gindex: 1u64.checked_shl(depth).unwrap_or(u64::MAX),
            depth,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}

/// Element iterator of a List or Vector.
pub enum ElementIter {
    /// Basic elements, sliced out of each chunk as it streams past.
    Packed {
        chunks: NodeWalker,
        elem: TypeRef,
        chunk: Option<Node>,
        offset: usize,
        remaining: u64,
    },
    /// Composite elements. Runs of identical subtrees share one view.
    Complex {
        nodes: NodeWalker,
        elem: TypeRef,
        last: Option<View>,
    },
    /// Byte-string elements: every element gets its own view.
    Fresh { nodes: NodeWalker, elem: TypeRef },
}

impl ElementIter {
    /// Iterate the first `count` elements of type `elem` stored in
    /// `contents`, a tree of `depth`.
    pub fn new(elem: &TypeRef, contents: Node, depth: u32, count: u64) -> Self {
        let elem = elem.clone();
        match elem.basic_kind() {
            Some(kind) => {
                let chunk_count = count.div_ceil(kind.elems_per_chunk() as u64);
                ElementIter::Packed {
                    chunks: NodeWalker::new(contents, depth, chunk_count),
                    elem,
                    chunk: None,
                    offset: 0,
                    remaining: count,
                }
            }
            None if elem.is_byte_string() => ElementIter::Fresh {
                nodes: NodeWalker::new(contents, depth, count),
                elem,
            },
            None => ElementIter::Complex {
                nodes: NodeWalker::new(contents, depth, count),
                elem,
                last: None,
            },
        }
    }
}

impl Iterator for ElementIter {
    type Item = Result<View>;

    fn next(&mut self) -> Option<Result<View>> {
        match self {
            ElementIter::Packed {
                chunks,
                elem,
                chunk,
                offset,
                remaining,
            } => {
                if *remaining == 0 {
                    return None;
                }
                if chunk.is_none() || *offset >= BYTES_PER_CHUNK {
                    match chunks.next()? {
                        Ok(next) => *chunk = Some(next),
                        Err(err) => {
                            *remaining = 0;
                            return Some(Err(err));
                        }
                    }
                    *offset = 0;
                }
                let current = chunk.as_ref()?;
                let view = BasicView::unpack(elem, current, *offset);
                *offset += elem.fixed_byte_length().unwrap_or(BYTES_PER_CHUNK);
                *remaining -= 1;
                Some(view.map(View::Basic))
            }
            ElementIter::Complex { nodes, elem, last } => {
                let node = match nodes.next()? {
                    Ok(node) => node,
                    Err(err) => return Some(Err(err)),
                };
                if let Some(previous) = last {
                    if previous.backing().ptr_eq(&node) {
                        return Some(Ok(previous.clone()));
                    }
                }
                let view = View::from_backing(elem, node);
                if let Ok(view) = &view {
                    *last = Some(view.clone());
                }
                Some(view)
            }
            ElementIter::Fresh { nodes, elem } => {
                let node = match nodes.next()? {
                    Ok(node) => node,
                    Err(err) => return Some(Err(err)),
                };
                Some(View::from_backing(elem, node))
            }
        }
    }
}

/// Field iterator of a Container, in declared order.
pub struct FieldIter<'a> {
    view: &'a ContainerView,
    index: usize,
}

impl<'a> FieldIter<'a> {
    pub fn new(view: &'a ContainerView) -> Self {
        Self { view, index: 0 }
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<(&'a str, View)>;

    fn next(&mut self) -> Option<Self::Item> {
        let view: &'a ContainerView = self.view;
        let field = view.type_def().as_container()?.field(self.index)?;
        let key = Key::Index(self.index as u64);
        self.index += 1;
        Some(view.get_key(key).map(|value| (field.name.as_str(), value)))
    }
}
