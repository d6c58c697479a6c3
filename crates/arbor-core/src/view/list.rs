//! Bounded variable-length lists.
//!
//! The backing is `pair(contents, length)`. The contents subtree has the
//! fixed depth of the type; the length leaf holds the element count as a
//! little-endian integer. Elements past the length are always zero.

use super::navigation::{Aggregate, Key, Position};
use super::{contents_from_views, pack_bytes, BasicView, IntoView, View};
use crate::error::{Error, Result};
use crate::iter::ElementIter;
use crate::tree::{fill_to_contents, gindex_of, zero_node, Gindex, Node, Side};
use crate::types::{TypeKind, TypeRef, BYTES_PER_LENGTH_LEAF};

#[derive(Clone)]
pub struct ListView {
    ty: TypeRef,
    elem: TypeRef,
    backing: Node,
    length: u64,
}

impl ListView {
    /// Build a list from up to `limit` values coercible to the element type.
    pub fn new<I>(ty: &TypeRef, items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: IntoView,
    {
        let (elem, limit) = list_params(ty)?;
        let mut views = Vec::new();
        for item in items {
            if views.len() as u64 >= limit {
                return Err(Error::Capacity(format!(
                    "{} holds at most {} elements",
                    ty, limit
                )));
            }
            views.push(item.into_view(elem)?);
        }
        let length = views.len() as u64;
        let contents = contents_from_views(ty, &views)?;
        Ok(Self::from_parts(
            ty.clone(),
            elem.clone(),
            Node::pair(contents, length_leaf(length)),
            length,
        ))
    }

    /// Build a byte-string list directly from its bytes.
    pub fn from_bytes(ty: &TypeRef, bytes: &[u8]) -> Result<Self> {
        let (elem, limit) = list_params(ty)?;
        if !ty.is_byte_string() {
            return Err(Error::TypeMismatch {
                expected: "a byte string type".to_string(),
                got: ty.to_string(),
            });
        }
        let length = bytes.len() as u64;
        if length > limit {
            return Err(Error::Capacity(format!(
                "{} holds at most {} bytes, got {}",
                ty, limit, length
            )));
        }
        let contents = fill_to_contents(pack_bytes(bytes), ty.depth())?;
        Ok(Self::from_parts(
            ty.clone(),
            elem.clone(),
            Node::pair(contents, length_leaf(length)),
            length,
        ))
    }

    pub(crate) fn from_parts(ty: TypeRef, elem: TypeRef, backing: Node, length: u64) -> Self {
        Self {
            ty,
            elem,
            backing,
            length,
        }
    }

    pub(crate) fn from_backing(ty: &TypeRef, backing: Node) -> Result<Self> {
        let (elem, _) = list_params(ty)?;
        let mut view = Self::from_parts(ty.clone(), elem.clone(), ty.default_node(), 0);
        view.set_backing(backing)?;
        Ok(view)
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn limit(&self) -> u64 {
        self.ty.capacity()
    }

    pub fn elem_type(&self) -> &TypeRef {
        &self.elem
    }

    /// The data subtree, without the length mix-in.
    pub fn contents(&self) -> Node {
        match self.backing.children() {
            Some((contents, _)) => contents.clone(),
            None => zero_node(self.ty.depth()),
        }
    }

    /// Read element `index`; indices at or past the length are out of range.
    pub fn get(&self, index: u64) -> Result<View> {
        self.get_key(Key::Index(index))
    }

    pub fn set<V: IntoView>(&mut self, index: u64, value: V) -> Result<()> {
        self.set_key(Key::Index(index), value)
    }

    /// Add one element at the tail, growing into unallocated capacity.
    pub fn append<V: IntoView>(&mut self, value: V) -> Result<()> {
        let limit = self.limit();
        if self.length >= limit {
            return Err(Error::Capacity(format!(
                "cannot append to {}: already holds {} elements",
                self.ty, limit
            )));
        }
        let view = value.into_view(self.elem_type())?;
        let index = self.length;
        let position = self.position(index)?;
        let grown = match position.offset {
            Some(offset) => {
                let chunk = if offset == 0 {
                    zero_node(0)
                } else {
                    self.backing.get(position.gindex)?
                };
                let chunk = view.as_basic()?.pack_into(&chunk, offset)?;
                self.backing.set(position.gindex, chunk, true)?
            }
            None => self.backing.set(position.gindex, view.backing().clone(), true)?,
        };
        self.backing = grown.rebind(Side::Right, length_leaf(index + 1))?;
        self.length = index + 1;
        tracing::trace!(gindex = %position.gindex, length = self.length, "appended list element");
        Ok(())
    }

    /// Remove and return the last element.
    ///
    /// When the element owned its whole slot and sat on a left branch, the
    /// now all-zero branch above it is collapsed into a single leaf.
    pub fn pop(&mut self) -> Result<View> {
        if self.length == 0 {
            return Err(Error::EmptyCollection(self.ty.to_string()));
        }
        let index = self.length - 1;
        let popped = self.get_key(Key::Index(index))?;
        let position = self.position(index)?;

        let (mut backing, whole_slot) = match position.offset {
            Some(0) | None => (self.backing.set(position.gindex, zero_node(0), false)?, true),
            Some(offset) => {
                let chunk = self.backing.get(position.gindex)?;
                let cleared = BasicView::default_of(&self.elem)?.pack_into(&chunk, offset)?;
                (self.backing.set(position.gindex, cleared, false)?, false)
            }
        };

        if whole_slot && position.gindex.is_left() {
            let mut target = position.gindex;
            while target.is_left() && target != Gindex::LEFT {
                match target.parent() {
                    Some(parent) => target = parent,
                    None => break,
                }
            }
            backing = backing.collapse(target)?;
            tracing::trace!(gindex = %target, length = index, "collapsed zeroed list branch");
        }

        self.backing = backing.rebind(Side::Right, length_leaf(index))?;
        self.length = index;
        Ok(popped)
    }

    /// Readonly iteration over the current elements.
    pub fn iter(&self) -> ElementIter {
        ElementIter::new(self.elem_type(), self.contents(), self.ty.depth(), self.length)
    }

    fn position(&self, index: u64) -> Result<Position> {
        let per_chunk = self.ty.elems_per_chunk() as u64;
        let chunk = gindex_of(index / per_chunk, self.ty.depth())?;
        let offset = self
            .elem_type()
            .basic_kind()
            .map(|kind| (index % per_chunk) as usize * kind.byte_length());
        Ok(Position {
            gindex: Gindex::LEFT.concat(chunk)?,
            offset,
        })
    }
}

impl Aggregate for ListView {
    fn type_def(&self) -> &TypeRef {
        &self.ty
    }

    fn backing(&self) -> &Node {
        &self.backing
    }

    /// Accepts any `pair(contents, length)` whose length fits the limit.
    fn set_backing(&mut self, node: Node) -> Result<()> {
        let length = {
            let (_, length_node) = node.children().ok_or_else(|| Error::TypeMismatch {
                expected: format!("a {} backing pair", self.ty),
                got: "a leaf".to_string(),
            })?;
            read_length(length_node)?
        };
        if length > self.limit() {
            return Err(Error::Capacity(format!(
                "length {} exceeds the limit of {}",
                length, self.ty
            )));
        }
        self.backing = node;
        self.length = length;
        Ok(())
    }

    fn type_of(&self, key: Key<'_>) -> Result<TypeRef> {
        self.static_gindex(key)?;
        Ok(self.elem_type().clone())
    }

    fn static_gindex(&self, key: Key<'_>) -> Result<Position> {
        match key {
            Key::Index(index) if index < self.length => self.position(index),
            Key::Index(index) if index < self.limit() => Err(Error::OutOfRange {
                index,
                length: self.length,
            }),
            _ => Err(Error::UnknownKey {
                key: key.to_string(),
                type_name: self.ty.to_string(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a ListView {
    type Item = Result<View>;
    type IntoIter = ElementIter;

    fn into_iter(self) -> ElementIter {
        self.iter()
    }
}

fn list_params(ty: &TypeRef) -> Result<(&TypeRef, u64)> {
    match ty.kind() {
        TypeKind::List { elem, limit } => Ok((elem, *limit)),
        _ => Err(Error::TypeMismatch {
            expected: "a List type".to_string(),
            got: ty.to_string(),
        }),
    }
}

pub(crate) fn length_leaf(length: u64) -> Node {
    let mut leaf = [0u8; BYTES_PER_LENGTH_LEAF];
    leaf[..8].copy_from_slice(&length.to_le_bytes());
    Node::leaf_bytes(leaf)
}

fn read_length(node: &Node) -> Result<u64> {
    let value = node.leaf_value().ok_or_else(|| Error::TypeMismatch {
        expected: "a length leaf".to_string(),
        got: "a pair node".to_string(),
    })?;
    if value[8..].iter().any(|b| *b != 0) {
        return Err(Error::Capacity(format!("list length {} does not fit in 64 bits", value)));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&value[..8]);
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDef;
    use proptest::prelude::*;

    fn bytes8() -> TypeRef {
        TypeDef::byte_list(8).unwrap()
    }

    #[test]
    fn test_empty_list_matches_default() {
        let ty = bytes8();
        let list = ListView::new(&ty, Vec::<u8>::new()).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.hash_tree_root(), ty.default_node().root());
    }

    #[test]
    fn test_append_then_pop_restores_root() {
        let ty = bytes8();
        let mut list = ListView::new(&ty, Vec::<u8>::new()).unwrap();
        let before = list.hash_tree_root();
        list.append(5u8).unwrap();
        assert_eq!(list.len(), 1);
        assert_ne!(list.hash_tree_root(), before);
        assert_eq!(list.pop().unwrap().to_u64().unwrap(), 5);
        assert_eq!(list.hash_tree_root(), before);
        assert!(list.is_empty());
    }

    #[test]
    fn test_length_is_mixed_in() {
        let ty = bytes8();
        let list = ListView::new(&ty, [1u8, 2, 3]).unwrap();
        let (contents, length) = list.backing().children().unwrap();
        assert_eq!(length.root()[0], 3);
        assert_eq!(contents.root()[..3], [1, 2, 3]);
        assert_eq!(contents.root()[3..], [0u8; 29]);
    }

    #[test]
    fn test_construction_over_limit() {
        let ty = bytes8();
        assert!(matches!(
            ListView::new(&ty, [0u8; 9]),
            Err(Error::Capacity(_))
        ));
        assert!(ListView::new(&ty, [0u8; 8]).is_ok());
    }

    #[test]
    fn test_append_at_limit_leaves_backing_untouched() {
        let ty = TypeDef::list(TypeDef::uint64(), 2).unwrap();
        let mut list = ListView::new(&ty, [1u64, 2]).unwrap();
        let before = list.backing().clone();
        assert!(matches!(list.append(3u64), Err(Error::Capacity(_))));
        assert!(list.backing().ptr_eq(&before));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_pop_empty() {
        let mut list = ListView::new(&bytes8(), Vec::<u8>::new()).unwrap();
        assert!(matches!(list.pop(), Err(Error::EmptyCollection(_))));
    }

    #[test]
    fn test_index_checked_against_length() {
        let ty = bytes8();
        let mut list = ListView::new(&ty, [1u8, 2]).unwrap();
        assert!(matches!(list.get(2), Err(Error::OutOfRange { index: 2, length: 2 })));
        assert!(matches!(list.set(5, 1u8), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            list.type_of(Key::Index(8)),
            Err(Error::UnknownKey { .. })
        ));
        assert!(matches!(
            list.type_of(Key::Index(7)),
            Err(Error::OutOfRange { index: 7, length: 2 })
        ));
        assert!(list.type_of(Key::Index(1)).is_ok());
    }

    #[test]
    fn test_keyed_access_stops_at_length() {
        let ty = bytes8();
        let mut list = ListView::new(&ty, [1u8, 2]).unwrap();
        let before = list.backing().clone();

        assert!(matches!(
            list.set_key(Key::Index(5), 9u8),
            Err(Error::OutOfRange { index: 5, length: 2 })
        ));
        assert!(matches!(list.get_key(Key::Index(2)), Err(Error::OutOfRange { .. })));
        assert!(matches!(list.sub_view(6u64), Err(Error::OutOfRange { .. })));
        assert!(matches!(list.prove(Key::Index(3)), Err(Error::OutOfRange { .. })));
        assert!(list.backing().ptr_eq(&before));

        let mut view = View::from(ListView::new(&ty, [1u8]).unwrap());
        assert!(matches!(
            view.set_key(Key::Index(3), 4u8),
            Err(Error::OutOfRange { index: 3, length: 1 })
        ));
        let bytes = view.encode_bytes().unwrap();
        assert_eq!(bytes, vec![1u8]);
        assert_eq!(View::decode_bytes(&ty, &bytes).unwrap(), view);
    }

    #[test]
    fn test_set_keeps_chunk_mates() {
        let ty = TypeDef::list(TypeDef::uint16(), 32).unwrap();
        let mut list = ListView::new(&ty, [1u16, 2, 3, 4]).unwrap();
        list.set(2, 0xBEEFu16).unwrap();
        let values: Vec<u64> = list.iter().map(|v| v.unwrap().to_u64().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 0xBEEF, 4]);
    }

    #[test]
    fn test_complex_elements_grow_and_shrink() {
        let elem = TypeDef::byte_vector(32).unwrap();
        let ty = TypeDef::list(elem.clone(), 16).unwrap();
        let mut list = ListView::new(&ty, Vec::<View>::new()).unwrap();
        let empty = list.hash_tree_root();

        let mut roots = vec![empty];
        for i in 0..5u8 {
            list.append([i + 1; 32]).unwrap();
            roots.push(list.hash_tree_root());
        }
        assert_eq!(list.get(3).unwrap().hash_tree_root().0, [4u8; 32]);

        for expected in roots.iter().rev().skip(1) {
            list.pop().unwrap();
            assert_eq!(list.hash_tree_root(), *expected);
        }
        assert_eq!(list.hash_tree_root(), ty.default_node().root());
    }

    #[test]
    fn test_append_after_collapse() {
        let ty = TypeDef::list(TypeDef::uint64(), 64).unwrap();
        let mut list = ListView::new(&ty, 0u64..9).unwrap();
        let reference = list.hash_tree_root();
        // 9 elements end with a lone element at the start of chunk 2.
        list.pop().unwrap();
        list.pop().unwrap();
        list.append(7u64).unwrap();
        list.append(8u64).unwrap();
        assert_eq!(list.hash_tree_root(), reference);
    }

    #[test]
    fn test_matches_direct_construction() {
        let ty = TypeDef::list(TypeDef::uint32(), 100).unwrap();
        let mut grown = ListView::new(&ty, Vec::<u32>::new()).unwrap();
        for i in 0..20u32 {
            grown.append(i * 3).unwrap();
        }
        let built = ListView::new(&ty, (0..20u32).map(|i| i * 3)).unwrap();
        assert_eq!(grown.hash_tree_root(), built.hash_tree_root());
    }

    #[test]
    fn test_rejects_bad_length_leaf() {
        let ty = bytes8();
        let backing = Node::pair(zero_node(0), length_leaf(9));
        assert!(ListView::from_backing(&ty, backing).is_err());
    }

    proptest! {
        #[test]
        fn prop_append_pop_inverse(
            values in proptest::collection::vec(any::<u16>(), 0..40),
            extra in any::<u16>(),
        ) {
            let ty = TypeDef::list(TypeDef::uint16(), 48).unwrap();
            let mut list = ListView::new(&ty, values.clone()).unwrap();
            let root = list.hash_tree_root();
            list.append(extra).unwrap();
            prop_assert_eq!(list.pop().unwrap().to_u64().unwrap(), extra as u64);
            prop_assert_eq!(list.hash_tree_root(), root);
            prop_assert_eq!(list.len(), values.len() as u64);
        }

        #[test]
        fn prop_packed_set_isolated(
            values in proptest::collection::vec(any::<u8>(), 1..64),
            pick in any::<prop::sample::Index>(),
            replacement in any::<u8>(),
        ) {
            let ty = TypeDef::byte_list(64).unwrap();
            let mut list = ListView::new(&ty, values.clone()).unwrap();
            let i = pick.index(values.len());
            list.set(i as u64, replacement).unwrap();
            for (j, original) in values.iter().enumerate() {
                let got = list.get(j as u64).unwrap().to_u64().unwrap();
                let expected = if j == i { replacement } else { *original };
                prop_assert_eq!(got, expected as u64);
            }
        }
    }
}
