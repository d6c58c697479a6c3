//! Fixed-length vectors. The backing is the bare contents subtree.

use super::navigation::{Aggregate, Key, Position};
use super::{contents_from_views, pack_bytes, IntoView, View};
use crate::error::{Error, Result};
use crate::iter::ElementIter;
use crate::tree::{fill_to_contents, gindex_of, Node};
use crate::types::{TypeKind, TypeRef};

#[derive(Clone)]
pub struct VectorView {
    ty: TypeRef,
    elem: TypeRef,
    backing: Node,
}

impl VectorView {
    /// Build a vector from exactly `length` values, or from none at all for
    /// the default value.
    pub fn new<I>(ty: &TypeRef, items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: IntoView,
    {
        let (elem, length) = vector_params(ty)?;
        let mut views = Vec::new();
        for item in items {
            if views.len() as u64 >= length {
                return Err(arity_error(ty, length, views.len() as u64 + 1));
            }
            views.push(item.into_view(elem)?);
        }
        if views.is_empty() {
            return Ok(Self::from_parts(ty.clone(), elem.clone(), ty.default_node()));
        }
        if views.len() as u64 != length {
            return Err(arity_error(ty, length, views.len() as u64));
        }
        let contents = contents_from_views(ty, &views)?;
        Ok(Self::from_parts(ty.clone(), elem.clone(), contents))
    }

    /// Build a byte-string vector directly from its bytes.
    pub fn from_bytes(ty: &TypeRef, bytes: &[u8]) -> Result<Self> {
        let (elem, length) = vector_params(ty)?;
        if !ty.is_byte_string() {
            return Err(Error::TypeMismatch {
                expected: "a byte string type".to_string(),
                got: ty.to_string(),
            });
        }
        if bytes.len() as u64 != length {
            return Err(arity_error(ty, length, bytes.len() as u64));
        }
        let contents = fill_to_contents(pack_bytes(bytes), ty.depth())?;
        Ok(Self::from_parts(ty.clone(), elem.clone(), contents))
    }

    pub(crate) fn from_parts(ty: TypeRef, elem: TypeRef, backing: Node) -> Self {
        Self { ty, elem, backing }
    }

    pub(crate) fn from_backing(ty: &TypeRef, backing: Node) -> Result<Self> {
        let (elem, _) = vector_params(ty)?;
        Ok(Self::from_parts(ty.clone(), elem.clone(), backing))
    }

    pub fn len(&self) -> u64 {
        self.ty.capacity()
    }

    /// Always false: zero-length vectors cannot be registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn elem_type(&self) -> &TypeRef {
        &self.elem
    }

    pub fn get(&self, index: u64) -> Result<View> {
        self.check_index(index)?;
        self.get_key(Key::Index(index))
    }

    pub fn set<V: IntoView>(&mut self, index: u64, value: V) -> Result<()> {
        self.check_index(index)?;
        self.set_key(Key::Index(index), value)
    }

    pub fn iter(&self) -> ElementIter {
        ElementIter::new(&self.elem, self.backing.clone(), self.ty.depth(), self.len())
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.len() {
            return Err(Error::OutOfRange {
                index,
                length: self.len(),
            });
        }
        Ok(())
    }
}

impl Aggregate for VectorView {
    fn type_def(&self) -> &TypeRef {
        &self.ty
    }

    fn backing(&self) -> &Node {
        &self.backing
    }

    fn set_backing(&mut self, node: Node) -> Result<()> {
        self.backing = node;
        Ok(())
    }

    fn type_of(&self, key: Key<'_>) -> Result<TypeRef> {
        self.static_gindex(key)?;
        Ok(self.elem.clone())
    }

    fn static_gindex(&self, key: Key<'_>) -> Result<Position> {
        let index = match key {
            Key::Index(index) if index < self.len() => index,
            _ => {
                return Err(Error::UnknownKey {
                    key: key.to_string(),
                    type_name: self.ty.to_string(),
                })
            }
        };
        let per_chunk = self.ty.elems_per_chunk() as u64;
        Ok(Position {
            gindex: gindex_of(index / per_chunk, self.ty.depth())?,
            offset: self
                .elem
                .basic_kind()
                .map(|kind| (index % per_chunk) as usize * kind.byte_length()),
        })
    }
}

impl<'a> IntoIterator for &'a VectorView {
    type Item = Result<View>;
    type IntoIter = ElementIter;

    fn into_iter(self) -> ElementIter {
        self.iter()
    }
}

fn vector_params(ty: &TypeRef) -> Result<(&TypeRef, u64)> {
    match ty.kind() {
        TypeKind::Vector { elem, length } => Ok((elem, *length)),
        _ => Err(Error::TypeMismatch {
            expected: "a Vector type".to_string(),
            got: ty.to_string(),
        }),
    }
}

fn arity_error(ty: &TypeRef, length: u64, got: u64) -> Error {
    Error::Capacity(format!("{} takes exactly {} elements, got {}", ty, length, got))
}
