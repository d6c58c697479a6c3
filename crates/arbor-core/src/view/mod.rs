//! Typed views over tree nodes.
//!
//! A view pairs a [`Node`] (its backing) with the [`TypeRef`] that gives the
//! node meaning. Views are cheap to clone: cloning shares the whole tree.
//! Mutations replace the backing with a new tree that shares every
//! untouched subtree with the old one.

pub mod basic;
pub mod container;
pub mod list;
pub mod navigation;
pub mod vector;

pub use basic::BasicView;
pub use container::{ContainerBuilder, ContainerView};
pub use list::ListView;
pub use navigation::{Aggregate, Key, Position, SubView};
pub use vector::VectorView;

use crate::error::{Error, Result};
use crate::tree::{Node, Root};
use crate::types::{TypeKind, TypeRef};
use alloy_primitives::U256;
use std::fmt;

/// A view of any registered type.
#[derive(Clone)]
pub enum View {
    Basic(BasicView),
    List(ListView),
    Vector(VectorView),
    Container(ContainerView),
}

impl View {
    /// Interpret `node` as a value of type `ty`.
    pub fn from_backing(ty: &TypeRef, node: Node) -> Result<View> {
        Ok(match ty.kind() {
            TypeKind::Basic(_) => View::Basic(BasicView::from_backing(ty, node)?),
            TypeKind::List { .. } => View::List(ListView::from_backing(ty, node)?),
            TypeKind::Vector { .. } => View::Vector(VectorView::from_backing(ty, node)?),
            TypeKind::Container(_) => View::Container(ContainerView::from_backing(ty, node)?),
        })
    }

    /// The default value of `ty`.
    pub fn default_of(ty: &TypeRef) -> View {
        match ty.kind() {
            TypeKind::Basic(kind) => View::Basic(BasicView::zero(*kind, ty.clone())),
            TypeKind::List { elem, .. } => {
                View::List(ListView::from_parts(ty.clone(), elem.clone(), ty.default_node(), 0))
            }
            TypeKind::Vector { elem, .. } => {
                View::Vector(VectorView::from_parts(ty.clone(), elem.clone(), ty.default_node()))
            }
            TypeKind::Container(_) => {
                View::Container(ContainerView::from_parts(ty.clone(), ty.default_node()))
            }
        }
    }

    pub fn type_def(&self) -> &TypeRef {
        match self {
            View::Basic(v) => v.type_def(),
            View::List(v) => Aggregate::type_def(v),
            View::Vector(v) => Aggregate::type_def(v),
            View::Container(v) => Aggregate::type_def(v),
        }
    }

    pub fn backing(&self) -> &Node {
        match self {
            View::Basic(v) => v.backing(),
            View::List(v) => Aggregate::backing(v),
            View::Vector(v) => Aggregate::backing(v),
            View::Container(v) => Aggregate::backing(v),
        }
    }

    pub fn set_backing(&mut self, node: Node) -> Result<()> {
        match self {
            View::Basic(v) => v.set_backing(node),
            View::List(v) => Aggregate::set_backing(v, node),
            View::Vector(v) => Aggregate::set_backing(v, node),
            View::Container(v) => Aggregate::set_backing(v, node),
        }
    }

    /// The root commitment to this value.
    pub fn hash_tree_root(&self) -> Root {
        self.backing().root()
    }

    pub fn is_fixed_size(&self) -> bool {
        self.type_def().is_fixed_size()
    }

    pub fn as_basic(&self) -> Result<&BasicView> {
        match self {
            View::Basic(v) => Ok(v),
            other => Err(other.mismatch("a basic type")),
        }
    }

    pub fn as_list(&self) -> Result<&ListView> {
        match self {
            View::List(v) => Ok(v),
            other => Err(other.mismatch("a List")),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut ListView> {
        match self {
            View::List(v) => Ok(v),
            other => Err(other.mismatch("a List")),
        }
    }

    pub fn as_vector(&self) -> Result<&VectorView> {
        match self {
            View::Vector(v) => Ok(v),
            other => Err(other.mismatch("a Vector")),
        }
    }

    pub fn as_vector_mut(&mut self) -> Result<&mut VectorView> {
        match self {
            View::Vector(v) => Ok(v),
            other => Err(other.mismatch("a Vector")),
        }
    }

    pub fn as_container(&self) -> Result<&ContainerView> {
        match self {
            View::Container(v) => Ok(v),
            other => Err(other.mismatch("a Container")),
        }
    }

    pub fn as_container_mut(&mut self) -> Result<&mut ContainerView> {
        match self {
            View::Container(v) => Ok(v),
            other => Err(other.mismatch("a Container")),
        }
    }

    /// Shorthand for scalar views holding an integer that fits in a `u64`.
    pub fn to_u64(&self) -> Result<u64> {
        self.as_basic()?.to_u64()
    }

    pub fn to_bool(&self) -> Result<bool> {
        self.as_basic()?.to_bool()
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::TypeMismatch {
            expected: expected.to_string(),
            got: self.type_def().to_string(),
        }
    }

    fn no_keys(&self, key: Key<'_>) -> Error {
        Error::UnknownKey {
            key: key.to_string(),
            type_name: self.type_def().to_string(),
        }
    }
}

impl Aggregate for View {
    fn type_def(&self) -> &TypeRef {
        View::type_def(self)
    }

    fn backing(&self) -> &Node {
        View::backing(self)
    }

    fn set_backing(&mut self, node: Node) -> Result<()> {
        View::set_backing(self, node)
    }

    fn type_of(&self, key: Key<'_>) -> Result<TypeRef> {
        match self {
            View::Basic(_) => Err(self.no_keys(key)),
            View::List(v) => v.type_of(key),
            View::Vector(v) => v.type_of(key),
            View::Container(v) => v.type_of(key),
        }
    }

    fn static_gindex(&self, key: Key<'_>) -> Result<Position> {
        match self {
            View::Basic(_) => Err(self.no_keys(key)),
            View::List(v) => v.static_gindex(key),
            View::Vector(v) => v.static_gindex(key),
            View::Container(v) => v.static_gindex(key),
        }
    }
}

/// Structural equality: same type, same root.
impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        **self.type_def() == **other.type_def() && self.backing() == other.backing()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_def(), self.hash_tree_root())
    }
}

impl From<BasicView> for View {
    fn from(v: BasicView) -> Self {
        View::Basic(v)
    }
}

impl From<ListView> for View {
    fn from(v: ListView) -> Self {
        View::List(v)
    }
}

impl From<VectorView> for View {
    fn from(v: VectorView) -> Self {
        View::Vector(v)
    }
}

impl From<ContainerView> for View {
    fn from(v: ContainerView) -> Self {
        View::Container(v)
    }
}

/// Values that can be coerced into a view of a given type.
pub trait IntoView {
    fn into_view(self, ty: &TypeRef) -> Result<View>;
}

impl IntoView for View {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        if **self.type_def() != **ty {
            return Err(Error::TypeMismatch {
                expected: ty.to_string(),
                got: self.type_def().to_string(),
            });
        }
        Ok(self)
    }
}

impl IntoView for &View {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        self.clone().into_view(ty)
    }
}

macro_rules! impl_into_view_for_view {
    ($($view:ty),*) => {
        $(
            impl IntoView for $view {
                fn into_view(self, ty: &TypeRef) -> Result<View> {
                    View::from(self).into_view(ty)
                }
            }
        )*
    };
}

impl_into_view_for_view!(BasicView, ListView, VectorView, ContainerView);

macro_rules! impl_into_view_for_uint {
    ($($int:ty),*) => {
        $(
            impl IntoView for $int {
                fn into_view(self, ty: &TypeRef) -> Result<View> {
                    Ok(View::Basic(BasicView::from_u256(ty, U256::from(self))?))
                }
            }
        )*
    };
}

impl_into_view_for_uint!(u8, u16, u32, u64, u128);

impl IntoView for U256 {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        Ok(View::Basic(BasicView::from_u256(ty, self)?))
    }
}

impl IntoView for bool {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        if ty.basic_kind() != Some(crate::types::BasicKind::Boolean) {
            return Err(Error::TypeMismatch {
                expected: ty.to_string(),
                got: "bool".to_string(),
            });
        }
        Ok(View::Basic(BasicView::from_u64(ty, self as u64)?))
    }
}

/// Byte strings coerce into `List[uint8, N]` and `Vector[uint8, N]`.
impl IntoView for &[u8] {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        match ty.kind() {
            TypeKind::List { .. } if ty.is_byte_string() => Ok(View::List(ListView::from_bytes(ty, self)?)),
            TypeKind::Vector { .. } if ty.is_byte_string() => {
                Ok(View::Vector(VectorView::from_bytes(ty, self)?))
            }
            _ => Err(Error::TypeMismatch {
                expected: ty.to_string(),
                got: "byte string".to_string(),
            }),
        }
    }
}

impl IntoView for Vec<u8> {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        self.as_slice().into_view(ty)
    }
}

impl<const N: usize> IntoView for [u8; N] {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        self.as_slice().into_view(ty)
    }
}

impl IntoView for &serde_json::Value {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        View::from_obj(ty, self)
    }
}

impl IntoView for serde_json::Value {
    fn into_view(self, ty: &TypeRef) -> Result<View> {
        View::from_obj(ty, &self)
    }
}

/// Contents subtree of a List or Vector holding `views`, already coerced to
/// the element type, in order.
pub(crate) fn contents_from_views(ty: &TypeRef, views: &[View]) -> Result<Node> {
    let elem_is_basic = ty.elem_type().is_some_and(|elem| elem.is_basic());
    let nodes = if elem_is_basic {
        let mut bytes = Vec::new();
        for view in views {
            bytes.extend_from_slice(&view.as_basic()?.to_bytes());
        }
        pack_bytes(&bytes)
    } else {
        views.iter().map(|view| view.backing().clone()).collect()
    };
    crate::tree::fill_to_contents(nodes, ty.depth())
}

/// Chunk up serialized packed values; the packed chunk layout is exactly the
/// serialized byte layout, zero-padded to whole chunks.
pub(crate) fn pack_bytes(bytes: &[u8]) -> Vec<Node> {
    bytes
        .chunks(crate::types::BYTES_PER_CHUNK)
        .map(|piece| {
            let mut chunk = [0u8; crate::types::BYTES_PER_CHUNK];
            chunk[..piece.len()].copy_from_slice(piece);
            Node::leaf_bytes(chunk)
        })
        .collect()
}
