//! Key-based navigation shared by List, Vector and Container views.
//!
//! Every aggregate maps a logical key to a [`Position`] in its backing tree.
//! Reading and writing elements, handing out live sub-views and producing
//! Merkle proofs are all written once here in terms of that mapping.

use super::{BasicView, IntoView, View};
use crate::error::{Error, Result};
use crate::tree::{Gindex, Node, Root};
use crate::types::TypeRef;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A logical key: an element index, or a Container field name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    Index(u64),
    Field(&'a str),
}

impl From<u64> for Key<'_> {
    fn from(index: u64) -> Self {
        Key::Index(index)
    }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Key::Index(index as u64)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Field(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Key::Field(name)
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Field(name) => f.write_str(name),
        }
    }
}

/// Where a key's value lives: the chunk gindex relative to the aggregate's
/// backing and, for packed elements, the byte offset inside that chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub gindex: Gindex,
    pub offset: Option<usize>,
}

/// The navigation contract of List, Vector and Container views.
pub trait Aggregate {
    fn type_def(&self) -> &TypeRef;

    fn backing(&self) -> &Node;

    fn set_backing(&mut self, node: Node) -> Result<()>;

    /// Static type of the element or field at `key`.
    fn type_of(&self, key: Key<'_>) -> Result<TypeRef>;

    /// Gindex (and in-chunk offset, when packed) of `key`.
    fn static_gindex(&self, key: Key<'_>) -> Result<Position>;

    fn hash_tree_root(&self) -> Root {
        self.backing().root()
    }

    /// Read one element or field.
    fn get_key(&self, key: Key<'_>) -> Result<View> {
        let ty = self.type_of(key)?;
        let position = self.static_gindex(key)?;
        let node = self.backing().get(position.gindex)?;
        match position.offset {
            Some(offset) => Ok(View::Basic(BasicView::unpack(&ty, &node, offset)?)),
            None => View::from_backing(&ty, node),
        }
    }

    /// Write one element or field, coercing `value` to its declared type.
    fn set_key<V: IntoView>(&mut self, key: Key<'_>, value: V) -> Result<()>
    where
        Self: Sized,
    {
        let ty = self.type_of(key)?;
        let position = self.static_gindex(key)?;
        let view = value.into_view(&ty)?;
        self.rebind(position, &view)
    }

    /// Write `view`'s backing back at `position`.
    fn rebind(&mut self, position: Position, view: &View) -> Result<()> {
        let replacement = match position.offset {
            Some(offset) => {
                let chunk = self.backing().get(position.gindex)?;
                view.as_basic()?.pack_into(&chunk, offset)?
            }
            None => view.backing().clone(),
        };
        let backing = self.backing().set(position.gindex, replacement, false)?;
        self.set_backing(backing)
    }

    /// A live nested view. Changes made through it are written back into
    /// this aggregate when the returned guard is dropped.
    ///
    /// A write-back that fails on drop is only logged, and this aggregate
    /// keeps its previous backing. Call [`SubView::commit`] to receive that
    /// error instead.
    fn sub_view<'k>(&mut self, key: impl Into<Key<'k>>) -> Result<SubView<'_, Self>>
    where
        Self: Sized,
    {
        let key = key.into();
        let expected = self.type_of(key)?;
        let view = self.get_key(key)?;
        let position = self.static_gindex(key)?;
        Ok(SubView {
            original: view.backing().clone(),
            owner: self,
            position,
            expected,
            view,
        })
    }

    /// Merkle branch proving the chunk that holds `key` against this view's
    /// root. Returns the chunk's gindex with the sibling roots.
    fn prove(&self, key: Key<'_>) -> Result<(Gindex, Vec<Root>)> {
        let position = self.static_gindex(key)?;
        Ok((position.gindex, self.backing().branch(position.gindex)?))
    }
}

/// A nested view borrowed out of its owner. The owner back-reference and
/// key travel with it; dropping the guard sends the new backing to
/// [`Aggregate::rebind`] on the owner, which may itself be a sub-view and
/// so propagate further up.
pub struct SubView<'a, A: Aggregate> {
    owner: &'a mut A,
    position: Position,
    expected: TypeRef,
    original: Node,
    view: View,
}

impl<A: Aggregate> SubView<'_, A> {
    pub fn position(&self) -> Position {
        self.position
    }

    /// Write back now and surface any error, instead of on drop.
    pub fn commit(mut self) -> Result<()> {
        let result = self.write_back();
        self.original = self.view.backing().clone();
        result
    }

    fn write_back(&mut self) -> Result<()> {
        if self.view.backing().ptr_eq(&self.original) {
            return Ok(());
        }
        if **self.view.type_def() != *self.expected {
            return Err(Error::TypeMismatch {
                expected: self.expected.to_string(),
                got: self.view.type_def().to_string(),
            });
        }
        self.owner.rebind(self.position, &self.view)
    }
}

impl<A: Aggregate> Deref for SubView<'_, A> {
    type Target = View;

    fn deref(&self) -> &View {
        &self.view
    }
}

impl<A: Aggregate> DerefMut for SubView<'_, A> {
    fn deref_mut(&mut self) -> &mut View {
        &mut self.view
    }
}

impl<A: Aggregate> Drop for SubView<'_, A> {
    fn drop(&mut self) {
        if let Err(err) = self.write_back() {
            tracing::error!(%err, gindex = %self.position.gindex, "failed to write sub-view back into its owner");
        }
    }
}
