//! Containers: fixed, ordered, named fields. Every field owns one subtree
//! at `gindex_of(field_index, depth)`; scalar fields are never packed.

use super::navigation::{Aggregate, Key, Position};
use super::{IntoView, View};
use crate::error::{Error, Result};
use crate::iter::FieldIter;
use crate::tree::{fill_to_contents, gindex_of, Node};
use crate::types::{ContainerDef, TypeRef};

#[derive(Clone)]
pub struct ContainerView {
    ty: TypeRef,
    backing: Node,
}

impl ContainerView {
    /// Build a container from named field views. Fields left out keep
    /// their default value.
    pub fn new<N, I>(ty: &TypeRef, fields: I) -> Result<Self>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, View)>,
    {
        let mut builder = Self::builder(ty)?;
        for (name, view) in fields {
            builder = builder.field(name.as_ref(), view)?;
        }
        builder.build()
    }

    /// Start building a container of type `ty` field by field.
    pub fn builder(ty: &TypeRef) -> Result<ContainerBuilder> {
        let def = container_def(ty)?;
        Ok(ContainerBuilder {
            ty: ty.clone(),
            nodes: def.fields().iter().map(|f| f.ty.default_node()).collect(),
        })
    }

    pub(crate) fn from_parts(ty: TypeRef, backing: Node) -> Self {
        Self { ty, backing }
    }

    pub(crate) fn from_backing(ty: &TypeRef, backing: Node) -> Result<Self> {
        container_def(ty)?;
        Ok(Self::from_parts(ty.clone(), backing))
    }

    pub fn get(&self, name: &str) -> Result<View> {
        self.get_key(Key::Field(name))
    }

    pub fn set<V: IntoView>(&mut self, name: &str, value: V) -> Result<()> {
        self.set_key(Key::Field(name), value)
    }

    /// Readonly iteration over `(name, value)` in declared order.
    pub fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(self)
    }

    fn field_index(&self, key: Key<'_>) -> Result<usize> {
        let def = container_def(&self.ty)?;
        let index = match key {
            Key::Field(name) => def.field_index(name),
            Key::Index(index) => usize::try_from(index).ok().filter(|i| *i < def.len()),
        };
        index.ok_or_else(|| Error::UnknownKey {
            key: key.to_string(),
            type_name: self.ty.to_string(),
        })
    }
}

impl Aggregate for ContainerView {
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
        let index = self.field_index(key)?;
        Ok(container_def(&self.ty)?.fields()[index].ty.clone())
    }

    fn static_gindex(&self, key: Key<'_>) -> Result<Position> {
        let index = self.field_index(key)?;
        Ok(Position {
            gindex: gindex_of(index as u64, self.ty.depth())?,
            offset: None,
        })
    }
}

/// Field-by-field construction of a [`ContainerView`].
pub struct ContainerBuilder {
    ty: TypeRef,
    nodes: Vec<Node>,
}

impl ContainerBuilder {
    /// Set one field, coercing `value` to the field's declared type.
    pub fn field<V: IntoView>(mut self, name: &str, value: V) -> Result<Self> {
        let def = container_def(&self.ty)?;
        let index = def.field_index(name).ok_or_else(|| Error::UnknownKey {
            key: name.to_string(),
            type_name: self.ty.to_string(),
        })?;
        let view = value.into_view(&def.fields()[index].ty)?;
        self.nodes[index] = view.backing().clone();
        Ok(self)
    }

    pub fn build(self) -> Result<ContainerView> {
        let backing = fill_to_contents(self.nodes, self.ty.depth())?;
        Ok(ContainerView::from_parts(self.ty, backing))
    }
}

fn container_def(ty: &TypeRef) -> Result<&ContainerDef> {
    ty.as_container().ok_or_else(|| Error::TypeMismatch {
        expected: "a Container type".to_string(),
        got: ty.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::merkle_hash;
    use crate::types::TypeDef;
    use crate::view::{BasicView, ListView};

    fn sample_type() -> TypeRef {
        TypeDef::container(
            "Sample",
            [
                ("a", TypeDef::uint8()),
                ("b", TypeDef::byte_list(16).unwrap()),
                ("c", TypeDef::boolean()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_builder_defaults_missing_fields() {
        let ty = sample_type();
        let c = ContainerView::builder(&ty).unwrap().field("a", 7u8).unwrap().build().unwrap();
        assert_eq!(c.get("a").unwrap().to_u64().unwrap(), 7);
        assert!(c.get("b").unwrap().as_list().unwrap().is_empty());
        assert!(!c.get("c").unwrap().to_bool().unwrap());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let ty = sample_type();
        let result = ContainerView::builder(&ty).unwrap().field("zzz", 1u8);
        assert!(matches!(result, Err(Error::UnknownKey { .. })));

        let c = View::default_of(&ty);
        assert!(matches!(
            c.as_container().unwrap().get("zzz"),
            Err(Error::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_root_is_merkle_of_fields() {
        let ty = TypeDef::container("Two", [("x", TypeDef::uint64()), ("y", TypeDef::uint64())]).unwrap();
        let c = ContainerView::new(
            &ty,
            [
                ("x", View::from(BasicView::uint64(1))),
                ("y", View::from(BasicView::uint64(2))),
            ],
        )
        .unwrap();
        let expected = merkle_hash(
            &BasicView::uint64(1).hash_tree_root(),
            &BasicView::uint64(2).hash_tree_root(),
        );
        assert_eq!(c.hash_tree_root(), expected);
    }

    #[test]
    fn test_set_field_type_checked() {
        let ty = sample_type();
        let mut c = ContainerView::builder(&ty).unwrap().build().unwrap();
        c.set("b", vec![1u8, 2, 3]).unwrap();
        assert_eq!(c.get("b").unwrap().as_list().unwrap().len(), 3);
        assert!(c.set("c", 5u8).is_err());
        assert!(c.set("a", true).is_err());
    }

    #[test]
    fn test_index_keys() {
        let ty = sample_type();
        let c = View::default_of(&ty);
        let container = c.as_container().unwrap();
        assert_eq!(container.type_of(Key::Index(1)).unwrap(), TypeDef::byte_list(16).unwrap());
        assert!(container.type_of(Key::Index(3)).is_err());
    }

    #[test]
    fn test_sub_view_writes_back() {
        let ty = sample_type();
        let mut c = ContainerView::builder(&ty).unwrap().build().unwrap();
        {
            let mut field = c.sub_view("b").unwrap();
            field.as_list_mut().unwrap().append(9u8).unwrap();
        }
        let b = c.get("b").unwrap();
        assert_eq!(b.as_list().unwrap().get(0).unwrap().to_u64().unwrap(), 9);

        let expected = ListView::new(&TypeDef::byte_list(16).unwrap(), [9u8]).unwrap();
        assert_eq!(b.hash_tree_root(), expected.hash_tree_root());
    }

    #[test]
    fn test_nested_sub_views_propagate() {
        let inner = sample_type();
        let outer = TypeDef::container("Outer", [("inner", inner), ("n", TypeDef::uint32())]).unwrap();
        let mut root = View::default_of(&outer);
        let before = root.hash_tree_root();
        {
            let mut inner = root.sub_view("inner").unwrap();
            let mut bytes = inner.sub_view("b").unwrap();
            bytes.as_list_mut().unwrap().append(1u8).unwrap();
            bytes.commit().unwrap();
        }
        assert_ne!(root.hash_tree_root(), before);
        let inner = root.get_key(Key::Field("inner")).unwrap();
        let b = inner.as_container().unwrap().get("b").unwrap();
        assert_eq!(b.as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_sub_view_rejects_retyped_value() {
        let ty = sample_type();
        let mut c = ContainerView::builder(&ty).unwrap().build().unwrap();
        let mut field = c.sub_view("a").unwrap();
        *field = View::from(BasicView::uint64(3));
        assert!(matches!(field.commit(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_failed_drop_write_back_keeps_owner() {
        let ty = sample_type();
        let mut c = ContainerView::builder(&ty).unwrap().build().unwrap();
        let before = c.backing().clone();
        {
            let mut field = c.sub_view("a").unwrap();
            *field = View::from(BasicView::uint64(3));
        }
        assert!(c.backing().ptr_eq(&before));
    }
}
