use super::TypeRef;
use std::collections::HashMap;

/// One declared Container field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

/// The field table of a Container type: declared order plus a name index,
/// both built once when the type is registered.
#[derive(Clone, Debug)]
pub struct ContainerDef {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl ContainerDef {
    pub(super) fn new(name: String, fields: Vec<Field>, index: HashMap<String, usize>) -> Self {
        Self { name, fields, index }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: a Container without fields cannot be registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

impl PartialEq for ContainerDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl Eq for ContainerDef {}
