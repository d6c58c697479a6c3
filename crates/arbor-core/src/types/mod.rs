//! Type descriptors.
//!
//! A descriptor is created once, at type registration, and fixes everything
//! static about the type: packing, element or field types, tree depth, byte
//! length bounds and the default tree. Views share descriptors through
//! [`TypeRef`].

pub mod basic;
pub mod container;

pub use basic::BasicKind;
pub use container::{ContainerDef, Field};

use crate::error::{Error, Result};
use crate::tree::{fill_to_contents, fill_to_length, path_depth, zero_node, Node, MAX_TREE_DEPTH};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Number of bytes in a chunk, the leaf unit of the tree.
pub const BYTES_PER_CHUNK: usize = 32;

/// Width of every offset in the variable-size wire format.
pub const OFFSET_BYTE_LENGTH: usize = 4;

/// Bytes of the little-endian length value in a List's length leaf.
pub const BYTES_PER_LENGTH_LEAF: usize = 32;

/// Shared handle to a registered type.
pub type TypeRef = Arc<TypeDef>;

/// What kind of value a type describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Basic(BasicKind),
    List { elem: TypeRef, limit: u64 },
    Vector { elem: TypeRef, length: u64 },
    Container(ContainerDef),
}

/// A registered type with its precomputed static facts.
pub struct TypeDef {
    kind: TypeKind,
    depth: u32,
    fixed_size: Option<usize>,
    min_size: usize,
    max_size: usize,
    default: Node,
}

impl TypeDef {
    pub fn basic(kind: BasicKind) -> TypeRef {
        let size = kind.byte_length();
        Arc::new(TypeDef {
            kind: TypeKind::Basic(kind),
            depth: 0,
            fixed_size: Some(size),
            min_size: size,
            max_size: size,
            default: zero_node(0),
        })
    }

    pub fn uint8() -> TypeRef {
        Self::basic(BasicKind::Uint8)
    }

    pub fn uint16() -> TypeRef {
        Self::basic(BasicKind::Uint16)
    }

    pub fn uint32() -> TypeRef {
        Self::basic(BasicKind::Uint32)
    }

    pub fn uint64() -> TypeRef {
        Self::basic(BasicKind::Uint64)
    }

    pub fn uint128() -> TypeRef {
        Self::basic(BasicKind::Uint128)
    }

    pub fn uint256() -> TypeRef {
        Self::basic(BasicKind::Uint256)
    }

    pub fn boolean() -> TypeRef {
        Self::basic(BasicKind::Boolean)
    }

    /// A variable-length List of at most `limit` elements.
    pub fn list(elem: TypeRef, limit: u64) -> Result<TypeRef> {
        let depth = contents_depth(&elem, limit);
        if depth > MAX_TREE_DEPTH {
            return Err(Error::Capacity(format!(
                "List[{}, {}] needs a tree of depth {}, more than {}",
                elem, limit, depth, MAX_TREE_DEPTH
            )));
        }
        let limit_bytes = usize::try_from(limit).unwrap_or(usize::MAX);
        let max_size = match elem.fixed_size {
            Some(size) => limit_bytes.saturating_mul(size),
            None => limit_bytes.saturating_mul(OFFSET_BYTE_LENGTH.saturating_add(elem.max_size)),
        };
        let default = Node::pair(zero_node(depth), zero_node(0));
        Ok(Arc::new(TypeDef {
            kind: TypeKind::List { elem, limit },
            depth,
            fixed_size: None,
            min_size: 0,
            max_size,
            default,
        }))
    }

    /// A fixed-length Vector of exactly `length` elements.
    pub fn vector(elem: TypeRef, length: u64) -> Result<TypeRef> {
        if length == 0 {
            return Err(Error::Capacity(format!(
                "Vector[{}, 0] must have at least one element",
                elem
            )));
        }
        let depth = contents_depth(&elem, length);
        if depth > MAX_TREE_DEPTH {
            return Err(Error::Capacity(format!(
                "Vector[{}, {}] needs a tree of depth {}, more than {}",
                elem, length, depth, MAX_TREE_DEPTH
            )));
        }
        let count = usize::try_from(length).unwrap_or(usize::MAX);
        let (fixed_size, min_size, max_size) = match elem.fixed_size {
            Some(size) => {
                let total = count.saturating_mul(size);
                (Some(total), total, total)
            }
            None => (
                None,
                count.saturating_mul(OFFSET_BYTE_LENGTH + elem.min_size),
                count.saturating_mul(OFFSET_BYTE_LENGTH.saturating_add(elem.max_size)),
            ),
        };
        let default = if elem.is_basic() {
            zero_node(depth)
        } else {
            fill_to_length(&elem.default, depth, length)?
        };
        Ok(Arc::new(TypeDef {
            kind: TypeKind::Vector { elem, length },
            depth,
            fixed_size,
            min_size,
            max_size,
            default,
        }))
    }

    /// A Container with the given fields, in declared order.
    pub fn container<N, I>(name: impl Into<String>, fields: I) -> Result<TypeRef>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, TypeRef)>,
    {
        let name = name.into();
        let fields: Vec<Field> = fields
            .into_iter()
            .map(|(field_name, ty)| Field {
                name: field_name.into(),
                ty,
            })
            .collect();
        if fields.is_empty() {
            return Err(Error::Capacity(format!(
                "Container {} must declare at least one field",
                name
            )));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(Error::InvalidType(format!(
                    "Container {} declares field {} twice",
                    name, field.name
                )));
            }
        }

        let depth = path_depth(fields.len() as u64);
        let mut fixed_total = 0usize;
        let mut min_size = 0usize;
        let mut max_size = 0usize;
        let mut all_fixed = true;
        for field in &fields {
            match field.ty.fixed_size {
                Some(size) => {
                    fixed_total = fixed_total.saturating_add(size);
                    min_size = min_size.saturating_add(size);
                    max_size = max_size.saturating_add(size);
                }
                None => {
                    all_fixed = false;
                    min_size = min_size.saturating_add(OFFSET_BYTE_LENGTH + field.ty.min_size);
                    max_size = max_size
                        .saturating_add(OFFSET_BYTE_LENGTH)
                        .saturating_add(field.ty.max_size);
                }
            }
        }
        let fixed_size = all_fixed.then_some(fixed_total);
        let default = fill_to_contents(fields.iter().map(|f| f.ty.default.clone()).collect(), depth)?;

        Ok(Arc::new(TypeDef {
            kind: TypeKind::Container(ContainerDef::new(name, fields, index)),
            depth,
            fixed_size,
            min_size,
            max_size,
            default,
        }))
    }

    /// `Vector[uint8, length]`, a fixed-size byte string.
    pub fn byte_vector(length: u64) -> Result<TypeRef> {
        Self::vector(Self::uint8(), length)
    }

    /// `List[uint8, limit]`, a bounded byte string.
    pub fn byte_list(limit: u64) -> Result<TypeRef> {
        Self::list(Self::uint8(), limit)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn basic_kind(&self) -> Option<BasicKind> {
        match self.kind {
            TypeKind::Basic(kind) => Some(kind),
            _ => None,
        }
    }

    /// Basic types are packed: they may share a chunk with siblings.
    pub fn is_basic(&self) -> bool {
        self.basic_kind().is_some()
    }

    /// Element type of a List or Vector.
    pub fn elem_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeKind::List { elem, .. } | TypeKind::Vector { elem, .. } => Some(elem),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerDef> {
        match &self.kind {
            TypeKind::Container(def) => Some(def),
            _ => None,
        }
    }

    /// A List or Vector of single bytes, represented as a raw byte string.
    pub fn is_byte_string(&self) -> bool {
        self.elem_type()
            .and_then(|elem| elem.basic_kind())
            .is_some_and(|kind| kind == BasicKind::Uint8)
    }

    /// Maximum number of elements or fields: List limit, Vector length,
    /// Container field count, 1 for a scalar.
    pub fn capacity(&self) -> u64 {
        match &self.kind {
            TypeKind::Basic(_) => 1,
            TypeKind::List { limit, .. } => *limit,
            TypeKind::Vector { length, .. } => *length,
            TypeKind::Container(def) => def.len() as u64,
        }
    }

    /// Depth of the contents tree. For a List this excludes the length
    /// mix-in, see [`TypeDef::tree_depth`].
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Depth of the whole backing tree.
    pub fn tree_depth(&self) -> u32 {
        match self.kind {
            TypeKind::List { .. } => self.depth + 1,
            _ => self.depth,
        }
    }

    /// Number of values packed into one chunk of this aggregate's contents:
    /// more than one only for Lists and Vectors of basic elements.
    pub fn elems_per_chunk(&self) -> usize {
        self.elem_type()
            .and_then(|elem| elem.basic_kind())
            .map_or(1, BasicKind::elems_per_chunk)
    }

    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size.is_some()
    }

    /// Encoded length of every value of this type; fails if it varies.
    pub fn fixed_byte_length(&self) -> Result<usize> {
        self.fixed_size.ok_or_else(|| {
            Error::InvalidType(format!("{} has no fixed byte length", self))
        })
    }

    pub fn min_byte_length(&self) -> usize {
        self.min_size
    }

    pub fn max_byte_length(&self) -> usize {
        self.max_size
    }

    /// Backing of this type's default (all-zero / empty) value.
    pub fn default_node(&self) -> Node {
        self.default.clone()
    }
}

fn contents_depth(elem: &TypeDef, capacity: u64) -> u32 {
    let chunks = match elem.basic_kind() {
        Some(kind) => capacity.div_ceil(kind.elems_per_chunk() as u64),
        None => capacity,
    };
    path_depth(chunks)
}

impl PartialEq for TypeDef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.kind == other.kind
    }
}

impl Eq for TypeDef {}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Basic(kind) => write!(f, "{}", kind),
            TypeKind::List { elem, limit } => write!(f, "List[{}, {}]", elem, limit),
            TypeKind::Vector { elem, length } => write!(f, "Vector[{}, {}]", elem, length),
            TypeKind::Container(def) => f.write_str(def.name()),
        }
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDef({})", self)
    }
}
