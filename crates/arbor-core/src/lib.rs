//! # Arbor Core
//!
//! Typed views over a persistent binary Merkle tree.
//!
//! Values (bounded lists, fixed vectors, named-field containers and the
//! scalars inside them) are stored as immutable trees of 32-byte chunks.
//! The root of a tree is the commitment to the value it holds. Every
//! mutation builds a new tree that shares all untouched subtrees with the
//! old one, so old versions stay valid and cheap to keep around.
//!
//! This crate contains **no networking code** and **no persistence layer**.
//! Bytes only enter or leave through the caller's `Read`/`Write` handles.
//!
//! ## Layers
//!
//! - **Tree** (`tree` module): nodes, generalized indices, zero subtrees,
//!   bulk construction and Merkle branches.
//! - **Types** (`types` module): type descriptors registered once, carrying
//!   depth, packing and size bounds.
//! - **Views** (`view` module): typed handles over nodes, with key-based
//!   navigation, copy-on-write mutation and live sub-views.
//! - **Codec** and **object representation**: the wire format with its
//!   offset tables, and a JSON round trip.
//!
//! ## Usage
//!
//! ```ignore
//! use arbor_core::{ListView, TypeDef, View};
//!
//! let ty = TypeDef::byte_list(8)?;
//! let mut list = ListView::new(&ty, [1u8, 2])?;
//! list.append(3u8)?;
//! let bytes = View::from(list).encode_bytes()?;
//! ```

pub mod codec;
pub mod error;
pub mod iter;
pub mod repr;
pub mod tree;
pub mod types;
pub mod view;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use iter::{ElementIter, FieldIter, NodeWalker};
pub use tree::{
    gindex_of, merkle_hash, path_depth, verify_gindex_branch, verify_merkle_branch, zero_hash, zero_node, Gindex,
    Node, Root, Side,
};
pub use types::{BasicKind, TypeDef, TypeKind, TypeRef};
pub use view::{
    Aggregate, BasicView, ContainerBuilder, ContainerView, IntoView, Key, ListView, Position, SubView, VectorView,
    View,
};
