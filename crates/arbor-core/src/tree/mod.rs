pub mod build;
pub mod gindex;
pub mod node;
pub mod proof;

pub use build::{fill_to_contents, fill_to_length, zero_hash, zero_node};
pub use gindex::{gindex_of, path_depth, Gindex, MAX_TREE_DEPTH};
pub use node::{merkle_hash, Node, Root, Side};
pub use proof::{verify_gindex_branch, verify_merkle_branch};
