//! Packed scalar views.
//!
//! A scalar on its own is a single chunk with its little-endian bytes at
//! offset 0. Inside a List or Vector it shares a chunk with its neighbours,
//! so it can also be written into, and read out of, a byte offset of an
//! existing chunk.

use crate::error::{Error, Result};
use crate::tree::{Node, Root};
use crate::types::{BasicKind, TypeDef, TypeRef, BYTES_PER_CHUNK};
use alloy_primitives::U256;

#[derive(Clone)]
pub struct BasicView {
    kind: BasicKind,
    ty: TypeRef,
    backing: Node,
}

impl BasicView {
    /// Build a scalar of type `ty` from its serialized little-endian bytes.
    pub fn new(ty: &TypeRef, bytes: &[u8]) -> Result<Self> {
        let kind = basic_kind_of(ty)?;
        if bytes.len() != kind.byte_length() {
            return Err(Error::decode(format!(
                "{} takes {} bytes, got {}",
                kind,
                kind.byte_length(),
                bytes.len()
            )));
        }
        if kind == BasicKind::Boolean && bytes[0] > 1 {
            return Err(Error::decode(format!("invalid boolean byte {:#04x}", bytes[0])));
        }
        Ok(Self::from_le(kind, ty.clone(), bytes))
    }

    /// The zero value of `ty`.
    pub fn default_of(ty: &TypeRef) -> Result<Self> {
        let kind = basic_kind_of(ty)?;
        Ok(Self::zero(kind, ty.clone()))
    }

    pub(crate) fn zero(kind: BasicKind, ty: TypeRef) -> Self {
        Self {
            kind,
            backing: ty.default_node(),
            ty,
        }
    }

    pub fn uint8(value: u8) -> Self {
        Self::from_le(BasicKind::Uint8, TypeDef::uint8(), &value.to_le_bytes())
    }

    pub fn uint16(value: u16) -> Self {
        Self::from_le(BasicKind::Uint16, TypeDef::uint16(), &value.to_le_bytes())
    }

    pub fn uint32(value: u32) -> Self {
        Self::from_le(BasicKind::Uint32, TypeDef::uint32(), &value.to_le_bytes())
    }

    pub fn uint64(value: u64) -> Self {
        Self::from_le(BasicKind::Uint64, TypeDef::uint64(), &value.to_le_bytes())
    }

    pub fn uint128(value: u128) -> Self {
        Self::from_le(BasicKind::Uint128, TypeDef::uint128(), &value.to_le_bytes())
    }

    pub fn uint256(value: U256) -> Self {
        Self::from_le(BasicKind::Uint256, TypeDef::uint256(), &value.to_le_bytes::<32>())
    }

    pub fn boolean(value: bool) -> Self {
        Self::from_le(BasicKind::Boolean, TypeDef::boolean(), &[value as u8])
    }

    /// Coerce an integer into scalar type `ty`, rejecting values that do not fit.
    pub fn from_u256(ty: &TypeRef, value: U256) -> Result<Self> {
        let kind = basic_kind_of(ty)?;
        let fits = match kind {
            BasicKind::Boolean => value <= U256::from(1u8),
            _ => value.bit_len() <= kind.byte_length() * 8,
        };
        if !fits {
            return Err(Error::TypeMismatch {
                expected: kind.to_string(),
                got: value.to_string(),
            });
        }
        let bytes = value.to_le_bytes::<32>();
        Ok(Self::from_le(kind, ty.clone(), &bytes[..kind.byte_length()]))
    }

    pub fn from_u64(ty: &TypeRef, value: u64) -> Result<Self> {
        Self::from_u256(ty, U256::from(value))
    }

    /// Read the scalar of type `ty` stored at byte `offset` of `chunk`.
    pub fn unpack(ty: &TypeRef, chunk: &Node, offset: usize) -> Result<Self> {
        let kind = basic_kind_of(ty)?;
        let end = checked_end(kind, offset)?;
        let content = chunk.root();
        Ok(Self::from_le(kind, ty.clone(), &content[offset..end]))
    }

    /// Return a copy of `chunk` with this scalar written at byte `offset`;
    /// the other bytes of the chunk are kept.
    pub fn pack_into(&self, chunk: &Node, offset: usize) -> Result<Node> {
        let end = checked_end(self.kind, offset)?;
        let mut content = chunk.root().0;
        content[offset..end].copy_from_slice(&self.chunk()[..self.kind.byte_length()]);
        Ok(Node::leaf_bytes(content))
    }

    fn from_le(kind: BasicKind, ty: TypeRef, bytes: &[u8]) -> Self {
        let mut chunk = [0u8; BYTES_PER_CHUNK];
        chunk[..bytes.len()].copy_from_slice(bytes);
        Self {
            kind,
            ty,
            backing: Node::leaf_bytes(chunk),
        }
    }

    pub(crate) fn from_backing(ty: &TypeRef, backing: Node) -> Result<Self> {
        let kind = basic_kind_of(ty)?;
        let mut view = Self {
            kind,
            ty: ty.clone(),
            backing: ty.default_node(),
        };
        view.set_backing(backing)?;
        Ok(view)
    }

    pub fn kind(&self) -> BasicKind {
        self.kind
    }

    pub fn type_def(&self) -> &TypeRef {
        &self.ty
    }

    pub fn backing(&self) -> &Node {
        &self.backing
    }

    /// Replace the backing chunk. A scalar is always a single leaf.
    pub fn set_backing(&mut self, node: Node) -> Result<()> {
        if !node.is_leaf() {
            return Err(Error::TypeMismatch {
                expected: format!("a single {} chunk", self.kind),
                got: "a pair node".to_string(),
            });
        }
        self.backing = node;
        Ok(())
    }

    pub fn hash_tree_root(&self) -> Root {
        self.backing.root()
    }

    fn chunk(&self) -> [u8; BYTES_PER_CHUNK] {
        self.backing.root().0
    }

    /// Serialized little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.chunk()[..self.kind.byte_length()].to_vec()
    }

    pub fn to_u256(&self) -> U256 {
        U256::from_le_bytes::<32>(self.chunk())
    }

    pub fn to_u128(&self) -> Result<u128> {
        let value = self.to_u256();
        if value.bit_len() > 128 {
            return Err(Error::TypeMismatch {
                expected: "u128".to_string(),
                got: value.to_string(),
            });
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.chunk()[..16]);
        Ok(u128::from_le_bytes(bytes))
    }

    pub fn to_u64(&self) -> Result<u64> {
        let value = self.to_u256();
        if value.bit_len() > 64 {
            return Err(Error::TypeMismatch {
                expected: "u64".to_string(),
                got: value.to_string(),
            });
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.chunk()[..8]);
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn to_bool(&self) -> Result<bool> {
        if self.kind != BasicKind::Boolean {
            return Err(Error::TypeMismatch {
                expected: BasicKind::Boolean.to_string(),
                got: self.kind.to_string(),
            });
        }
        match self.chunk()[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::decode(format!("invalid boolean byte {:#04x}", other))),
        }
    }
}

fn basic_kind_of(ty: &TypeRef) -> Result<BasicKind> {
    ty.basic_kind().ok_or_else(|| Error::TypeMismatch {
        expected: "a basic type".to_string(),
        got: ty.to_string(),
    })
}

fn checked_end(kind: BasicKind, offset: usize) -> Result<usize> {
    let end = offset + kind.byte_length();
    if end > BYTES_PER_CHUNK || offset % kind.byte_length() != 0 {
        return Err(Error::OutOfRange {
            index: offset as u64,
            length: BYTES_PER_CHUNK as u64,
        });
    }
    Ok(end)
}
