use super::BYTES_PER_CHUNK;
use std::fmt;

/// Fixed-width scalar types. All of them pack several to a chunk when used
/// as List or Vector elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Uint256,
    Boolean,
}

impl BasicKind {
    /// Serialized width in bytes.
    pub const fn byte_length(self) -> usize {
        match self {
            BasicKind::Uint8 | BasicKind::Boolean => 1,
            BasicKind::Uint16 => 2,
            BasicKind::Uint32 => 4,
            BasicKind::Uint64 => 8,
            BasicKind::Uint128 => 16,
            BasicKind::Uint256 => 32,
        }
    }

    /// How many values of this kind share one 32-byte chunk.
    pub const fn elems_per_chunk(self) -> usize {
        BYTES_PER_CHUNK / self.byte_length()
    }

    pub const fn name(self) -> &'static str {
        match self {
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uint128 => "uint128",
            BasicKind::Uint256 => "uint256",
            BasicKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_factors() {
        assert_eq!(BasicKind::Uint8.elems_per_chunk(), 32);
        assert_eq!(BasicKind::Boolean.elems_per_chunk(), 32);
        assert_eq!(BasicKind::Uint16.elems_per_chunk(), 16);
        assert_eq!(BasicKind::Uint64.elems_per_chunk(), 4);
        assert_eq!(BasicKind::Uint256.elems_per_chunk(), 1);
    }
}
