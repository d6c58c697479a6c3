use thiserror::Error;

/// Result type alias for arbor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, navigating, mutating or decoding views.
/// Each variant names one specific failure; nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Navigation error: gindex {gindex} runs below a leaf at depth {depth}")]
    Navigation { gindex: u64, depth: u32 },

    #[error("Index {index} out of range for length {length}")]
    OutOfRange { index: u64, length: u64 },

    #[error("Unknown key {key} for {type_name}")]
    UnknownKey { key: String, type_name: String },

    #[error("Capacity error: {0}")]
    Capacity(String),

    #[error("Cannot pop from empty {0}")]
    EmptyCollection(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid type definition: {0}")]
    InvalidType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(%reason, "rejecting encoded value");
        Error::Decode(reason)
    }

    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Error::Parse(reason.into())
    }
}
