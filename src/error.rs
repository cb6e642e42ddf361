use thiserror::Error;

/// Syntax errors raised while decoding bencode. Every variant records the
/// byte offset at which decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed string length at offset {offset}")]
    MalformedLength { offset: usize },

    #[error("malformed integer at offset {offset}")]
    MalformedInteger { offset: usize },

    #[error("integer out of 64-bit range at offset {offset}")]
    IntegerOverflow { offset: usize },

    #[error("input truncated at offset {offset}")]
    TruncatedInput { offset: usize },

    #[error("dictionary key at offset {offset} is not a byte string")]
    InvalidKeyType { offset: usize },

    #[error("unknown value type {byte:#04x} at offset {offset}")]
    UnknownValueType { byte: u8, offset: usize },

    #[error("nesting too deep at offset {offset}")]
    NestingTooDeep { offset: usize },

    #[error("trailing data after value at offset {offset}")]
    TrailingData { offset: usize },
}

/// Errors that can occur when extracting torrent metainfo.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The document is not valid bencode.
    #[error("bencode error: {0}")]
    Decode(#[from] DecodeError),

    /// A required field is missing or has the wrong type.
    #[error("invalid metainfo: {0}")]
    InvalidMetainfo(&'static str),

    /// `pieces` is not a whole number of 20-byte digests.
    #[error("piece table length {0} is not a multiple of 20")]
    MalformedPieceTable(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("bencode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker failure: {0}")]
    Failure(String),

    #[error("invalid tracker response: {0}")]
    InvalidResponse(&'static str),

    #[error("compact peer list length {0} is not a multiple of 6")]
    MalformedPeers(usize),
}
