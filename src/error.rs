//! Error types for the Imprint binary row format.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImprintError>;

/// Closed set of failure modes for decode/compose/project operations.
///
/// Every variant that arises from untrusted bytes carries enough context
/// (byte offset, field id, or the offending value) to let a caller log or
/// display a precise diagnosis without panicking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImprintError {
    #[error("bad magic byte at offset {offset}: expected 0x49, got {found:#04x}")]
    BadMagic { offset: usize, found: u8 },

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("reserved header flag bits set: {0:#010b}")]
    ReservedFlagSet(u8),

    #[error("malformed varint at offset {offset}: {reason}")]
    MalformedVarint { offset: usize, reason: &'static str },

    #[error("directory entries not strictly ascending by field_id at index {index}")]
    DirectoryUnsorted { index: usize },

    #[error("duplicate field id {0} rejected by builder")]
    DuplicateFieldId(u32),

    #[error("truncated input: need at least {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown type code {0:#04x}")]
    UnknownType(u8),

    #[error("invalid UTF-8 in string value at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid map key type code {0:#04x}: must be int32, int64, bytes, or string")]
    InvalidMapKeyType(u8),

    #[error("fieldspace mismatch: {a} != {b}")]
    FieldspaceMismatch { a: u32, b: u32 },

    #[error("type mismatch on field {field_id} during composition: {a:?} != {b:?}")]
    TypeMismatch {
        field_id: u32,
        a: crate::value::TypeCode,
        b: crate::value::TypeCode,
    },

    #[error("row nesting exceeds configured depth limit of {limit}")]
    DepthLimitExceeded { limit: u32 },

    #[error("field id {0} not found in record")]
    FieldNotFound(u32),
}
