//! Value codec (§4.2, §6): encode/decode of individual typed values.
//!
//! Fixed-width types consume a known number of bytes. Variable-width values
//! (`bytes`, `string`, `array`, `map`, `row`) carry their length structurally
//! — either an explicit varint prefix or, for `row`, a nested header +
//! directory that is itself self-describing.

use crate::directory;
use crate::error::{ImprintError, Result};
use crate::limits::DecodeLimits;
use crate::varint;

/// The closed type-code enumeration from §6.
///
/// `row = 0xA`, `map = 0x9` — the byte-layout table, per Open Question 1 in
/// `SPEC_FULL.md`. The prose table's `row = 0x9` is not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeCode {
    Null = 0x0,
    Bool = 0x1,
    Int32 = 0x2,
    Int64 = 0x3,
    Float32 = 0x4,
    Float64 = 0x5,
    Bytes = 0x6,
    String = 0x7,
    Array = 0x8,
    Map = 0x9,
    Row = 0xA,
}

impl TypeCode {
    /// Parse a type code byte, failing with [`ImprintError::UnknownType`]
    /// for reserved codes (0xB..=0xFF).
    pub fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            0x0 => Ok(TypeCode::Null),
            0x1 => Ok(TypeCode::Bool),
            0x2 => Ok(TypeCode::Int32),
            0x3 => Ok(TypeCode::Int64),
            0x4 => Ok(TypeCode::Float32),
            0x5 => Ok(TypeCode::Float64),
            0x6 => Ok(TypeCode::Bytes),
            0x7 => Ok(TypeCode::String),
            0x8 => Ok(TypeCode::Array),
            0x9 => Ok(TypeCode::Map),
            0xA => Ok(TypeCode::Row),
            other => Err(ImprintError::UnknownType(other)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map keys (§3 invariant 6) must be one of int32, int64, bytes, string.
    pub fn is_valid_map_key(self) -> bool {
        matches!(
            self,
            TypeCode::Int32 | TypeCode::Int64 | TypeCode::Bytes | TypeCode::String
        )
    }

    /// Byte width for fixed-width types; `None` for variable-width ones.
    fn fixed_width(self) -> Option<usize> {
        match self {
            TypeCode::Null => Some(0),
            TypeCode::Bool => Some(1),
            TypeCode::Int32 => Some(4),
            TypeCode::Int64 => Some(8),
            TypeCode::Float32 => Some(4),
            TypeCode::Float64 => Some(8),
            _ => None,
        }
    }
}

/// A decoded value. Scalar and leaf variants borrow from the input byte
/// slice; containers own a `Vec` of recursively decoded values.
///
/// `Row` borrows the raw bytes of the nested record rather than eagerly
/// parsing it — callers that want to traverse further construct a
/// [`crate::record::Reader`] over that slice themselves, the same way the
/// outer reader was constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bytes(&'a [u8]),
    String(&'a str),
    Array {
        element_type: TypeCode,
        values: Vec<Value<'a>>,
    },
    Map {
        key_type: TypeCode,
        value_type: TypeCode,
        entries: Vec<(Value<'a>, Value<'a>)>,
    },
    Row(&'a [u8]),
}

impl<'a> Value<'a> {
    /// The [`TypeCode`] this value would be encoded with.
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::Null => TypeCode::Null,
            Value::Bool(_) => TypeCode::Bool,
            Value::Int32(_) => TypeCode::Int32,
            Value::Int64(_) => TypeCode::Int64,
            Value::Float32(_) => TypeCode::Float32,
            Value::Float64(_) => TypeCode::Float64,
            Value::Bytes(_) => TypeCode::Bytes,
            Value::String(_) => TypeCode::String,
            Value::Array { .. } => TypeCode::Array,
            Value::Map { .. } => TypeCode::Map,
            Value::Row(_) => TypeCode::Row,
        }
    }
}

/// Encode `value` into `out`, per §4.2/§6. The top-level type code itself is
/// not written here — it lives in the directory entry, not the payload.
pub fn encode_value(out: &mut Vec<u8>, value: &Value<'_>) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(if *b { 1 } else { 0 }),
        Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Bytes(b) => {
            varint::write_u32(out, b.len() as u32);
            out.extend_from_slice(b);
        }
        Value::String(s) => {
            varint::write_u32(out, s.len() as u32);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Array { element_type, values } => {
            varint::write_u32(out, values.len() as u32);
            if !values.is_empty() {
                out.push(element_type.as_u8());
                for v in values {
                    encode_value(out, v)?;
                }
            }
        }
        Value::Map {
            key_type,
            value_type,
            entries,
        } => {
            if !entries.is_empty() && !key_type.is_valid_map_key() {
                return Err(ImprintError::InvalidMapKeyType(key_type.as_u8()));
            }
            varint::write_u32(out, entries.len() as u32);
            if !entries.is_empty() {
                out.push(key_type.as_u8());
                out.push(value_type.as_u8());
                for (k, v) in entries {
                    encode_value(out, k)?;
                    encode_value(out, v)?;
                }
            }
        }
        Value::Row(bytes) => out.extend_from_slice(bytes),
    }
    Ok(())
}

/// Decode a value of `type_code` from `bytes` starting at `offset`.
///
/// Returns the decoded [`Value`] and the number of bytes consumed. `depth`
/// is the current row/container nesting depth; it is checked against
/// `limits.max_row_depth` before descending into arrays, maps, or rows, so
/// adversarial deeply-nested input fails with
/// [`ImprintError::DepthLimitExceeded`] instead of overflowing the stack.
pub fn decode_value<'a>(
    bytes: &'a [u8],
    offset: usize,
    type_code: TypeCode,
    depth: u32,
    limits: &DecodeLimits,
) -> Result<(Value<'a>, usize)> {
    if let Some(width) = type_code.fixed_width() {
        let slice = take(bytes, offset, width)?;
        let value = match type_code {
            TypeCode::Null => Value::Null,
            TypeCode::Bool => Value::Bool(slice[0] != 0),
            TypeCode::Int32 => Value::Int32(i32::from_le_bytes(slice.try_into().unwrap())),
            TypeCode::Int64 => Value::Int64(i64::from_le_bytes(slice.try_into().unwrap())),
            TypeCode::Float32 => Value::Float32(f32::from_le_bytes(slice.try_into().unwrap())),
            TypeCode::Float64 => Value::Float64(f64::from_le_bytes(slice.try_into().unwrap())),
            _ => unreachable!("fixed_width only returns Some for the scalar types above"),
        };
        return Ok((value, width));
    }

    match type_code {
        TypeCode::Bytes => {
            let (len, len_width) = varint::read_u32(bytes, offset)?;
            let body = take(bytes, offset + len_width, len as usize)?;
            Ok((Value::Bytes(body), len_width + len as usize))
        }
        TypeCode::String => {
            let (len, len_width) = varint::read_u32(bytes, offset)?;
            let body = take(bytes, offset + len_width, len as usize)?;
            let s = std::str::from_utf8(body).map_err(|_| ImprintError::InvalidUtf8 {
                offset: offset + len_width,
            })?;
            Ok((Value::String(s), len_width + len as usize))
        }
        TypeCode::Array => decode_array(bytes, offset, depth, limits),
        TypeCode::Map => decode_map(bytes, offset, depth, limits),
        TypeCode::Row => decode_row(bytes, offset, depth, limits),
        _ => unreachable!("fixed-width types are handled above"),
    }
}

fn decode_array<'a>(
    bytes: &'a [u8],
    offset: usize,
    depth: u32,
    limits: &DecodeLimits,
) -> Result<(Value<'a>, usize)> {
    let (count, mut consumed) = varint::read_u32(bytes, offset)?;
    if count == 0 {
        return Ok((
            Value::Array {
                element_type: TypeCode::Null,
                values: Vec::new(),
            },
            consumed,
        ));
    }

    check_depth(depth, limits)?;
    let elem_byte = *bytes
        .get(offset + consumed)
        .ok_or(ImprintError::Truncated {
            offset: offset + consumed,
            needed: 1,
            available: bytes.len().saturating_sub(offset + consumed),
        })?;
    let element_type = TypeCode::from_u8(elem_byte)?;
    consumed += 1;

    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (value, len) =
            decode_value(bytes, offset + consumed, element_type, depth + 1, limits)?;
        values.push(value);
        consumed += len;
    }

    Ok((
        Value::Array {
            element_type,
            values,
        },
        consumed,
    ))
}

fn decode_map<'a>(
    bytes: &'a [u8],
    offset: usize,
    depth: u32,
    limits: &DecodeLimits,
) -> Result<(Value<'a>, usize)> {
    let (count, mut consumed) = varint::read_u32(bytes, offset)?;
    if count == 0 {
        return Ok((
            Value::Map {
                key_type: TypeCode::Null,
                value_type: TypeCode::Null,
                entries: Vec::new(),
            },
            consumed,
        ));
    }

    check_depth(depth, limits)?;
    let key_byte = read_byte(bytes, offset + consumed)?;
    let key_type = TypeCode::from_u8(key_byte)?;
    if !key_type.is_valid_map_key() {
        return Err(ImprintError::InvalidMapKeyType(key_byte));
    }
    consumed += 1;
    let value_byte = read_byte(bytes, offset + consumed)?;
    let value_type = TypeCode::from_u8(value_byte)?;
    consumed += 1;

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (key, key_len) = decode_value(bytes, offset + consumed, key_type, depth + 1, limits)?;
        consumed += key_len;
        let (val, val_len) =
            decode_value(bytes, offset + consumed, value_type, depth + 1, limits)?;
        consumed += val_len;
        entries.push((key, val));
    }

    Ok((
        Value::Map {
            key_type,
            value_type,
            entries,
        },
        consumed,
    ))
}

fn decode_row<'a>(
    bytes: &'a [u8],
    offset: usize,
    depth: u32,
    limits: &DecodeLimits,
) -> Result<(Value<'a>, usize)> {
    check_depth(depth, limits)?;
    let len = directory::record_byte_length(&bytes[offset..])?;
    let slice = take(bytes, offset, len)?;
    Ok((Value::Row(slice), len))
}

/// Compute the byte length of a value of `type_code` at `offset`, *without*
/// fully decoding it — used by the reader, projection, and composition so
/// they never invoke the value codec on fields they merely copy (§4.5,
/// §8 invariant 9). Structural bytes (counts, type codes, length prefixes,
/// nested headers) are read; value bodies are skipped by byte count alone.
pub fn value_byte_length(
    bytes: &[u8],
    offset: usize,
    type_code: TypeCode,
    depth: u32,
    limits: &DecodeLimits,
) -> Result<usize> {
    if let Some(width) = type_code.fixed_width() {
        ensure_available(bytes, offset, width)?;
        return Ok(width);
    }

    match type_code {
        TypeCode::Bytes | TypeCode::String => {
            let (len, len_width) = varint::read_u32(bytes, offset)?;
            ensure_available(bytes, offset + len_width, len as usize)?;
            Ok(len_width + len as usize)
        }
        TypeCode::Array => {
            let (count, mut consumed) = varint::read_u32(bytes, offset)?;
            if count == 0 {
                return Ok(consumed);
            }
            check_depth(depth, limits)?;
            let element_type = TypeCode::from_u8(read_byte(bytes, offset + consumed)?)?;
            consumed += 1;
            for _ in 0..count {
                consumed += value_byte_length(
                    bytes,
                    offset + consumed,
                    element_type,
                    depth + 1,
                    limits,
                )?;
            }
            Ok(consumed)
        }
        TypeCode::Map => {
            let (count, mut consumed) = varint::read_u32(bytes, offset)?;
            if count == 0 {
                return Ok(consumed);
            }
            check_depth(depth, limits)?;
            let key_type = TypeCode::from_u8(read_byte(bytes, offset + consumed)?)?;
            consumed += 1;
            let value_type = TypeCode::from_u8(read_byte(bytes, offset + consumed)?)?;
            consumed += 1;
            for _ in 0..count {
                consumed +=
                    value_byte_length(bytes, offset + consumed, key_type, depth + 1, limits)?;
                consumed +=
                    value_byte_length(bytes, offset + consumed, value_type, depth + 1, limits)?;
            }
            Ok(consumed)
        }
        TypeCode::Row => {
            check_depth(depth, limits)?;
            let len = directory::record_byte_length(&bytes[offset..])?;
            ensure_available(bytes, offset, len)?;
            Ok(len)
        }
        _ => unreachable!("fixed-width types are handled above"),
    }
}

fn check_depth(depth: u32, limits: &DecodeLimits) -> Result<()> {
    if depth >= limits.max_row_depth {
        tracing::warn!(depth, limit = limits.max_row_depth, "nesting depth limit reached");
        return Err(ImprintError::DepthLimitExceeded {
            limit: limits.max_row_depth,
        });
    }
    Ok(())
}

fn read_byte(bytes: &[u8], offset: usize) -> Result<u8> {
    bytes.get(offset).copied().ok_or(ImprintError::Truncated {
        offset,
        needed: 1,
        available: bytes.len().saturating_sub(offset),
    })
}

fn ensure_available(bytes: &[u8], offset: usize, len: usize) -> Result<()> {
    if offset + len > bytes.len() {
        return Err(ImprintError::Truncated {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        });
    }
    Ok(())
}

fn take<'a>(bytes: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    ensure_available(bytes, offset, len)?;
    Ok(&bytes[offset..offset + len])
}
