//! Sorted field directory (§4.4).
//!
//! ```text
//! varint field_count
//! field_count * DirectoryEntry { field_id: u32 LE, type: u8, offset: u32 LE }
//! ```
//!
//! Entries are strictly ascending by `field_id` in canonical form, which
//! makes lookup a binary search and projection/composition pure byte
//! slicing — neither ever needs to decode a value to find or copy it.

use crate::error::{ImprintError, Result};
use crate::header::{Header, HEADER_LEN};
use crate::value::TypeCode;
use crate::varint;

pub const ENTRY_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub field_id: u32,
    pub type_code: TypeCode,
    /// Byte offset of this field's value, relative to the start of the
    /// payload region (i.e. relative to the end of the directory).
    pub offset: u32,
}

impl DirectoryEntry {
    fn parse(bytes: &[u8]) -> Result<Self> {
        debug_assert_eq!(bytes.len(), ENTRY_LEN);
        let field_id = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let type_code = TypeCode::from_u8(bytes[4])?;
        let offset = u32::from_le_bytes(bytes[5..9].try_into().unwrap());
        Ok(DirectoryEntry {
            field_id,
            type_code,
            offset,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.field_id.to_le_bytes());
        out.push(self.type_code.as_u8());
        out.extend_from_slice(&self.offset.to_le_bytes());
    }
}

/// A parsed directory: the entries plus where the payload region begins
/// (the byte offset, relative to the start of the whole record, of the
/// first byte after the directory).
#[derive(Debug, Clone)]
pub struct Directory {
    pub entries: Vec<DirectoryEntry>,
    pub payload_start: usize,
}

/// Parse the directory that follows the header at the start of `bytes`.
/// `bytes` must start at the header (offset 0 of the record).
pub fn parse(bytes: &[u8]) -> Result<Directory> {
    let (count, count_width) = varint::read_u32(bytes, HEADER_LEN)?;
    let entries_start = HEADER_LEN + count_width;
    let entries_len = count as usize * ENTRY_LEN;
    if entries_start + entries_len > bytes.len() {
        return Err(ImprintError::Truncated {
            offset: entries_start,
            needed: entries_len,
            available: bytes.len().saturating_sub(entries_start),
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    let mut prev_field_id: Option<u32> = None;
    for i in 0..count as usize {
        let start = entries_start + i * ENTRY_LEN;
        let entry = DirectoryEntry::parse(&bytes[start..start + ENTRY_LEN])?;
        if let Some(prev) = prev_field_id {
            if entry.field_id <= prev {
                return Err(ImprintError::DirectoryUnsorted { index: i });
            }
        }
        prev_field_id = Some(entry.field_id);
        entries.push(entry);
    }

    Ok(Directory {
        entries,
        payload_start: entries_start + entries_len,
    })
}

/// Binary search the directory for `field_id`.
pub fn find(entries: &[DirectoryEntry], field_id: u32) -> Option<&DirectoryEntry> {
    entries
        .binary_search_by_key(&field_id, |e| e.field_id)
        .ok()
        .map(|i| &entries[i])
}

/// Serialize a (caller-sorted) set of entries as a canonical directory:
/// varint count followed by the fixed-width entries in order.
pub fn write(out: &mut Vec<u8>, entries: &[DirectoryEntry]) {
    varint::write_u32(out, entries.len() as u32);
    for entry in entries {
        entry.write_to(out);
    }
}

/// The total on-wire byte length of a complete record (header + directory
/// + payload) starting at the beginning of `bytes`. Used by the `row`
/// value codec and by composition/projection to know how much of the
/// buffer a nested record occupies without decoding any of its fields.
pub fn record_byte_length(bytes: &[u8]) -> Result<usize> {
    let header = Header::parse(bytes)?;
    if !header.directory_present() {
        return Ok(HEADER_LEN + header.payload_size as usize);
    }
    let (count, count_width) = varint::read_u32(bytes, HEADER_LEN)?;
    let directory_len = count_width + count as usize * ENTRY_LEN;
    let total = HEADER_LEN + directory_len + header.payload_size as usize;
    if total > bytes.len() {
        return Err(ImprintError::Truncated {
            offset: 0,
            needed: total,
            available: bytes.len(),
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;

    fn sample_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        Header::new(1, 0, 4).write_to(&mut buf);
        write(
            &mut buf,
            &[DirectoryEntry {
                field_id: 1,
                type_code: TypeCode::Int32,
                offset: 0,
            }],
        );
        buf.extend_from_slice(&42i32.to_le_bytes());
        buf
    }

    #[test]
    fn parse_roundtrip() {
        let bytes = sample_bytes();
        let dir = parse(&bytes).unwrap();
        assert_eq!(dir.entries.len(), 1);
        assert_eq!(dir.entries[0].field_id, 1);
        assert_eq!(dir.payload_start, bytes.len() - 4);
    }

    #[test]
    fn unsorted_directory_rejected() {
        let mut buf = Vec::new();
        Header::new(1, 0, 0).write_to(&mut buf);
        write(
            &mut buf,
            &[
                DirectoryEntry {
                    field_id: 5,
                    type_code: TypeCode::Int32,
                    offset: 0,
                },
                DirectoryEntry {
                    field_id: 2,
                    type_code: TypeCode::Int32,
                    offset: 4,
                },
            ],
        );
        let err = parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::DirectoryUnsorted { index: 1 }));
    }

    #[test]
    fn duplicate_field_id_rejected_as_unsorted() {
        let mut buf = Vec::new();
        Header::new(1, 0, 0).write_to(&mut buf);
        write(
            &mut buf,
            &[
                DirectoryEntry {
                    field_id: 2,
                    type_code: TypeCode::Int32,
                    offset: 0,
                },
                DirectoryEntry {
                    field_id: 2,
                    type_code: TypeCode::Int32,
                    offset: 4,
                },
            ],
        );
        let err = parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::DirectoryUnsorted { index: 1 }));
    }

    #[test]
    fn find_binary_searches() {
        let entries = vec![
            DirectoryEntry { field_id: 1, type_code: TypeCode::Int32, offset: 0 },
            DirectoryEntry { field_id: 4, type_code: TypeCode::Int32, offset: 4 },
            DirectoryEntry { field_id: 9, type_code: TypeCode::Int32, offset: 8 },
        ];
        assert_eq!(find(&entries, 4).unwrap().offset, 4);
        assert!(find(&entries, 5).is_none());
    }

    #[test]
    fn record_byte_length_matches_total_bytes() {
        let bytes = sample_bytes();
        assert_eq!(record_byte_length(&bytes).unwrap(), bytes.len());
    }

    #[test]
    fn record_byte_length_rejects_truncated_payload() {
        let bytes = sample_bytes();
        let truncated = &bytes[..bytes.len() - 1];
        let err = record_byte_length(truncated).unwrap_err();
        assert!(matches!(err, ImprintError::Truncated { .. }));
    }
}
