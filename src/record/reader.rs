//! Zero-copy reader over a single encoded record (§4.5).
//!
//! Construction validates the header and directory structurally; field
//! access is either a raw-byte slice (no value decode at all) or a fully
//! decoded [`Value`], whichever the caller needs.

use crate::directory::{self, Directory, DirectoryEntry};
use crate::error::{ImprintError, Result};
use crate::header::{Header, HEADER_LEN};
use crate::limits::DecodeLimits;
use crate::value::{self, TypeCode, Value};

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    header: Header,
    directory: Directory,
}

impl<'a> Reader<'a> {
    /// Parse `bytes` as a complete record: header, directory (if present),
    /// and a payload region long enough to hold `header.payload_size`.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let header = Header::parse(bytes)?;
        let directory = if header.directory_present() {
            directory::parse(bytes)?
        } else {
            Directory {
                entries: Vec::new(),
                payload_start: HEADER_LEN,
            }
        };

        let payload_end = directory.payload_start + header.payload_size as usize;
        if bytes.len() < payload_end {
            return Err(ImprintError::Truncated {
                offset: directory.payload_start,
                needed: header.payload_size as usize,
                available: bytes.len().saturating_sub(directory.payload_start),
            });
        }

        tracing::debug!(
            fieldspace_id = header.fieldspace_id,
            schema_hash = header.schema_hash,
            field_count = directory.entries.len(),
            "parsed record"
        );

        Ok(Reader {
            bytes,
            header,
            directory,
        })
    }

    pub fn fieldspace_id(&self) -> u32 {
        self.header.fieldspace_id
    }

    pub fn schema_hash(&self) -> u32 {
        self.header.schema_hash
    }

    pub fn field_count(&self) -> usize {
        self.directory.entries.len()
    }

    pub fn directory_entries(&self) -> &[DirectoryEntry] {
        &self.directory.entries
    }

    /// The full on-wire bytes this reader was constructed from.
    pub fn raw_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn entry(&self, field_id: u32) -> Result<&DirectoryEntry> {
        directory::find(&self.directory.entries, field_id)
            .ok_or(ImprintError::FieldNotFound(field_id))
    }

    /// The raw payload slice for `field_id`, without decoding it. This is
    /// what projection and composition use to copy fields across records.
    pub fn get_raw(&self, field_id: u32) -> Result<&'a [u8]> {
        let entry = self.entry(field_id)?;
        let start = self.directory.payload_start + entry.offset as usize;
        let len = value::value_byte_length(
            self.bytes,
            start,
            entry.type_code,
            0,
            &DecodeLimits::default(),
        )?;
        Ok(&self.bytes[start..start + len])
    }

    /// Fully decode `field_id`'s value, using the default depth limit.
    pub fn get_value(&self, field_id: u32) -> Result<Value<'a>> {
        self.get_value_with_limits(field_id, &DecodeLimits::default())
    }

    /// Fully decode `field_id`'s value, enforcing `limits`.
    pub fn get_value_with_limits(
        &self,
        field_id: u32,
        limits: &DecodeLimits,
    ) -> Result<Value<'a>> {
        let entry = self.entry(field_id)?;
        let start = self.directory.payload_start + entry.offset as usize;
        let (value, _) = value::decode_value(self.bytes, start, entry.type_code, 0, limits)?;
        Ok(value)
    }

    /// Iterate over `(field_id, type_code)` pairs in ascending field-id
    /// order, without decoding any value bodies.
    pub fn iter(&self) -> impl Iterator<Item = (u32, TypeCode)> + '_ {
        self.directory
            .entries
            .iter()
            .map(|e| (e.field_id, e.type_code))
    }
}
