//! Fixed 15-byte record header (§4.3).
//!
//! ```text
//! byte 0       magic (0x49)
//! byte 1       version (0x01)
//! byte 2       flags (bit 0: directory present; bits 1-7 reserved, must be 0)
//! bytes 3-6    fieldspace_id, u32 LE
//! bytes 7-10   schema_hash, u32 LE
//! bytes 11-14  payload_size, u32 LE
//! ```

use crate::error::{ImprintError, Result};

pub const MAGIC: u8 = 0x49;
pub const VERSION: u8 = 0x01;
pub const HEADER_LEN: usize = 15;

const FLAG_DIRECTORY_PRESENT: u8 = 0b0000_0001;
const RESERVED_FLAG_MASK: u8 = !FLAG_DIRECTORY_PRESENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub flags: u8,
    pub fieldspace_id: u32,
    pub schema_hash: u32,
    pub payload_size: u32,
}

impl Header {
    pub fn new(fieldspace_id: u32, schema_hash: u32, payload_size: u32) -> Self {
        Header {
            flags: FLAG_DIRECTORY_PRESENT,
            fieldspace_id,
            schema_hash,
            payload_size,
        }
    }

    pub fn directory_present(&self) -> bool {
        self.flags & FLAG_DIRECTORY_PRESENT != 0
    }

    /// Parse and validate the 15-byte header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ImprintError::Truncated {
                offset: 0,
                needed: HEADER_LEN,
                available: bytes.len(),
            });
        }

        if bytes[0] != MAGIC {
            return Err(ImprintError::BadMagic {
                offset: 0,
                found: bytes[0],
            });
        }
        if bytes[1] != VERSION {
            return Err(ImprintError::UnsupportedVersion(bytes[1]));
        }
        let flags = bytes[2];
        if flags & RESERVED_FLAG_MASK != 0 {
            return Err(ImprintError::ReservedFlagSet(flags));
        }

        let fieldspace_id = u32::from_le_bytes(bytes[3..7].try_into().unwrap());
        let schema_hash = u32::from_le_bytes(bytes[7..11].try_into().unwrap());
        let payload_size = u32::from_le_bytes(bytes[11..15].try_into().unwrap());

        Ok(Header {
            flags,
            fieldspace_id,
            schema_hash,
            payload_size,
        })
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(MAGIC);
        out.push(VERSION);
        out.push(self.flags);
        out.extend_from_slice(&self.fieldspace_id.to_le_bytes());
        out.extend_from_slice(&self.schema_hash.to_le_bytes());
        out.extend_from_slice(&self.payload_size.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let header = Header::new(7, 0xdeadbeef, 128);
        let mut buf = Vec::new();
        header.write_to(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);
        let parsed = Header::parse(&buf).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0] = 0xFF;
        let err = Header::parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::BadMagic { offset: 0, found: 0xFF }));
    }

    #[test]
    fn bad_version_rejected() {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0] = MAGIC;
        buf[1] = 0x02;
        let err = Header::parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::UnsupportedVersion(0x02)));
    }

    #[test]
    fn reserved_flag_bits_rejected() {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0] = MAGIC;
        buf[1] = VERSION;
        buf[2] = 0b0000_0010;
        let err = Header::parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::ReservedFlagSet(_)));
    }

    #[test]
    fn truncated_header_rejected() {
        let buf = vec![MAGIC, VERSION];
        let err = Header::parse(&buf).unwrap_err();
        assert!(matches!(err, ImprintError::Truncated { .. }));
    }
}
