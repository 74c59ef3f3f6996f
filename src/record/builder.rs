//! Builder for canonical records (§4.6).
//!
//! Fields may be `set` in any order; `finalize` sorts by `field_id`,
//! assigns payload offsets, and emits header + directory + payload in one
//! pass. The result is always canonical: directory entries strictly
//! ascending, byte-deterministic for a given set of (field_id, value)
//! pairs.

use std::collections::HashMap;

use crate::directory::{self, DirectoryEntry};
use crate::error::{ImprintError, Result};
use crate::header::Header;
use crate::value::{encode_value, Value};

pub struct Builder<'a> {
    // Keyed by field_id so a repeated `set` replaces in place (last write
    // wins) while preserving each field's most recent insertion order for
    // the duplicate-rejection path below.
    fields: HashMap<u32, Value<'a>>,
    order: Vec<u32>,
    reject_duplicates: bool,
}

impl<'a> Builder<'a> {
    pub fn new() -> Self {
        Builder {
            fields: HashMap::new(),
            order: Vec::new(),
            reject_duplicates: false,
        }
    }

    /// When `true`, a second `set()` for a field id already staged on this
    /// builder fails with [`ImprintError::DuplicateFieldId`] instead of
    /// replacing it. Default `false` (last write wins), per §4.6.
    pub fn reject_duplicates(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    /// Stage `field_id` with `value`. If `field_id` was already set on this
    /// builder, the new value replaces it (last write wins) unless
    /// `reject_duplicates(true)` was configured, in which case this fails
    /// with [`ImprintError::DuplicateFieldId`].
    pub fn set(&mut self, field_id: u32, value: Value<'a>) -> Result<()> {
        if self.fields.contains_key(&field_id) {
            if self.reject_duplicates {
                return Err(ImprintError::DuplicateFieldId(field_id));
            }
        } else {
            self.order.push(field_id);
        }
        self.fields.insert(field_id, value);
        Ok(())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Sort fields by id, encode the payload, and emit the complete
    /// canonical record: header, directory, payload.
    pub fn finalize(self, fieldspace_id: u32, schema_hash: u32) -> Result<Vec<u8>> {
        let mut ids = self.order;
        ids.sort_unstable();
        let mut fields = self.fields;

        let mut payload = Vec::new();
        let mut entries = Vec::with_capacity(ids.len());
        for field_id in ids {
            let value = fields.remove(&field_id).expect("field_id came from order");
            let offset = payload.len() as u32;
            let before = payload.len();
            encode_value(&mut payload, &value)?;
            tracing::trace!(
                field_id,
                type_code = ?value.type_code(),
                len = payload.len() - before,
                "encoded field"
            );
            entries.push(DirectoryEntry {
                field_id,
                type_code: value.type_code(),
                offset,
            });
        }

        let mut out = Vec::new();
        Header::new(fieldspace_id, schema_hash, payload.len() as u32).write_to(&mut out);
        directory::write(&mut out, &entries);
        out.extend_from_slice(&payload);
        Ok(out)
    }
}

impl<'a> Default for Builder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
