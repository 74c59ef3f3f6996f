//! Projection (§4.7): produce a record containing a subset of a source
//! record's fields, by byte-slicing alone. No field value is ever decoded
//! — only its structural length is computed, via [`Reader::get_raw`].

use crate::directory::{self, DirectoryEntry};
use crate::error::Result;
use crate::header::Header;
use crate::record::Reader;

/// What to do when a requested field id is absent from the source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    /// Silently omit it from the projected output (default).
    Skip,
    /// Fail the whole projection with [`crate::error::ImprintError::FieldNotFound`].
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub on_missing: MissingField,
    /// When `true` (default), the output carries the source record's
    /// `schema_hash` unchanged. When `false`, a projected record generally
    /// no longer matches that hash (it carries a subset of the original
    /// fields), so the output is stamped with `schema_hash = 0` and the
    /// caller is responsible for assigning a correct one (§4.7).
    pub preserve_schema_hash: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        ProjectionOptions {
            on_missing: MissingField::Skip,
            preserve_schema_hash: true,
        }
    }
}

/// Project `field_ids` out of the record encoded in `bytes`, returning a
/// new canonical record with the same `fieldspace_id` and (per
/// `options.preserve_schema_hash`) the same or a zeroed `schema_hash`.
///
/// Duplicate ids in `field_ids` are deduplicated; the output directory is
/// ascending by construction since the requested ids are sorted before
/// any copying happens.
pub fn project(bytes: &[u8], field_ids: &[u32], options: ProjectionOptions) -> Result<Vec<u8>> {
    let reader = Reader::new(bytes)?;

    let mut wanted = field_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let mut payload = Vec::new();
    let mut entries = Vec::with_capacity(wanted.len());

    for field_id in wanted {
        let entry = match directory::find(reader.directory_entries(), field_id) {
            Some(e) => *e,
            None => match options.on_missing {
                MissingField::Skip => continue,
                MissingField::Error => {
                    return Err(crate::error::ImprintError::FieldNotFound(field_id))
                }
            },
        };

        let raw = reader.get_raw(field_id)?;
        let offset = payload.len() as u32;
        payload.extend_from_slice(raw);
        entries.push(DirectoryEntry {
            field_id: entry.field_id,
            type_code: entry.type_code,
            offset,
        });
    }

    let schema_hash = if options.preserve_schema_hash {
        reader.schema_hash()
    } else {
        0
    };

    let mut out = Vec::new();
    Header::new(reader.fieldspace_id(), schema_hash, payload.len() as u32).write_to(&mut out);
    directory::write(&mut out, &entries);
    out.extend_from_slice(&payload);
    Ok(out)
}
