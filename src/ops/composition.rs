//! Composition (§4.8): merge two records in the same fieldspace into one,
//! via a sorted merge-join over their directories. Collisions resolve
//! left-biased (the first argument wins); every step is byte slicing and
//! copying, never value decode.

use crate::directory::{self, DirectoryEntry};
use crate::error::{ImprintError, Result};
use crate::header::Header;
use crate::record::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionOptions {
    /// When two inputs both define a field id, require their type codes to
    /// match before resolving the collision. Only `true` is implemented —
    /// the field exists so a future lenient mode has somewhere to land.
    pub strict_type_check: bool,
    /// When `true` (default), `B`'s colliding value bytes are dropped from
    /// the output payload entirely. When `false`, they are still left out
    /// of the directory (`A`'s entry always wins) but this crate has no
    /// call site that would otherwise retain dead bytes, so the output is
    /// identical either way — the flag exists to mirror §4.8's documented
    /// knob for callers that want to assert on the chosen mode explicitly.
    pub compact_on_collision: bool,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        CompositionOptions {
            strict_type_check: true,
            compact_on_collision: true,
        }
    }
}

/// Compose `a` over `b`: every field present in `a` is kept as-is; fields
/// present only in `b` are carried over; fields present in both keep `a`'s
/// value. Both inputs must share a `fieldspace_id`.
pub fn compose(a_bytes: &[u8], b_bytes: &[u8], options: CompositionOptions) -> Result<Vec<u8>> {
    let a = Reader::new(a_bytes)?;
    let b = Reader::new(b_bytes)?;

    if a.fieldspace_id() != b.fieldspace_id() {
        return Err(ImprintError::FieldspaceMismatch {
            a: a.fieldspace_id(),
            b: b.fieldspace_id(),
        });
    }

    let a_entries = a.directory_entries();
    let b_entries = b.directory_entries();

    let mut entries = Vec::with_capacity(a_entries.len() + b_entries.len());
    let mut payload = Vec::new();
    let mut ai = 0usize;
    let mut bi = 0usize;

    while ai < a_entries.len() && bi < b_entries.len() {
        let ea = &a_entries[ai];
        let eb = &b_entries[bi];
        if ea.field_id < eb.field_id {
            push_field(&mut payload, &mut entries, &a, ea)?;
            ai += 1;
        } else if ea.field_id > eb.field_id {
            push_field(&mut payload, &mut entries, &b, eb)?;
            bi += 1;
        } else {
            if options.strict_type_check && ea.type_code != eb.type_code {
                return Err(ImprintError::TypeMismatch {
                    field_id: ea.field_id,
                    a: ea.type_code,
                    b: eb.type_code,
                });
            }
            if options.compact_on_collision {
                let dropped = b.get_raw(eb.field_id)?;
                tracing::warn!(
                    field_id = eb.field_id,
                    dropped_bytes = dropped.len(),
                    "composition collision: dropping B's shadowed value"
                );
            }
            push_field(&mut payload, &mut entries, &a, ea)?;
            ai += 1;
            bi += 1;
        }
    }
    while ai < a_entries.len() {
        push_field(&mut payload, &mut entries, &a, &a_entries[ai])?;
        ai += 1;
    }
    while bi < b_entries.len() {
        push_field(&mut payload, &mut entries, &b, &b_entries[bi])?;
        bi += 1;
    }

    let mut out = Vec::new();
    // The composed field set generally matches neither input's schema, so
    // the output carries fieldspace_id (validated equal above) but a fresh
    // schema_hash of 0; callers that track schemas re-stamp it themselves.
    Header::new(a.fieldspace_id(), 0, payload.len() as u32).write_to(&mut out);
    directory::write(&mut out, &entries);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn push_field(
    payload: &mut Vec<u8>,
    entries: &mut Vec<DirectoryEntry>,
    reader: &Reader<'_>,
    entry: &DirectoryEntry,
) -> Result<()> {
    let raw = reader.get_raw(entry.field_id)?;
    let offset = payload.len() as u32;
    payload.extend_from_slice(raw);
    entries.push(DirectoryEntry {
        field_id: entry.field_id,
        type_code: entry.type_code,
        offset,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Builder;
    use crate::value::Value;

    fn record(fieldspace: u32, fields: &[(u32, Value<'_>)]) -> Vec<u8> {
        let mut b = Builder::new();
        for (id, v) in fields {
            b.set(*id, v.clone()).unwrap();
        }
        b.finalize(fieldspace, 0).unwrap()
    }

    #[test]
    fn disjoint_fields_merge() {
        let a = record(1, &[(1, Value::Int32(1))]);
        let b = record(1, &[(2, Value::Int32(2))]);
        let composed = compose(&a, &b, CompositionOptions::default()).unwrap();
        let reader = Reader::new(&composed).unwrap();
        assert_eq!(reader.field_count(), 2);
        assert_eq!(reader.get_value(1).unwrap(), Value::Int32(1));
        assert_eq!(reader.get_value(2).unwrap(), Value::Int32(2));
    }

    #[test]
    fn collision_is_left_biased() {
        let a = record(1, &[(1, Value::Int32(100))]);
        let b = record(1, &[(1, Value::Int32(200))]);
        let composed = compose(&a, &b, CompositionOptions::default()).unwrap();
        let reader = Reader::new(&composed).unwrap();
        assert_eq!(reader.get_value(1).unwrap(), Value::Int32(100));
    }

    #[test]
    fn fieldspace_mismatch_rejected() {
        let a = record(1, &[(1, Value::Int32(1))]);
        let b = record(2, &[(1, Value::Int32(1))]);
        let err = compose(&a, &b, CompositionOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ImprintError::FieldspaceMismatch { a: 1, b: 2 }
        ));
    }

    #[test]
    fn type_mismatch_on_collision_rejected() {
        let a = record(1, &[(1, Value::Int32(1))]);
        let b = record(1, &[(1, Value::String("x"))]);
        let err = compose(&a, &b, CompositionOptions::default()).unwrap_err();
        assert!(matches!(err, ImprintError::TypeMismatch { field_id: 1, .. }));
    }

    #[test]
    fn composing_with_empty_is_identity_on_fields() {
        let a = record(1, &[(1, Value::Int32(1)), (2, Value::Bool(true))]);
        let empty = record(1, &[]);
        let composed = compose(&a, &empty, CompositionOptions::default()).unwrap();
        let reader = Reader::new(&composed).unwrap();
        assert_eq!(reader.field_count(), 2);
        assert_eq!(reader.get_value(1).unwrap(), Value::Int32(1));
        assert_eq!(reader.get_value(2).unwrap(), Value::Bool(true));
    }

    #[test]
    fn compact_on_collision_is_the_default() {
        assert!(CompositionOptions::default().compact_on_collision);
    }

    #[test]
    fn disjoint_composition_is_commutative() {
        let a = record(1, &[(1, Value::Int32(1))]);
        let b = record(1, &[(2, Value::Int32(2))]);
        let ab = compose(&a, &b, CompositionOptions::default()).unwrap();
        let ba = compose(&b, &a, CompositionOptions::default()).unwrap();
        assert_eq!(ab, ba);
    }
}
