//! Imprint: a self-describing binary row format for stream-processing
//! pipelines.
//!
//! A record is a 15-byte header, an optional sorted field directory, and a
//! payload region. Projection and composition operate on the directory and
//! raw payload bytes alone — neither ever decodes a value it only needs to
//! copy — which is what makes both O(fields moved) rather than O(record
//! size).
//!
//! ```text
//! use_case: build a record, read a field back, project a subset
//! ```
//!
//! See [`record::Builder`] to construct records, [`record::Reader`] to
//! read them, and [`ops`] for projection/composition.

pub mod cache;
pub mod directory;
pub mod error;
pub mod header;
pub mod limits;
pub mod ops;
pub mod record;
pub mod value;
pub mod varint;

pub use cache::{BoundedDirectoryCache, DirectoryCache};
pub use error::{ImprintError, Result};
pub use limits::DecodeLimits;
pub use ops::{compose, project, CompositionOptions, MissingField, ProjectionOptions};
pub use record::{Builder, Reader};
pub use value::{TypeCode, Value};
