//! Byte-algebra operators (§4.7, §4.8): projection and composition, neither
//! of which ever invokes the value codec on a field it only needs to copy.

mod composition;
mod projection;

pub use composition::{compose, CompositionOptions};
pub use projection::{project, MissingField, ProjectionOptions};
