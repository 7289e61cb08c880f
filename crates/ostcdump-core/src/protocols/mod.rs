//! Dump decoding and encoding.
//!
//! The codec follows a layered structure:
//! - `layout`: offsets shared by every revision (source of truth)
//! - `common`: bounds-checked byte reads and writes
//! - `field`: one declarative `(offset, FeatureKey, FieldCodec)` entry
//! - `revision`: a firmware-bound table of fields chained onto its parent
//! - `registry`: picks the revision for a dump from its embedded version
//! - `error`: explicit, actionable errors
//!
//! Concrete revision chains live in their own modules (`mk2`). Everything
//! here is pure: no I/O, no shared mutable state.

pub(crate) mod common;
pub mod error;
pub mod field;
pub mod layout;
pub mod mk2;
pub mod registry;
pub mod revision;

pub use error::{ProtocolError, RegistryError};
pub use field::{FieldCodec, FieldEntry, Normalization, NormalizationReason};
pub use registry::ProtocolRegistry;
pub use revision::{ProtocolRevision, RevisionBuilder};
