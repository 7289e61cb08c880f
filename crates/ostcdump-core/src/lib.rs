//! Core codec for dive-computer memory dumps.
//!
//! A dump is a fixed-size byte image read from the device. Its layout
//! depends on the firmware revision that wrote it, and every revision
//! extends its predecessor's layout rather than replacing it. This crate
//! identifies the revision from the version bytes embedded in the dump,
//! decodes the settings it owns into a version-independent map of typed
//! values, and encodes edited maps back into the exact byte layout the
//! device expects.
//!
//! Pipeline: `source` (bytes) -> `ProtocolRegistry` (revision by firmware
//! version) -> `ProtocolRevision::decode` (parent first, own fields last)
//! -> `Settings` -> edits -> `ProtocolRevision::encode` -> bytes.
//!
//! Invariants:
//! - Decoding never fails on device values; out-of-range bit patterns are
//!   replaced by per-field fallbacks and reported as normalizations.
//! - Encoding only touches bytes owned by a field whose key is present.
//! - Revisions and the registry are immutable once built and can be shared
//!   across threads without locking.
//!
//! # Examples
//! ```
//! use ostcdump_core::{DumpCodec, Settings};
//!
//! let codec = DumpCodec::mk2()?;
//! let revision = codec.registry().by_name("mk2-1.91")?;
//! let dump = codec.encode(&Settings::new(), &revision, None)?;
//!
//! let decoded = codec.decode(&dump)?;
//! let cf02 = decoded.settings.get("CF02").and_then(|v| v.as_bounded_int());
//! assert_eq!(cf02.map(|cf| cf.bits()), Some(15));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::path::Path;

mod codec;
mod document;
mod feature;
pub mod protocols;
mod source;
mod value;
mod version;

pub use codec::{CodecError, DecodedDump, DumpCodec};
pub use document::{
    DOCUMENT_VERSION, DocumentError, ProtocolInfo, SettingsDocument, ToolInfo,
    make_settings_document,
};
pub use feature::FeatureKey;
pub use protocols::{
    FieldCodec, FieldEntry, Normalization, NormalizationReason, ProtocolError, ProtocolRegistry,
    ProtocolRevision, RegistryError, RevisionBuilder,
};
pub use source::{DumpFileSource, DumpSource, SourceError};
pub use value::{
    BoundedInt, EIGHT_BIT, FIFTEEN_BIT, MAX_BITS, Selection, Value, ValueError, ValueKind,
};
pub use version::{
    UNBOUNDED_VERSION, VersionError, VersionMatcher, format_version, parse_version,
    version_from_bytes,
};

/// Decoded settings: one value per feature, ordered by feature name.
pub type Settings = BTreeMap<FeatureKey, Value>;

/// Open a dump file and decode it with `codec`.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use ostcdump_core::{DumpCodec, decode_dump_file};
///
/// let codec = DumpCodec::mk2()?;
/// let decoded = decode_dump_file(&codec, Path::new("ostc.bin"), None)?;
/// println!("revision: {}", decoded.revision.name());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_dump_file(
    codec: &DumpCodec,
    path: &Path,
    hint: Option<&str>,
) -> Result<DecodedDump, CodecError> {
    let source = DumpFileSource::open(path)?;
    codec.decode_source(source, hint)
}
