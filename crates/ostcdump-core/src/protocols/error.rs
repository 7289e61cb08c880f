use thiserror::Error;

use crate::value::{ValueError, ValueKind};
use crate::version::{VersionError, VersionMatcher, format_version};

/// Errors returned while selecting a revision or decoding/encoding a dump.
///
/// # Examples
/// ```
/// use ostcdump_core::ProtocolError;
///
/// let err = ProtocolError::TruncatedDump { needed: 65_802, actual: 10 };
/// assert!(err.to_string().contains("dump too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("dump too short: need {needed} bytes, got {actual}")]
    TruncatedDump { needed: usize, actual: usize },
    #[error("no protocol revision matches firmware {}", format_version(*.version))]
    NoMatchingProtocol { version: u32 },
    #[error("unknown protocol revision '{name}'")]
    UnknownProtocol { name: String },
    #[error("firmware {} cannot be stamped as a two-byte version", format_version(*.version))]
    UnstampableVersion { version: u32 },
    #[error("field {key} expects a {expected} value, got {actual}")]
    ValueKindMismatch {
        key: &'static str,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("field {key} holds {value}, which does not fit its {bits}-bit slot")]
    FieldOverflow {
        key: &'static str,
        bits: u8,
        value: u16,
    },
    #[error("field {key} cannot store selection code {selected}")]
    UnencodableSelection { key: &'static str, selected: i32 },
    #[error("invalid value: {0}")]
    InvalidValue(#[from] ValueError),
}

/// Configuration errors detected while building revisions or the registry.
///
/// These are fatal at startup and never produced by decode or encode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("revision {candidate} duplicates the version range {range} of {existing}")]
    DuplicateVersionRange {
        existing: &'static str,
        candidate: &'static str,
        range: VersionMatcher,
    },
    #[error(
        "revision {candidate} ({candidate_range}) overlaps {existing} ({existing_range}) with equal specificity"
    )]
    AmbiguousVersionRange {
        existing: &'static str,
        existing_range: VersionMatcher,
        candidate: &'static str,
        candidate_range: VersionMatcher,
    },
    #[error("revision name {name} is already registered")]
    DuplicateRevisionName { name: &'static str },
    #[error("revision {revision} declares no {what} and has no parent to inherit it from")]
    MissingRootProperty {
        revision: &'static str,
        what: &'static str,
    },
    #[error("revision {revision} declares field {key} twice")]
    DuplicateField {
        revision: &'static str,
        key: &'static str,
    },
    #[error("field {key} of revision {revision} ends at {end}, past the download size {size}")]
    FieldOutOfBounds {
        revision: &'static str,
        key: &'static str,
        end: usize,
        size: usize,
    },
    #[error("invalid version range: {0}")]
    InvalidVersionRange(#[from] VersionError),
    #[error("field {key} of revision {revision} has an invalid table: {reason}")]
    InvalidFieldTable {
        revision: &'static str,
        key: &'static str,
        reason: String,
    },
}
