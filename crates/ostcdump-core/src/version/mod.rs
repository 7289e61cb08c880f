//! Firmware version numbers and inclusive version ranges.
//!
//! Versions are plain `u32` values encoded as `major * 100 + minor`, so
//! firmware "1.91" is `191`. Dumps carry the version as a raw high/low byte
//! pair; `version_from_bytes` applies the same encoding. A `VersionMatcher`
//! is an inclusive `min..=max` range where `max` may be the unbounded
//! sentinel (`UNBOUNDED_VERSION`), meaning "this and all newer".

pub mod error;
pub mod matcher;
pub mod parser;

pub use error::VersionError;
pub use matcher::{UNBOUNDED_VERSION, VersionMatcher};
pub use parser::{format_version, parse_version, version_from_bytes};
