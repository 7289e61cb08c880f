//! Mk.2 revision chain.
//!
//! | Revision   | Firmware     | Adds                                    |
//! |------------|--------------|-----------------------------------------|
//! | `mk2-1.00` | 1.00–1.59    | CF00–CF31, `DECO_MODE`                  |
//! | `mk2-1.60` | 1.60–1.79    | CF32–CF47                               |
//! | `mk2-1.80` | 1.80–1.90    | CF48–CF63, wider `DECO_MODE` code set   |
//! | `mk2-1.91` | 1.91 and up  | CF02 re-encoded as 15-bit, `DEEP_STOP`  |
//!
//! Each revision extends the previous one; none repeats its parent's table.

pub mod layout;

use std::sync::Arc;

use crate::protocols::error::RegistryError;
use crate::protocols::registry::ProtocolRegistry;
use crate::protocols::revision::ProtocolRevision;
use crate::version::VersionMatcher;

pub const REVISION_1_00: &str = "mk2-1.00";
pub const REVISION_1_60: &str = "mk2-1.60";
pub const REVISION_1_80: &str = "mk2-1.80";
pub const REVISION_1_91: &str = "mk2-1.91";

const HASH_KEYS_1_00: &[&str] = &["3f9a1c0e7b2d4e58"];
const HASH_KEYS_1_80: &[&str] = &["c41e0b96a7d25f13"];
const HASH_KEYS_1_91: &[&str] = &["5d7be0c2194af836", "e02f6a91c3b87d45"];

/// Build the four revisions, oldest first.
pub fn build_revisions() -> Result<Vec<Arc<ProtocolRevision>>, RegistryError> {
    let v1_00 = ProtocolRevision::builder(REVISION_1_00)
        .versions(VersionMatcher::new(100, 159)?)
        .hash_keys(HASH_KEYS_1_00)
        .download_size(layout::DOWNLOAD_SIZE)
        .fields(layout::FIELDS_1_00)
        .build()?;
    let v1_60 = ProtocolRevision::builder(REVISION_1_60)
        .versions(VersionMatcher::new(160, 179)?)
        .extends(v1_00.clone())
        .fields(layout::FIELDS_1_60)
        .build()?;
    let v1_80 = ProtocolRevision::builder(REVISION_1_80)
        .versions(VersionMatcher::new(180, 190)?)
        .hash_keys(HASH_KEYS_1_80)
        .extends(v1_60.clone())
        .fields(layout::FIELDS_1_80)
        .build()?;
    let v1_91 = ProtocolRevision::builder(REVISION_1_91)
        .versions(VersionMatcher::from_version(191))
        .hash_keys(HASH_KEYS_1_91)
        .extends(v1_80.clone())
        .fields(layout::FIELDS_1_91)
        .build()?;
    Ok(vec![v1_00, v1_60, v1_80, v1_91])
}

/// Registry holding the whole Mk.2 chain.
pub fn build_registry() -> Result<ProtocolRegistry, RegistryError> {
    let mut registry = ProtocolRegistry::new();
    for revision in build_revisions()? {
        registry.register(revision)?;
    }
    Ok(registry)
}
