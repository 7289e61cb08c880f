use std::sync::Arc;

use super::common::DumpReader;
use super::error::{ProtocolError, RegistryError};
use super::layout;
use super::revision::ProtocolRevision;
use crate::version::{format_version, version_from_bytes};

/// Known revisions of one dump family, selected by embedded firmware version.
///
/// Overlapping ranges are allowed only with different widths; the narrower
/// range wins at lookup. Exact duplicates and equal-width overlaps are
/// rejected at registration so lookups never see a tie.
///
/// # Examples
/// ```
/// use ostcdump_core::protocols::mk2;
///
/// let registry = mk2::build_registry().unwrap();
/// let revision = registry.select_version(191).unwrap();
/// assert_eq!(revision.name(), "mk2-1.91");
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    revisions: Vec<Arc<ProtocolRevision>>,
    version_high_offset: usize,
    version_low_offset: usize,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::with_version_offsets(
            layout::FIRMWARE_VERSION_HIGH_OFFSET,
            layout::FIRMWARE_VERSION_LOW_OFFSET,
        )
    }

    pub fn with_version_offsets(high: usize, low: usize) -> Self {
        Self {
            revisions: Vec::new(),
            version_high_offset: high,
            version_low_offset: low,
        }
    }

    pub fn version_offsets(&self) -> (usize, usize) {
        (self.version_high_offset, self.version_low_offset)
    }

    /// # Errors
    /// Returns `RegistryError::DuplicateVersionRange` when the range exactly
    /// matches a registered one, `AmbiguousVersionRange` when it overlaps a
    /// registered range of equal width, and `DuplicateRevisionName` when the
    /// name is taken.
    pub fn register(&mut self, revision: Arc<ProtocolRevision>) -> Result<(), RegistryError> {
        let range = revision.firmware_versions();
        for existing in &self.revisions {
            if existing.name() == revision.name() {
                return Err(RegistryError::DuplicateRevisionName {
                    name: revision.name(),
                });
            }
            let existing_range = existing.firmware_versions();
            if existing_range == range {
                return Err(RegistryError::DuplicateVersionRange {
                    existing: existing.name(),
                    candidate: revision.name(),
                    range,
                });
            }
            if existing_range.overlaps(&range) && existing_range.span() == range.span() {
                return Err(RegistryError::AmbiguousVersionRange {
                    existing: existing.name(),
                    existing_range,
                    candidate: revision.name(),
                    candidate_range: range,
                });
            }
        }
        self.revisions.push(revision);
        Ok(())
    }

    pub fn revisions(&self) -> &[Arc<ProtocolRevision>] {
        &self.revisions
    }

    /// Read the firmware version embedded in a dump.
    ///
    /// # Errors
    /// Returns `ProtocolError::TruncatedDump` when the version bytes are
    /// missing.
    pub fn firmware_version(&self, dump: &[u8]) -> Result<u32, ProtocolError> {
        let reader = DumpReader::new(dump);
        let high = reader.read_u8(self.version_high_offset)?;
        let low = reader.read_u8(self.version_low_offset)?;
        Ok(version_from_bytes(high, low))
    }

    /// Pick the revision for a dump from its embedded version bytes.
    pub fn select_for(&self, dump: &[u8]) -> Result<Arc<ProtocolRevision>, ProtocolError> {
        let version = self.firmware_version(dump)?;
        self.select_version(version)
    }

    /// Most specific revision whose range contains `version`.
    pub fn select_version(&self, version: u32) -> Result<Arc<ProtocolRevision>, ProtocolError> {
        let revision = self
            .revisions
            .iter()
            .filter(|rev| rev.firmware_versions().contains(version))
            .min_by_key(|rev| rev.firmware_versions().span())
            .cloned()
            .ok_or(ProtocolError::NoMatchingProtocol { version })?;
        log::debug!(
            "firmware {} -> revision {}",
            format_version(version),
            revision.name()
        );
        Ok(revision)
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<ProtocolRevision>, ProtocolError> {
        self.revisions
            .iter()
            .find(|rev| rev.name() == name)
            .cloned()
            .ok_or_else(|| ProtocolError::UnknownProtocol {
                name: name.to_string(),
            })
    }
}
