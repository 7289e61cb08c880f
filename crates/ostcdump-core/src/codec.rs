use std::sync::Arc;

use thiserror::Error;

use crate::Settings;
use crate::document::DocumentError;
use crate::protocols::field::Normalization;
use crate::protocols::mk2;
use crate::protocols::{ProtocolError, ProtocolRegistry, ProtocolRevision, RegistryError};
use crate::source::{DumpSource, SourceError};
use crate::version::format_version;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("protocol configuration error: {0}")]
    Registry(#[from] RegistryError),
    #[error("settings document error: {0}")]
    Document(#[from] DocumentError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// Result of decoding one dump.
#[derive(Debug, Clone)]
pub struct DecodedDump {
    pub settings: Settings,
    pub revision: Arc<ProtocolRevision>,
    /// Firmware version embedded in the dump (`major * 100 + minor`).
    pub firmware_version: u32,
    /// Fields whose device bytes were replaced by their fallback.
    pub normalized: Vec<Normalization>,
}

/// Decode/encode façade over a `ProtocolRegistry`.
///
/// # Examples
/// ```
/// use ostcdump_core::{DumpCodec, Settings};
///
/// let codec = DumpCodec::mk2().unwrap();
/// let revision = codec.registry().by_name("mk2-1.91").unwrap();
/// let fresh = codec.encode(&Settings::new(), &revision, None).unwrap();
///
/// let decoded = codec.decode(&fresh).unwrap();
/// assert_eq!(decoded.revision.name(), "mk2-1.91");
/// assert_eq!(decoded.firmware_version, 191);
/// ```
#[derive(Debug, Clone)]
pub struct DumpCodec {
    registry: Arc<ProtocolRegistry>,
}

impl DumpCodec {
    pub fn new(registry: ProtocolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Codec over the built-in Mk.2 revision chain.
    pub fn mk2() -> Result<Self, CodecError> {
        Ok(Self::new(mk2::build_registry()?))
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    /// Select the revision from the embedded firmware version and decode.
    ///
    /// # Errors
    /// Returns `TruncatedDump` or `NoMatchingProtocol` from the protocol
    /// layer.
    pub fn decode(&self, dump: &[u8]) -> Result<DecodedDump, CodecError> {
        self.decode_with_hint(dump, None)
    }

    /// Decode with an optional revision name that bypasses version matching.
    pub fn decode_with_hint(
        &self,
        dump: &[u8],
        hint: Option<&str>,
    ) -> Result<DecodedDump, CodecError> {
        let firmware_version = self.registry.firmware_version(dump)?;
        let revision = match hint {
            Some(name) => {
                let revision = self.registry.by_name(name)?;
                if !revision.firmware_versions().contains(firmware_version) {
                    log::warn!(
                        "protocol hint {} claims {}, dump reports firmware {}",
                        revision.name(),
                        revision.firmware_versions(),
                        format_version(firmware_version)
                    );
                }
                revision
            }
            None => self.registry.select_version(firmware_version)?,
        };
        let (settings, normalized) = revision.decode_report(dump)?;
        Ok(DecodedDump {
            settings,
            revision,
            firmware_version,
            normalized,
        })
    }

    /// Read a dump from `source` and decode it.
    pub fn decode_source<S: DumpSource>(
        &self,
        mut source: S,
        hint: Option<&str>,
    ) -> Result<DecodedDump, CodecError> {
        let dump = source.read_dump()?;
        self.decode_with_hint(&dump, hint)
    }

    /// Encode `settings` with `revision`.
    ///
    /// With `original`, the output starts as a copy of the first
    /// `download_size` bytes of that dump, so every byte no field owns is
    /// preserved. Without it, the output is zero-filled and stamped with the
    /// revision's minimum firmware version so it decodes back to the same
    /// revision.
    ///
    /// # Errors
    /// Returns `TruncatedDump` when `original` is shorter than the
    /// revision's download size, `UnstampableVersion` when a fresh dump
    /// cannot carry the revision's minimum version in its two version
    /// bytes, and value errors for entries that do not fit their field.
    pub fn encode(
        &self,
        settings: &Settings,
        revision: &ProtocolRevision,
        original: Option<&[u8]>,
    ) -> Result<Vec<u8>, CodecError> {
        let size = revision.download_size();
        let mut dump = match original {
            Some(original) => original
                .get(..size)
                .ok_or(ProtocolError::TruncatedDump {
                    needed: size,
                    actual: original.len(),
                })?
                .to_vec(),
            None => self.fresh_dump(revision)?,
        };
        revision.encode(settings, &mut dump)?;
        Ok(dump)
    }

    fn fresh_dump(&self, revision: &ProtocolRevision) -> Result<Vec<u8>, ProtocolError> {
        let mut dump = vec![0u8; revision.download_size()];
        let version = revision.firmware_versions().min();
        let (high_offset, low_offset) = self.registry.version_offsets();
        let needed = high_offset.max(low_offset) + 1;
        if dump.len() < needed {
            return Err(ProtocolError::TruncatedDump {
                needed,
                actual: dump.len(),
            });
        }
        let unstampable = || ProtocolError::UnstampableVersion { version };
        dump[high_offset] = u8::try_from(version / 100).map_err(|_| unstampable())?;
        dump[low_offset] = u8::try_from(version % 100).map_err(|_| unstampable())?;
        Ok(dump)
    }
}
