use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Settings;
use crate::codec::DecodedDump;
use crate::protocols::ProtocolRevision;
use crate::protocols::field::Normalization;
use crate::value::{Value, ValueKind};
use crate::version::format_version;

/// Current settings document schema version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Serializable view of a decoded dump, and the input format for edits.
///
/// Settings are keyed by feature name in stable (sorted) order.
///
/// # Examples
/// ```
/// use ostcdump_core::{DumpCodec, Settings, make_settings_document};
///
/// let codec = DumpCodec::mk2().unwrap();
/// let revision = codec.registry().by_name("mk2-1.00").unwrap();
/// let dump = codec.encode(&Settings::new(), &revision, None).unwrap();
/// let document = make_settings_document(&codec.decode(&dump).unwrap());
/// assert_eq!(document.protocol.name, "mk2-1.00");
/// assert_eq!(document.firmware_version, "1.00");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Document schema version (not the binary version).
    pub document_version: u32,
    pub tool: ToolInfo,
    pub protocol: ProtocolInfo,
    /// Firmware version embedded in the dump, `MAJOR.MINOR`.
    pub firmware_version: String,
    /// Fields replaced by their fallback while decoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normalized: Vec<Normalization>,
    pub settings: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    /// Revision name, usable as a protocol hint.
    pub name: String,
    /// Firmware range claimed by the revision.
    pub firmware_versions: String,
    pub hash_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("revision {revision} has no feature named {name}")]
    UnknownFeature { revision: &'static str, name: String },
    #[error("feature {name} expects a {expected} value, got {actual}")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

/// Build the serializable document for a decoded dump.
pub fn make_settings_document(decoded: &DecodedDump) -> SettingsDocument {
    let revision = &decoded.revision;
    SettingsDocument {
        document_version: DOCUMENT_VERSION,
        tool: ToolInfo {
            name: "ostcdump".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol: ProtocolInfo {
            name: revision.name().to_string(),
            firmware_versions: revision.firmware_versions().to_string(),
            hash_keys: revision.hash_keys().iter().map(|k| k.to_string()).collect(),
        },
        firmware_version: format_version(decoded.firmware_version),
        normalized: decoded.normalized.clone(),
        settings: decoded
            .settings
            .iter()
            .map(|(key, value)| (key.name().to_string(), value.clone()))
            .collect(),
    }
}

impl SettingsDocument {
    /// Resolve names against `revision` into a typed settings map.
    ///
    /// # Errors
    /// Returns `DocumentError::UnknownFeature` for names the revision does
    /// not expose and `DocumentError::KindMismatch` when a value's kind
    /// differs from the feature's.
    pub fn to_settings(&self, revision: &ProtocolRevision) -> Result<Settings, DocumentError> {
        let mut settings = Settings::new();
        for (name, value) in &self.settings {
            let key = revision
                .feature(name)
                .ok_or_else(|| DocumentError::UnknownFeature {
                    revision: revision.name(),
                    name: name.clone(),
                })?;
            if key.kind() != value.kind() {
                return Err(DocumentError::KindMismatch {
                    name: name.clone(),
                    expected: key.kind(),
                    actual: value.kind(),
                });
            }
            settings.insert(key, value.clone());
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DumpCodec;
    use crate::protocols::mk2;
    use crate::value::{BoundedInt, Selection};

    fn decoded_1_91() -> (DumpCodec, DecodedDump) {
        let codec = DumpCodec::mk2().unwrap();
        let revision = codec.registry().by_name(mk2::REVISION_1_91).unwrap();
        let dump = codec.encode(&Settings::new(), &revision, None).unwrap();
        let decoded = codec.decode(&dump).unwrap();
        (codec, decoded)
    }

    #[test]
    fn document_lists_every_feature() {
        let (_, decoded) = decoded_1_91();
        let document = make_settings_document(&decoded);
        assert_eq!(document.settings.len(), decoded.revision.features().len());
        assert_eq!(document.protocol.firmware_versions, "1.91+");
        assert_eq!(document.protocol.hash_keys.len(), 2);
    }

    #[test]
    fn document_omits_empty_normalizations() {
        let (_, decoded) = decoded_1_91();
        let value = serde_json::to_value(make_settings_document(&decoded)).unwrap();
        assert!(value.get("normalized").is_none());
        assert_eq!(value["settings"]["CF02"]["kind"], "bounded_int");
        assert_eq!(value["settings"]["DEEP_STOP"]["kind"], "selection");
    }

    #[test]
    fn json_round_trip_resolves_to_same_settings() {
        let (_, decoded) = decoded_1_91();
        let json = serde_json::to_string(&make_settings_document(&decoded)).unwrap();
        let document: SettingsDocument = serde_json::from_str(&json).unwrap();
        let settings = document.to_settings(&decoded.revision).unwrap();
        assert_eq!(settings, decoded.settings);
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let (_, decoded) = decoded_1_91();
        let mut document = make_settings_document(&decoded);
        document.settings.insert(
            "CF99".to_string(),
            Value::BoundedInt(BoundedInt::new(0, 0, 8).unwrap()),
        );
        let err = document.to_settings(&decoded.revision).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownFeature { .. }));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let (_, decoded) = decoded_1_91();
        let mut document = make_settings_document(&decoded);
        let selection = Selection::new(0, vec![0], vec!["x".to_string()]).unwrap();
        document
            .settings
            .insert("CF00".to_string(), Value::Selection(selection));
        let err = document.to_settings(&decoded.revision).unwrap_err();
        assert!(matches!(err, DocumentError::KindMismatch { .. }));
    }
}
