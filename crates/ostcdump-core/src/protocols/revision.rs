//! Firmware revisions and parent chaining.
//!
//! A revision owns a small table of fields at absolute offsets and delegates
//! everything else to its parent. Decoding runs the parent first and then
//! overwrites or extends the result with the revision's own fields; encoding
//! does the same in the same order, so a newer revision always wins for the
//! keys it redefines. The merged feature list and every inherited property
//! (version range, hash keys, download size) are resolved once at build time.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::common::{DumpReader, DumpWriter};
use super::error::{ProtocolError, RegistryError};
use super::field::{FieldEntry, Normalization};
use crate::Settings;
use crate::feature::FeatureKey;
use crate::version::VersionMatcher;

/// One firmware-version-bound schema.
///
/// Instances are immutable once built and shared through `Arc`.
#[derive(Debug)]
pub struct ProtocolRevision {
    name: &'static str,
    versions: VersionMatcher,
    hash_keys: Vec<&'static str>,
    download_size: usize,
    fields: Vec<FieldEntry>,
    parent: Option<Arc<ProtocolRevision>>,
    features: Vec<FeatureKey>,
}

/// Builder for `ProtocolRevision`; `build` validates the table.
#[derive(Debug)]
pub struct RevisionBuilder {
    name: &'static str,
    versions: Option<VersionMatcher>,
    hash_keys: Option<Vec<&'static str>>,
    download_size: Option<usize>,
    fields: Vec<FieldEntry>,
    parent: Option<Arc<ProtocolRevision>>,
}

impl RevisionBuilder {
    pub fn versions(mut self, versions: VersionMatcher) -> Self {
        self.versions = Some(versions);
        self
    }

    pub fn extends(mut self, parent: Arc<ProtocolRevision>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn hash_keys(mut self, keys: &[&'static str]) -> Self {
        self.hash_keys = Some(keys.to_vec());
        self
    }

    pub fn download_size(mut self, size: usize) -> Self {
        self.download_size = Some(size);
        self
    }

    pub fn field(mut self, entry: FieldEntry) -> Self {
        self.fields.push(entry);
        self
    }

    pub fn fields(mut self, entries: &[FieldEntry]) -> Self {
        self.fields.extend_from_slice(entries);
        self
    }

    /// # Errors
    /// Returns a `RegistryError` when a root property is missing, a field is
    /// declared twice, a field ends past the download size, or a field's
    /// static table is inconsistent.
    pub fn build(self) -> Result<Arc<ProtocolRevision>, RegistryError> {
        let name = self.name;
        let parent = self.parent.as_deref();
        let missing = |what| RegistryError::MissingRootProperty {
            revision: name,
            what,
        };
        let versions = self
            .versions
            .or_else(|| parent.map(ProtocolRevision::firmware_versions))
            .ok_or_else(|| missing("firmware versions"))?;
        let hash_keys = match (self.hash_keys, parent) {
            (Some(keys), _) => keys,
            (None, Some(parent)) => parent.hash_keys.clone(),
            (None, None) => return Err(missing("hash keys")),
        };
        let size = self
            .download_size
            .or_else(|| parent.map(ProtocolRevision::download_size))
            .ok_or_else(|| missing("download size"))?;

        let mut seen = BTreeSet::new();
        for entry in &self.fields {
            if !seen.insert(entry.name()) {
                return Err(RegistryError::DuplicateField {
                    revision: name,
                    key: entry.name(),
                });
            }
            entry
                .validate()
                .map_err(|reason| RegistryError::InvalidFieldTable {
                    revision: name,
                    key: entry.name(),
                    reason,
                })?;
        }

        let inherited = parent.map(ProtocolRevision::effective_fields).unwrap_or_default();
        for entry in inherited.iter().chain(self.fields.iter()) {
            if entry.end() > size {
                return Err(RegistryError::FieldOutOfBounds {
                    revision: name,
                    key: entry.name(),
                    end: entry.end(),
                    size,
                });
            }
        }

        let mut features = parent.map(|p| p.features.clone()).unwrap_or_default();
        for entry in &self.fields {
            match features.iter_mut().find(|key| **key == entry.key) {
                Some(existing) => *existing = entry.key,
                None => features.push(entry.key),
            }
        }

        Ok(Arc::new(ProtocolRevision {
            name,
            versions,
            hash_keys,
            download_size: size,
            fields: self.fields,
            parent: self.parent,
            features,
        }))
    }
}

impl ProtocolRevision {
    pub fn builder(name: &'static str) -> RevisionBuilder {
        RevisionBuilder {
            name,
            versions: None,
            hash_keys: None,
            download_size: None,
            fields: Vec::new(),
            parent: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&Arc<ProtocolRevision>> {
        self.parent.as_ref()
    }

    /// Firmware range claimed by this revision, inherited when unset.
    pub fn firmware_versions(&self) -> VersionMatcher {
        self.versions
    }

    /// Opaque authentication keys, inherited when unset.
    pub fn hash_keys(&self) -> &[&'static str] {
        &self.hash_keys
    }

    /// Dump size this revision requires, inherited when unset.
    pub fn download_size(&self) -> usize {
        self.download_size
    }

    /// Fields declared by this revision alone.
    pub fn own_fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Resolved feature list: parent order first, overrides in place,
    /// additions appended.
    pub fn features(&self) -> &[FeatureKey] {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<FeatureKey> {
        self.features.iter().copied().find(|key| key.name() == name)
    }

    /// This revision followed by its ancestors, newest first.
    pub fn chain(&self) -> impl Iterator<Item = &ProtocolRevision> {
        std::iter::successors(Some(self), |rev| rev.parent.as_deref())
    }

    /// Fields that actually produce the decoded value of each key: a
    /// descendant's entry shadows every ancestor entry with the same name.
    pub fn effective_fields(&self) -> Vec<FieldEntry> {
        let mut shadowed = BTreeSet::new();
        let mut fields = Vec::new();
        for revision in self.chain() {
            for entry in &revision.fields {
                if !shadowed.contains(entry.name()) {
                    fields.push(*entry);
                }
            }
            shadowed.extend(revision.fields.iter().map(FieldEntry::name));
        }
        fields.sort_by_key(|entry| entry.offset);
        fields
    }

    /// Decode a dump into a settings map.
    ///
    /// # Errors
    /// Returns `ProtocolError::TruncatedDump` when the dump is shorter than
    /// `download_size`. Out-of-range device values never fail.
    pub fn decode(&self, dump: &[u8]) -> Result<Settings, ProtocolError> {
        self.decode_report(dump).map(|(settings, _)| settings)
    }

    /// Like `decode`, also returning every field replaced by its fallback.
    pub fn decode_report(
        &self,
        dump: &[u8],
    ) -> Result<(Settings, Vec<Normalization>), ProtocolError> {
        let reader = DumpReader::new(dump);
        reader.require_len(self.download_size())?;
        let mut settings = Settings::new();
        let mut normalized = Vec::new();
        self.decode_into(&reader, &mut settings, &mut normalized)?;
        Ok((settings, normalized))
    }

    /// Write every field present in `settings` into `dump`.
    ///
    /// Keys missing from `settings` leave their bytes untouched, as do all
    /// regions no field owns. `settings` is never modified.
    ///
    /// # Errors
    /// Returns `ProtocolError::TruncatedDump` when `dump` is shorter than
    /// `download_size`, and a value error when an entry does not fit its
    /// field. The dump may be partially written when an error is returned.
    pub fn encode(&self, settings: &Settings, dump: &mut [u8]) -> Result<(), ProtocolError> {
        let mut writer = DumpWriter::new(dump);
        writer.require_len(self.download_size())?;
        self.encode_into(settings, &mut writer, &BTreeSet::new())
    }

    fn decode_into(
        &self,
        reader: &DumpReader<'_>,
        settings: &mut Settings,
        normalized: &mut Vec<Normalization>,
    ) -> Result<(), ProtocolError> {
        if let Some(parent) = &self.parent {
            parent.decode_into(reader, settings, normalized)?;
        }
        for entry in &self.fields {
            let (value, note) = entry.decode(reader)?;
            normalized.retain(|n| n.key != entry.name());
            normalized.extend(note);
            // BTreeMap::insert keeps the old key; replace it so the new kind sticks.
            settings.remove(entry.name());
            settings.insert(entry.key, value);
        }
        Ok(())
    }

    fn encode_into(
        &self,
        settings: &Settings,
        writer: &mut DumpWriter<'_>,
        shadowed: &BTreeSet<&'static str>,
    ) -> Result<(), ProtocolError> {
        if let Some(parent) = &self.parent {
            let mut parent_shadowed = shadowed.clone();
            parent_shadowed.extend(self.fields.iter().map(FieldEntry::name));
            parent.encode_into(settings, writer, &parent_shadowed)?;
        }
        for entry in &self.fields {
            if shadowed.contains(entry.name()) {
                continue;
            }
            match settings.get(entry.name()) {
                Some(value) => entry.encode(value, writer)?,
                None => log::debug!(
                    "{}: {} not set, leaving bytes {:?} untouched",
                    self.name,
                    entry.name(),
                    entry.range()
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BoundedInt, Value};

    fn root() -> Arc<ProtocolRevision> {
        ProtocolRevision::builder("root")
            .versions(VersionMatcher::new(100, 149).unwrap())
            .hash_keys(&["root-key"])
            .download_size(32)
            .field(FieldEntry::eight_bit(0, "A", 1))
            .field(FieldEntry::eight_bit(4, "B", 2))
            .build()
            .unwrap()
    }

    fn child(parent: Arc<ProtocolRevision>) -> Arc<ProtocolRevision> {
        ProtocolRevision::builder("child")
            .versions(VersionMatcher::from_version(150))
            .extends(parent)
            .field(FieldEntry::fifteen_bit(12, "B", 2))
            .field(FieldEntry::eight_bit(8, "C", 3))
            .build()
            .unwrap()
    }

    fn cf(default: u32, current: u32, bits: u8) -> Value {
        Value::BoundedInt(BoundedInt::new(default, current, bits).unwrap())
    }

    #[test]
    fn child_inherits_unset_properties() {
        let child = child(root());
        assert_eq!(child.download_size(), 32);
        assert_eq!(child.hash_keys(), ["root-key"]);
        assert_eq!(child.firmware_versions(), VersionMatcher::from_version(150));
        let names: Vec<_> = child.chain().map(ProtocolRevision::name).collect();
        assert_eq!(names, ["child", "root"]);
    }

    #[test]
    fn features_keep_parent_order_with_overrides_in_place() {
        let child = child(root());
        let names: Vec<_> = child.features().iter().map(FeatureKey::name).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(child.own_fields().len(), 2);
    }

    #[test]
    fn child_decode_overrides_parent_entry() {
        let child = child(root());
        let mut dump = [0u8; 32];
        dump[4] = 9;
        dump[12..16].copy_from_slice(&[0x2C, 0x81, 0x07, 0x00]);
        let settings = child.decode(&dump).unwrap();
        assert_eq!(settings.len(), 3);
        assert_eq!(settings.get("B"), Some(&cf(300, 7, 15)));
        let parent_view = root().decode(&dump).unwrap();
        assert_eq!(parent_view.get("B"), Some(&cf(9, 0, 8)));
    }

    #[test]
    fn override_drops_stale_parent_normalization() {
        let child = child(root());
        let mut dump = [0u8; 32];
        dump[4..8].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        let (_, parent_notes) = root().decode_report(&dump).unwrap();
        assert_eq!(parent_notes.len(), 1);
        let (_, child_notes) = child.decode_report(&dump).unwrap();
        assert!(child_notes.is_empty());
    }

    #[test]
    fn encode_skips_shadowed_parent_location() {
        let child = child(root());
        let mut settings = Settings::new();
        settings.insert(FeatureKey::bounded_int("B"), cf(300, 7, 15));
        let mut dump = [0xAAu8; 32];
        child.encode(&settings, &mut dump).unwrap();
        assert_eq!(&dump[4..8], &[0xAA; 4]);
        assert_eq!(&dump[12..16], &[0x2C, 0x81, 0x07, 0x00]);
        assert_eq!(&dump[0..4], &[0xAA; 4]);
    }

    #[test]
    fn truncated_dump_is_rejected() {
        let err = root().decode(&[0u8; 31]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TruncatedDump {
                needed: 32,
                actual: 31
            }
        );
        let mut short = [0u8; 8];
        assert!(root().encode(&Settings::new(), &mut short).is_err());
    }

    #[test]
    fn effective_fields_list_each_key_once() {
        let child = child(root());
        let fields = child.effective_fields();
        let layout: Vec<_> = fields.iter().map(|f| (f.name(), f.offset)).collect();
        assert_eq!(layout, [("A", 0), ("C", 8), ("B", 12)]);
    }

    #[test]
    fn build_rejects_bad_tables() {
        let err = ProtocolRevision::builder("orphan")
            .download_size(8)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingRootProperty { .. }));

        let err = ProtocolRevision::builder("dup")
            .extends(root())
            .field(FieldEntry::eight_bit(8, "X", 0))
            .field(FieldEntry::eight_bit(12, "X", 0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateField { key: "X", .. }));

        let err = ProtocolRevision::builder("wide")
            .extends(root())
            .field(FieldEntry::eight_bit(30, "X", 0))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::FieldOutOfBounds { end: 34, size: 32, .. }
        ));

        let err = ProtocolRevision::builder("shrunk")
            .extends(root())
            .download_size(6)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::FieldOutOfBounds { key: "B", .. }));
    }
}
