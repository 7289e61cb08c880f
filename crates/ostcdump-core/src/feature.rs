use std::borrow::Borrow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::value::ValueKind;

/// Identifier of one named setting.
///
/// Equality, ordering and hashing use `name` only: two revisions may reuse
/// a name for the same logical setting with a different encoding. Because
/// of that, settings maps can be queried with a plain `&str`.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
///
/// use ostcdump_core::{FeatureKey, ValueKind};
///
/// let mut map = BTreeMap::new();
/// map.insert(FeatureKey::new("CF02", ValueKind::BoundedInt), 1);
/// assert_eq!(map.get("CF02"), Some(&1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FeatureKey {
    name: &'static str,
    kind: ValueKind,
}

impl FeatureKey {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }

    pub const fn bounded_int(name: &'static str) -> Self {
        Self::new(name, ValueKind::BoundedInt)
    }

    pub const fn selection(name: &'static str) -> Self {
        Self::new(name, ValueKind::Selection)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

impl PartialEq for FeatureKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FeatureKey {}

impl Hash for FeatureKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for FeatureKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FeatureKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name)
    }
}

impl Borrow<str> for FeatureKey {
    fn borrow(&self) -> &str {
        self.name
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for FeatureKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}
