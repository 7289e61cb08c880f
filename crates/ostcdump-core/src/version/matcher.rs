use super::error::VersionError;
use super::parser::parse_version;

/// Sentinel upper bound meaning "this version and all newer".
pub const UNBOUNDED_VERSION: u32 = 99_999;

/// Inclusive firmware version range.
///
/// # Examples
/// ```
/// use ostcdump_core::VersionMatcher;
///
/// let newer = VersionMatcher::parse_from("1.91").unwrap();
/// assert!(newer.contains(191));
/// assert!(!newer.contains(190));
/// assert!(newer.contains(99_999));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionMatcher {
    min: u32,
    max: u32,
}

impl VersionMatcher {
    /// Build a bounded range.
    ///
    /// # Errors
    /// Returns `VersionError::InvertedRange` when `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, VersionError> {
        if min > max {
            return Err(VersionError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Range covering `min` and every newer version.
    pub const fn from_version(min: u32) -> Self {
        Self {
            min,
            max: UNBOUNDED_VERSION,
        }
    }

    /// Parse a `MAJOR.MINOR` lower bound into an unbounded range.
    pub fn parse_from(min: &str) -> Result<Self, VersionError> {
        Ok(Self::from_version(parse_version(min)?))
    }

    /// Parse both bounds of a closed range.
    pub fn parse_between(min: &str, max: &str) -> Result<Self, VersionError> {
        Self::new(parse_version(min)?, parse_version(max)?)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max == UNBOUNDED_VERSION
    }

    pub fn contains(&self, version: u32) -> bool {
        self.min <= version && (self.is_unbounded() || version <= self.max)
    }

    /// Number of versions covered; narrower ranges are more specific.
    pub fn span(&self) -> u32 {
        self.max - self.min
    }

    pub fn overlaps(&self, other: &VersionMatcher) -> bool {
        let self_max = if self.is_unbounded() { u32::MAX } else { self.max };
        let other_max = if other.is_unbounded() { u32::MAX } else { other.max };
        self.min <= other_max && other.min <= self_max
    }
}

impl std::fmt::Display for VersionMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let min = super::format_version(self.min);
        if self.is_unbounded() {
            write!(f, "{min}+")
        } else {
            write!(f, "{min}..={}", super::format_version(self.max))
        }
    }
}
