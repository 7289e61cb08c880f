use thiserror::Error;

/// Errors returned when parsing versions or building version ranges.
///
/// # Examples
/// ```
/// use ostcdump_core::VersionError;
///
/// let err = VersionError::Malformed { input: "1".to_string() };
/// assert!(err.to_string().contains("malformed firmware version"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("malformed firmware version '{input}': expected MAJOR.MINOR")]
    Malformed { input: String },
    #[error("inverted version range: min {min} is greater than max {max}")]
    InvertedRange { min: u32, max: u32 },
}
