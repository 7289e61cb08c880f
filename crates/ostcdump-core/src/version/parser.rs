use super::error::VersionError;

/// Largest minor component accepted by `parse_version`.
///
/// Minors occupy the two low decimal digits of the encoded value.
pub const MAX_MINOR: u32 = 99;

/// Parse a `MAJOR.MINOR` firmware string into `major * 100 + minor`.
///
/// # Examples
/// ```
/// use ostcdump_core::parse_version;
///
/// assert_eq!(parse_version("1.91").unwrap(), 191);
/// assert!(parse_version("1.9.1").is_err());
/// ```
///
/// # Errors
/// Returns `VersionError::Malformed` unless the input is exactly two
/// dot-separated decimal integers with a minor part of at most 99.
pub fn parse_version(input: &str) -> Result<u32, VersionError> {
    let malformed = || VersionError::Malformed {
        input: input.to_string(),
    };
    let mut parts = input.trim().split('.');
    let (Some(major), Some(minor), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let major = parse_component(major).ok_or_else(malformed)?;
    let minor = parse_component(minor).ok_or_else(malformed)?;
    if minor > MAX_MINOR {
        return Err(malformed());
    }
    major
        .checked_mul(100)
        .and_then(|value| value.checked_add(minor))
        .ok_or_else(malformed)
}

/// Decode the raw firmware byte pair stored in a dump.
///
/// # Examples
/// ```
/// use ostcdump_core::version_from_bytes;
///
/// assert_eq!(version_from_bytes(1, 91), 191);
/// ```
pub fn version_from_bytes(high: u8, low: u8) -> u32 {
    u32::from(high) * 100 + u32::from(low)
}

/// Render an encoded version back into `MAJOR.MINOR` form.
///
/// # Examples
/// ```
/// use ostcdump_core::format_version;
///
/// assert_eq!(format_version(191), "1.91");
/// assert_eq!(format_version(105), "1.05");
/// ```
pub fn format_version(version: u32) -> String {
    format!("{}.{:02}", version / 100, version % 100)
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_part_version() {
        assert_eq!(parse_version("1.91").unwrap(), 191);
        assert_eq!(parse_version("2.0").unwrap(), 200);
        assert_eq!(parse_version(" 1.60 ").unwrap(), 160);
    }

    #[test]
    fn parse_rejects_wrong_part_count() {
        for input in ["1", "1.9.1", "", "."] {
            let err = parse_version(input).unwrap_err();
            assert!(matches!(err, VersionError::Malformed { .. }), "{input}");
        }
    }

    #[test]
    fn parse_rejects_non_digits() {
        for input in ["a.91", "1.x", "+1.91", "1.-1", "1 .91"] {
            assert!(parse_version(input).is_err(), "{input}");
        }
    }

    #[test]
    fn parse_rejects_three_digit_minor() {
        assert!(parse_version("1.100").is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(parse_version("99999999999.1").is_err());
        assert!(parse_version("42949673.0").is_err());
    }

    #[test]
    fn from_bytes_matches_parse() {
        assert_eq!(version_from_bytes(1, 91), parse_version("1.91").unwrap());
        assert_eq!(version_from_bytes(0xFF, 0xFF), 255 * 100 + 255);
    }

    #[test]
    fn format_pads_minor() {
        assert_eq!(format_version(100), "1.00");
        assert_eq!(format_version(191), "1.91");
    }
}
