use thiserror::Error;

/// Errors raised by the strict value constructors.
///
/// These signal caller bugs (bad programmatic or editor input); values read
/// from device bytes never produce them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("value {value} out of range for {bits}-bit field")]
    OutOfRange { value: u32, bits: u8 },
    #[error("invalid bit width {bits}: expected 1..=16")]
    InvalidWidth { bits: u8 },
    #[error("invalid selection {selected}: allowed values are {allowed:?}")]
    InvalidSelection { selected: i32, allowed: Vec<i32> },
    #[error("selection has {allowed} allowed values but {labels} labels")]
    LabelCountMismatch { allowed: usize, labels: usize },
}
