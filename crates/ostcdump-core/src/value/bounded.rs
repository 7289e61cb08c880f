use serde::{Deserialize, Serialize};

use super::error::ValueError;

/// Width of the classic custom functions.
pub const EIGHT_BIT: u8 = 8;
/// Width of the extended custom functions.
pub const FIFTEEN_BIT: u8 = 15;
/// Widest value that still fits the 16-bit on-device slot.
pub const MAX_BITS: u8 = 16;

/// Custom-function value: a factory default and the active value, both
/// limited to `bits` bits.
///
/// # Examples
/// ```
/// use ostcdump_core::BoundedInt;
///
/// let cf = BoundedInt::new(5, 3, 8).unwrap();
/// assert_eq!(cf.default_value(), 5);
/// assert_eq!(cf.current(), 3);
/// assert!(BoundedInt::new(256, 0, 8).is_err());
/// assert_eq!(BoundedInt::lenient(256, 3, 8, 10).default_value(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoundedIntRepr", into = "BoundedIntRepr")]
pub struct BoundedInt {
    bits: u8,
    default: u16,
    current: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BoundedIntRepr {
    bits: u8,
    default: u32,
    current: u32,
}

impl BoundedInt {
    /// Strict constructor for programmatic values.
    ///
    /// # Errors
    /// Returns `ValueError::InvalidWidth` for widths outside `1..=16` and
    /// `ValueError::OutOfRange` when either value uses bits beyond `bits`.
    pub fn new(default: u32, current: u32, bits: u8) -> Result<Self, ValueError> {
        let mask = width_mask(bits)?;
        let default = checked(default, bits, mask)?;
        let current = checked(current, bits, mask)?;
        Ok(Self {
            bits,
            default,
            current,
        })
    }

    /// Lenient constructor for device bytes.
    ///
    /// Never fails: any value with bits beyond the width is replaced by
    /// `fallback`. The width is clamped to `1..=16` and the fallback is
    /// masked to it, so the result always satisfies the width invariant.
    pub fn lenient(default: u32, current: u32, bits: u8, fallback: u16) -> Self {
        let bits = bits.clamp(1, MAX_BITS);
        let mask = raw_mask(bits);
        let fallback = fallback & mask as u16;
        let pick = |value: u32| {
            if fits(value, mask) {
                value as u16
            } else {
                fallback
            }
        };
        Self {
            bits,
            default: pick(default),
            current: pick(current),
        }
    }

    /// Whether `value` satisfies the width `bits`.
    pub fn fits(value: u32, bits: u8) -> bool {
        match width_mask(bits) {
            Ok(mask) => fits(value, mask),
            Err(_) => false,
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn default_value(&self) -> u16 {
        self.default
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    /// Copy with a new active value, validated against this width.
    pub fn with_current(self, current: u32) -> Result<Self, ValueError> {
        Self::new(u32::from(self.default), current, self.bits)
    }

    /// Little-endian layout: default (2 bytes) then current (2 bytes).
    ///
    /// Width-specific flag bits are the caller's responsibility.
    pub fn to_le_bytes(&self) -> [u8; 4] {
        let [d0, d1] = self.default.to_le_bytes();
        let [c0, c1] = self.current.to_le_bytes();
        [d0, d1, c0, c1]
    }
}

impl TryFrom<BoundedIntRepr> for BoundedInt {
    type Error = ValueError;

    fn try_from(repr: BoundedIntRepr) -> Result<Self, Self::Error> {
        BoundedInt::new(repr.default, repr.current, repr.bits)
    }
}

impl From<BoundedInt> for BoundedIntRepr {
    fn from(value: BoundedInt) -> Self {
        BoundedIntRepr {
            bits: value.bits,
            default: u32::from(value.default),
            current: u32::from(value.current),
        }
    }
}

fn width_mask(bits: u8) -> Result<u32, ValueError> {
    if bits == 0 || bits > MAX_BITS {
        return Err(ValueError::InvalidWidth { bits });
    }
    Ok(raw_mask(bits))
}

fn raw_mask(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

fn fits(value: u32, mask: u32) -> bool {
    value & !mask == 0
}

fn checked(value: u32, bits: u8, mask: u32) -> Result<u16, ValueError> {
    if !fits(value, mask) {
        return Err(ValueError::OutOfRange { value, bits });
    }
    Ok(value as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_accepts_values_within_width() {
        let cf = BoundedInt::new(255, 0, EIGHT_BIT).unwrap();
        assert_eq!(cf.default_value(), 255);
        assert_eq!(cf.current(), 0);
        assert_eq!(cf.bits(), 8);
    }

    #[test]
    fn strict_rejects_either_value_out_of_range() {
        assert_eq!(
            BoundedInt::new(256, 0, EIGHT_BIT).unwrap_err(),
            ValueError::OutOfRange { value: 256, bits: 8 }
        );
        assert_eq!(
            BoundedInt::new(0, 0x8000, FIFTEEN_BIT).unwrap_err(),
            ValueError::OutOfRange {
                value: 0x8000,
                bits: 15
            }
        );
    }

    #[test]
    fn strict_rejects_bad_width() {
        assert_eq!(
            BoundedInt::new(0, 0, 0).unwrap_err(),
            ValueError::InvalidWidth { bits: 0 }
        );
        assert_eq!(
            BoundedInt::new(0, 0, 17).unwrap_err(),
            ValueError::InvalidWidth { bits: 17 }
        );
    }

    #[test]
    fn lenient_replaces_only_the_bad_value() {
        let cf = BoundedInt::lenient(40, 0x1234, EIGHT_BIT, 30);
        assert_eq!(cf.default_value(), 40);
        assert_eq!(cf.current(), 30);
    }

    #[test]
    fn lenient_masks_fallback_to_width() {
        let cf = BoundedInt::lenient(0x100, 0, EIGHT_BIT, 0x1FF);
        assert_eq!(cf.default_value(), 0xFF);
    }

    #[test]
    fn with_current_keeps_width() {
        let cf = BoundedInt::new(10, 10, EIGHT_BIT).unwrap();
        assert_eq!(cf.with_current(200).unwrap().current(), 200);
        assert!(cf.with_current(300).is_err());
    }

    #[test]
    fn le_bytes_default_first() {
        let cf = BoundedInt::new(0x1234, 0x0056, FIFTEEN_BIT).unwrap();
        assert_eq!(cf.to_le_bytes(), [0x34, 0x12, 0x56, 0x00]);
    }

    #[test]
    fn sixteen_bit_width_is_full_range() {
        assert!(BoundedInt::new(0xFFFF, 0xFFFF, MAX_BITS).is_ok());
        assert!(!BoundedInt::fits(0x1_0000, MAX_BITS));
    }
}
