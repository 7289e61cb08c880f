//! Offsets and encodings shared by every revision of the supported family.

/// Dump offset of the firmware major byte.
pub const FIRMWARE_VERSION_HIGH_OFFSET: usize = 264;
/// Dump offset of the firmware minor byte.
pub const FIRMWARE_VERSION_LOW_OFFSET: usize = 265;

/// Bytes per custom-function slot: default (u16 LE) then current (u16 LE).
pub const CUSTOM_FUNCTION_SLOT_LEN: usize = 4;
/// Bytes per selection slot.
pub const SELECTION_SLOT_LEN: usize = 1;

/// Index of the default's high byte inside a custom-function slot.
pub const DEFAULT_HIGH_BYTE: usize = 1;
/// Flag set on the default's high byte of 15-bit custom functions.
pub const FIFTEEN_BIT_FLAG: u8 = 0x80;
/// Bit stripped from the decoded default of 15-bit custom functions.
pub const FIFTEEN_BIT_FLAG_MASK: u16 = 0x8000;
