use serde::{Deserialize, Serialize};

use super::common::{DumpReader, DumpWriter};
use super::error::ProtocolError;
use super::layout;
use crate::feature::FeatureKey;
use crate::value::{BoundedInt, EIGHT_BIT, FIFTEEN_BIT, Selection, Value, ValueError, ValueKind};

/// On-device encoding of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    /// Classic custom function: the high byte of each value is zero.
    EightBit { fallback: u16 },
    /// Extended custom function: the default's high byte carries
    /// `FIFTEEN_BIT_FLAG`, which is stripped again on decode.
    FifteenBit { fallback: u16 },
    /// One byte holding a code from `allowed`; `labels[i]` names `allowed[i]`.
    Selection {
        allowed: &'static [i32],
        labels: &'static [&'static str],
        fallback: i32,
    },
}

impl FieldCodec {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldCodec::EightBit { .. } | FieldCodec::FifteenBit { .. } => ValueKind::BoundedInt,
            FieldCodec::Selection { .. } => ValueKind::Selection,
        }
    }

    pub fn slot_len(&self) -> usize {
        match self {
            FieldCodec::EightBit { .. } | FieldCodec::FifteenBit { .. } => {
                layout::CUSTOM_FUNCTION_SLOT_LEN
            }
            FieldCodec::Selection { .. } => layout::SELECTION_SLOT_LEN,
        }
    }
}

/// One row of a revision's offset table.
///
/// Offsets are absolute dump positions, never relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    pub offset: usize,
    pub key: FeatureKey,
    pub codec: FieldCodec,
}

/// Record of a device value that was replaced by its fallback on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    pub key: String,
    pub offset: usize,
    pub reason: NormalizationReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationReason {
    /// Raw default/current as read, after flag stripping.
    OutOfRange { bits: u8, default: u16, current: u16 },
    UnknownSelection { code: u8 },
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            NormalizationReason::OutOfRange {
                bits,
                default,
                current,
            } => write!(
                f,
                "{} @ {}: raw default {default:#06x} / current {current:#06x} exceed {bits} bits",
                self.key, self.offset
            ),
            NormalizationReason::UnknownSelection { code } => {
                write!(f, "{} @ {}: unknown selection code {code}", self.key, self.offset)
            }
        }
    }
}

impl FieldEntry {
    pub const fn eight_bit(offset: usize, name: &'static str, fallback: u16) -> Self {
        Self {
            offset,
            key: FeatureKey::bounded_int(name),
            codec: FieldCodec::EightBit { fallback },
        }
    }

    pub const fn fifteen_bit(offset: usize, name: &'static str, fallback: u16) -> Self {
        Self {
            offset,
            key: FeatureKey::bounded_int(name),
            codec: FieldCodec::FifteenBit { fallback },
        }
    }

    pub const fn selection(
        offset: usize,
        name: &'static str,
        allowed: &'static [i32],
        labels: &'static [&'static str],
        fallback: i32,
    ) -> Self {
        Self {
            offset,
            key: FeatureKey::selection(name),
            codec: FieldCodec::Selection {
                allowed,
                labels,
                fallback,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    /// First offset past this field.
    pub fn end(&self) -> usize {
        self.offset + self.codec.slot_len()
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }

    /// Check the static table for inconsistencies a decode could trip on.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self.codec {
            FieldCodec::EightBit { fallback } => check_width(fallback, EIGHT_BIT),
            FieldCodec::FifteenBit { fallback } => check_width(fallback, FIFTEEN_BIT),
            FieldCodec::Selection {
                allowed,
                labels,
                fallback,
            } => {
                if let Some(code) = allowed.iter().find(|code| u8::try_from(**code).is_err()) {
                    return Err(format!("code {code} does not fit one byte"));
                }
                Selection::new(fallback, allowed.to_vec(), owned_labels(labels))
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            }
        }
    }

    pub(crate) fn decode(
        &self,
        reader: &DumpReader<'_>,
    ) -> Result<(Value, Option<Normalization>), ProtocolError> {
        match self.codec {
            FieldCodec::EightBit { fallback } => {
                let default = reader.read_u16_le(self.offset)?;
                let current = reader.read_u16_le(self.offset + 2)?;
                Ok(self.bounded(default, current, EIGHT_BIT, fallback))
            }
            FieldCodec::FifteenBit { fallback } => {
                let default = reader.read_u16_le(self.offset)? & !layout::FIFTEEN_BIT_FLAG_MASK;
                let current = reader.read_u16_le(self.offset + 2)?;
                Ok(self.bounded(default, current, FIFTEEN_BIT, fallback))
            }
            FieldCodec::Selection {
                allowed,
                labels,
                fallback,
            } => {
                let code = reader.read_u8(self.offset)?;
                let known = allowed.contains(&i32::from(code));
                let selected = if known { i32::from(code) } else { fallback };
                let value = Selection::new(selected, allowed.to_vec(), owned_labels(labels))?;
                let normalized = (!known).then(|| {
                    log::debug!(
                        "{} @ {}: unknown selection code {code}, using {fallback}",
                        self.name(),
                        self.offset
                    );
                    Normalization {
                        key: self.name().to_string(),
                        offset: self.offset,
                        reason: NormalizationReason::UnknownSelection { code },
                    }
                });
                Ok((Value::Selection(value), normalized))
            }
        }
    }

    pub(crate) fn encode(
        &self,
        value: &Value,
        writer: &mut DumpWriter<'_>,
    ) -> Result<(), ProtocolError> {
        let expected = self.codec.kind();
        if value.kind() != expected {
            return Err(ProtocolError::ValueKindMismatch {
                key: self.name(),
                expected,
                actual: value.kind(),
            });
        }
        match (self.codec, value) {
            (FieldCodec::EightBit { .. }, Value::BoundedInt(cf)) => {
                self.check_fits(cf, EIGHT_BIT)?;
                writer.write_slice(self.offset, &cf.to_le_bytes())
            }
            (FieldCodec::FifteenBit { .. }, Value::BoundedInt(cf)) => {
                self.check_fits(cf, FIFTEEN_BIT)?;
                let mut bytes = cf.to_le_bytes();
                // TODO: confirm against device firmware whether the current
                // value's high byte should carry the flag as well.
                bytes[layout::DEFAULT_HIGH_BYTE] |= layout::FIFTEEN_BIT_FLAG;
                writer.write_slice(self.offset, &bytes)
            }
            (FieldCodec::Selection { allowed, .. }, Value::Selection(selection)) => {
                let selected = selection.selected_value();
                let unencodable = ProtocolError::UnencodableSelection {
                    key: self.name(),
                    selected,
                };
                if !allowed.contains(&selected) {
                    return Err(unencodable);
                }
                let code = u8::try_from(selected).map_err(|_| unencodable)?;
                writer.write_u8(self.offset, code)
            }
            _ => Err(ProtocolError::ValueKindMismatch {
                key: self.name(),
                expected,
                actual: value.kind(),
            }),
        }
    }

    fn bounded(
        &self,
        default: u16,
        current: u16,
        bits: u8,
        fallback: u16,
    ) -> (Value, Option<Normalization>) {
        let (raw_default, raw_current) = (u32::from(default), u32::from(current));
        let value = BoundedInt::lenient(raw_default, raw_current, bits, fallback);
        let clean = BoundedInt::fits(raw_default, bits) && BoundedInt::fits(raw_current, bits);
        let normalized = (!clean).then(|| {
            log::debug!(
                "{} @ {}: {default:#06x}/{current:#06x} exceed {bits} bits, using fallback {fallback}",
                self.name(),
                self.offset
            );
            Normalization {
                key: self.name().to_string(),
                offset: self.offset,
                reason: NormalizationReason::OutOfRange {
                    bits,
                    default,
                    current,
                },
            }
        });
        (Value::BoundedInt(value), normalized)
    }

    fn check_fits(&self, cf: &BoundedInt, bits: u8) -> Result<(), ProtocolError> {
        for value in [cf.default_value(), cf.current()] {
            if !BoundedInt::fits(u32::from(value), bits) {
                return Err(ProtocolError::FieldOverflow {
                    key: self.name(),
                    bits,
                    value,
                });
            }
        }
        Ok(())
    }
}

fn owned_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

fn check_width(fallback: u16, bits: u8) -> Result<(), String> {
    if BoundedInt::fits(u32::from(fallback), bits) {
        Ok(())
    } else {
        Err(ValueError::OutOfRange {
            value: u32::from(fallback),
            bits,
        }
        .to_string())
    }
}
