//! Typed setting values.
//!
//! Every decoded setting is one `Value`: either a bounded custom-function
//! integer pair (`BoundedInt`) or an enumerated choice (`Selection`). Both
//! types validate themselves at construction; the lenient constructors used
//! on device bytes never fail and substitute a fallback instead.
//!
//! Values serialize with an explicit `kind` tag so editors can round-trip
//! them through JSON; deserialization reruns the strict constructors.

pub mod bounded;
pub mod error;
pub mod selection;

pub use bounded::{BoundedInt, EIGHT_BIT, FIFTEEN_BIT, MAX_BITS};
pub use error::ValueError;
pub use selection::Selection;

use serde::{Deserialize, Serialize};

/// Discriminant of a `Value`, used by feature keys and field tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    BoundedInt,
    Selection,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::BoundedInt => f.write_str("bounded_int"),
            ValueKind::Selection => f.write_str("selection"),
        }
    }
}

/// One decoded setting.
///
/// # Examples
/// ```
/// use ostcdump_core::{BoundedInt, Value, ValueKind};
///
/// let value = Value::BoundedInt(BoundedInt::new(5, 3, 8).unwrap());
/// assert_eq!(value.kind(), ValueKind::BoundedInt);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    BoundedInt(BoundedInt),
    Selection(Selection),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::BoundedInt(_) => ValueKind::BoundedInt,
            Value::Selection(_) => ValueKind::Selection,
        }
    }

    pub fn as_bounded_int(&self) -> Option<&BoundedInt> {
        match self {
            Value::BoundedInt(value) => Some(value),
            Value::Selection(_) => None,
        }
    }

    pub fn as_selection(&self) -> Option<&Selection> {
        match self {
            Value::Selection(value) => Some(value),
            Value::BoundedInt(_) => None,
        }
    }
}

impl From<BoundedInt> for Value {
    fn from(value: BoundedInt) -> Self {
        Value::BoundedInt(value)
    }
}

impl From<Selection> for Value {
    fn from(value: Selection) -> Self {
        Value::Selection(value)
    }
}
