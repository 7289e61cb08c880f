use serde::{Deserialize, Serialize};

use super::error::ValueError;

/// Enumerated choice over a fixed set of device codes.
///
/// `labels[i]` names `allowed[i]`. The selected code is always a member of
/// `allowed`.
///
/// # Examples
/// ```
/// use ostcdump_core::Selection;
///
/// let stop = Selection::new(
///     1,
///     vec![0, 1],
///     vec!["shallow stop".to_string(), "deep stop".to_string()],
/// )
/// .unwrap();
/// assert_eq!(stop.selected_value(), 1);
/// assert_eq!(stop.selected_label(), Some("deep stop"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SelectionRepr", into = "SelectionRepr")]
pub struct Selection {
    selected: i32,
    allowed: Vec<i32>,
    labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SelectionRepr {
    selected: i32,
    allowed: Vec<i32>,
    labels: Vec<String>,
}

impl Selection {
    /// # Errors
    /// Returns `ValueError::LabelCountMismatch` when labels and allowed codes
    /// differ in length, and `ValueError::InvalidSelection` when `selected`
    /// is not an allowed code.
    pub fn new(selected: i32, allowed: Vec<i32>, labels: Vec<String>) -> Result<Self, ValueError> {
        if allowed.len() != labels.len() {
            return Err(ValueError::LabelCountMismatch {
                allowed: allowed.len(),
                labels: labels.len(),
            });
        }
        if !allowed.contains(&selected) {
            return Err(ValueError::InvalidSelection { selected, allowed });
        }
        Ok(Self {
            selected,
            allowed,
            labels,
        })
    }

    /// Raw device code of the current choice.
    pub fn selected_value(&self) -> i32 {
        self.selected
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.allowed
            .iter()
            .position(|code| *code == self.selected)
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }

    pub fn allowed(&self) -> &[i32] {
        &self.allowed
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Copy with another choice from the same allowed set.
    pub fn with_selected(&self, selected: i32) -> Result<Self, ValueError> {
        Self::new(selected, self.allowed.clone(), self.labels.clone())
    }
}

impl TryFrom<SelectionRepr> for Selection {
    type Error = ValueError;

    fn try_from(repr: SelectionRepr) -> Result<Self, Self::Error> {
        Selection::new(repr.selected, repr.allowed, repr.labels)
    }
}

impl From<Selection> for SelectionRepr {
    fn from(value: Selection) -> Self {
        SelectionRepr {
            selected: value.selected,
            allowed: value.allowed,
            labels: value.labels,
        }
    }
}
