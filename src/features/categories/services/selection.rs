use uuid::Uuid;

use crate::features::categories::services::TreeIndex;

/// The selected category id as owned by the surrounding form.
///
/// Kept as the raw string value; an empty string means nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    raw: String,
}

impl Selection {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Blank or non-uuid values resolve to no selection
    pub fn selected_id(&self) -> Option<Uuid> {
        Uuid::parse_str(self.raw.trim()).ok()
    }

    /// Label of the selected entry, if it exists in the index
    pub fn label<'a>(&self, index: &'a TreeIndex) -> Option<&'a str> {
        self.selected_id().and_then(|id| index.label(id))
    }

    pub fn display_label<'a>(&self, index: &'a TreeIndex, placeholder: &'a str) -> &'a str {
        self.label(index).unwrap_or(placeholder)
    }
}
