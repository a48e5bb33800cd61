//! Presentation preferences read once when a table session is opened.

/// Numbering base for row and column header labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    /// Headers start at 0.
    #[default]
    Zero,
    /// Headers start at 1.
    One,
}

impl IndexBase {
    /// Offset added to every header label.
    pub fn offset(self) -> u64 {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Process-wide defaults for newly opened tables.
#[derive(Debug, Clone)]
pub struct TablePreferences {
    /// Show enum names instead of raw integers when a table opens.
    pub convert_enum: bool,
    /// Numbering base for row header labels.
    pub index_base: IndexBase,
    /// Decimal pattern used when the custom number format is chosen.
    pub custom_pattern: String,
    /// Pattern used by the scientific number format.
    pub scientific_pattern: String,
}

impl Default for TablePreferences {
    fn default() -> Self {
        Self {
            convert_enum: true,
            index_base: IndexBase::Zero,
            custom_pattern: "###.#####".to_string(),
            scientific_pattern: "0.0###E0###".to_string(),
        }
    }
}
