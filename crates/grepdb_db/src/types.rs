//! Row types returned by the data-access layer.

/// One record whose searched field matched the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Primary key rendered as text
    pub pk: String,
    /// Human-readable label (`label` column or `<Model> object`)
    pub label: String,
    /// Raw text of the searched field
    pub value: String,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (pk={})", self.label, self.pk)
    }
}
