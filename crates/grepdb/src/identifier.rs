//! `app.Model[.field...]` identifiers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A model, optionally narrowed to specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub app_label: String,
    pub model: String,
    /// Explicit fields; empty means "discover by kind"
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier '{0}': expected app.Model or app.Model.field")]
pub struct IdentifierError(pub String);

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 2 || parts.iter().any(|part| part.is_empty()) {
            return Err(IdentifierError(s.to_string()));
        }
        Ok(Self {
            app_label: parts[0].to_string(),
            model: parts[1].to_string(),
            fields: parts[2..].iter().map(|f| f.to_string()).collect(),
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model)?;
        for field in &self.fields {
            write!(f, ".{}", field)?;
        }
        Ok(())
    }
}
