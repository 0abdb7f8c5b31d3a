//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// No database path from flags, environment or config
    pub fn no_database(config_path: &Path) -> Self {
        Self::new("No database configured")
            .with_context(format!("Looked for `database` in {}", config_path.display()))
            .with_suggestions([
                "TRY: Pass the database file: grepdb --database app.sqlite3 PATTERN app.Model".to_string(),
                "TRY: Set GREPDB_DATABASE".to_string(),
                format!("TRY: Add `database = \"...\"` to {}", config_path.display()),
            ])
    }

    /// Database file is missing
    pub fn database_not_found(path: &Path) -> Self {
        Self::new(format!("Database not found: {}", path.display()))
            .with_context("The configured database file does not exist")
            .with_suggestions([
                format!("TRY: Check that the file exists: ls -la {}", path.display()),
                "TRY: Relative `database` paths are resolved next to the config file".to_string(),
            ])
    }

    /// Pattern does not compile
    pub fn invalid_pattern(pattern: &str, details: &str) -> Self {
        Self::new(format!("Invalid pattern: {}", pattern))
            .with_context(details.to_string())
            .with_suggestion("TRY: Escape regex metacharacters such as ( [ . * with a backslash")
    }

    /// Identifier names a model missing from the schema
    pub fn unknown_model(identifier: &str) -> Self {
        Self::new(format!("Unknown model: {}", identifier))
            .with_context("Models are declared under [models.<app>.<Model>] in the config file")
            .with_suggestion("TRY: Check the app label and model name for typos")
    }

    /// Identifier names a field the model does not declare
    pub fn unknown_field(model: &str, field: &str, known: &[&str]) -> Self {
        let err = Self::new(format!("Unknown field: {}.{}", model, field))
            .with_context(format!("{} does not declare a field named '{}'", model, field));
        if known.is_empty() {
            err.with_suggestion("TRY: Declare the model's fields in the config file")
        } else {
            err.with_suggestion(format!("TRY: Known fields: {}", known.join(", ")))
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While searching")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While searching"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_database_not_found() {
        let path = PathBuf::from("/nonexistent/app.sqlite3");
        let display = HelpfulError::database_not_found(&path).to_string();
        assert!(display.contains("/nonexistent/app.sqlite3"));
        assert!(display.contains("TRY:"));
    }

    #[test]
    fn test_unknown_field_lists_known_fields() {
        let display =
            HelpfulError::unknown_field("tests.TestModel", "nope", &["text_field", "char_field"])
                .to_string();
        assert!(display.contains("Unknown field: tests.TestModel.nope"));
        assert!(display.contains("Known fields: text_field, char_field"));
    }
}
