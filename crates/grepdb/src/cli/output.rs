//! Terminal styling for search output

use crate::highlight::Marker;
use crossterm::style::Stylize;
use std::io::IsTerminal;

/// When to emit ANSI colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Colour when stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// Styles for the parts of a search report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// `app.Model field` heading
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.dark_cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// `label (pk=N)` line
    pub fn record(&self, text: &str) -> String {
        if self.color {
            text.dark_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn link(&self, text: &str) -> String {
        if self.color {
            text.dark_green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn marker(&self) -> Marker {
        if self.color {
            Marker::Ansi
        } else {
            Marker::Brackets
        }
    }
}
