//! Load diagnostics
//!
//! Every problem found while reading a program or a query flows through
//! [`Diagnostic`]. A diagnostic carries a message and, when the problem can be
//! pinned to the source, a [`Location`] with a 0-based character offset and
//! 1-based line and column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a diagnostic in its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Character offset (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Location {
    /// Resolve a character offset into line and column
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for c in source.chars().take(offset) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A load error: a message plus an optional source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Main diagnostic message
    pub message: String,
    /// Where the problem was found, if it maps to a point in the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Errors raised while loading a program or query
pub type LoadError = Diagnostic;

impl Diagnostic {
    /// Diagnostic at a character offset of `source`
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Some(Location::from_offset(source, offset)),
        }
    }

    /// Diagnostic with no source position
    pub fn detached(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Render the diagnostic with a caret under the offending column
    pub fn to_human_string(&self, source: &str) -> String {
        let Some(location) = self.location else {
            return format!("error: {}", self.message);
        };
        let snippet = source.lines().nth(location.line - 1).unwrap_or("");
        let gutter = location.line.to_string().len();
        format!(
            "error: {message}\n{pad} --> {location}\n{pad} |\n{line} | {snippet}\n{pad} | {caret}^",
            message = self.message,
            pad = " ".repeat(gutter),
            line = location.line,
            caret = " ".repeat(location.column - 1),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} (at {})", self.message, location),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}
