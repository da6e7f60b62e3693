//! Error types for SQL parsing and persisted state.
//!
//! # Error Handling Strategy
//!
//! This crate uses two complementary error handling patterns:
//!
//! - [`ParseError`]: a parser failure for one batch of a script. These never abort a
//!   directory scan; they are collected next to the facts that could still be
//!   extracted and surfaced as log lines.
//!
//! - [`PersistError`]: failures while loading or saving analysis state. These are
//!   fatal for the call that produced them and are returned as `Result` errors.
//!
//! Unresolvable fields and missing routes are not errors at all: field resolution
//! falls back to the literal name and route search returns a sentinel route.

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error encountered while parsing one batch of a SQL script.
///
/// This error preserves structured information from the underlying parser
/// including position information when available.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Position of the error within the file, if available.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ParseError {
    /// Creates a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
        }
    }

    /// Creates a parse error with position information.
    pub fn with_position(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            dialect: None,
        }
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Shifts the reported line so it is relative to the start of the file
    /// instead of the start of the batch that failed.
    ///
    /// Errors without a position are anchored to the first line of the batch.
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        match self.position.as_mut() {
            Some(position) => position.line += offset,
            None if offset > 0 => {
                self.position = Some(Position {
                    line: offset + 1,
                    column: 1,
                })
            }
            None => {}
        }
        self
    }

    /// Line of the error, 1 when the parser did not report a position.
    pub fn line(&self) -> usize {
        self.position.map(|p| p.line).unwrap_or(1)
    }

    /// Column of the error, 1 when the parser did not report a position.
    pub fn column(&self) -> usize {
        self.position.map(|p| p.column).unwrap_or(1)
    }

    /// Renders the error as a diagnostic line: ` - (line,column):message`.
    pub fn diagnostic_line(&self) -> String {
        format!(" - ({},{}):{}", self.line(), self.column(), self.message)
    }

    /// Parses position from sqlparser error message format.
    ///
    /// sqlparser uses format like "Expected ..., found ... at Line: X, Column: Y"
    ///
    /// # Implementation Note
    ///
    /// This parsing is coupled to the `sqlparser` crate's error message format.
    /// Gracefully returns `None` when the expected format is not found.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let result = re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if result.is_none() && (message.contains("Line") || message.contains("Column")) {
            trace!(
                "Failed to parse position from error message that appears to contain position info: {}",
                message
            );
        }

        result
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);

        Self {
            message,
            position,
            dialect: None,
        }
    }
}

/// Errors raised while loading or saving persisted analysis state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed analysis state: {0}")]
    Json(#[from] serde_json::Error),

    /// A record whose `kind` discriminant is missing or not recognised.
    #[error("Unknown analysis record at index {index}: kind {}", .kind.as_deref().unwrap_or("<missing>"))]
    UnknownVariant { index: usize, kind: Option<String> },

    #[error("Invalid {kind} record at index {index}: {source}")]
    Record {
        index: usize,
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_from_message() {
        let msg = "Expected SELECT, found 'INSERT' at Line: 1, Column: 5";
        let pos = ParseError::parse_position_from_message(msg);
        assert_eq!(pos, Some(Position { line: 1, column: 5 }));
    }

    #[test]
    fn test_parse_position_no_position() {
        let pos = ParseError::parse_position_from_message("Unexpected token");
        assert_eq!(pos, None);
    }

    #[test]
    fn test_parse_position_no_whitespace() {
        let pos = ParseError::parse_position_from_message("Error at Line:1,Column:5");
        assert_eq!(pos, Some(Position { line: 1, column: 5 }));
    }

    #[test]
    fn test_parse_position_reversed_order() {
        let pos = ParseError::parse_position_from_message("Error at Column: 5, Line: 1");
        assert_eq!(pos, None);
    }

    #[test]
    fn test_line_offset_shifts_position() {
        let err = ParseError::with_position("boom", 2, 7).with_line_offset(10);
        assert_eq!(err.position, Some(Position { line: 12, column: 7 }));
        assert_eq!(err.diagnostic_line(), " - (12,7):boom");
    }

    #[test]
    fn test_line_offset_without_position() {
        let err = ParseError::new("boom").with_line_offset(10);
        assert_eq!(err.position, Some(Position { line: 11, column: 1 }));

        let first_batch = ParseError::new("boom").with_line_offset(0);
        assert_eq!(first_batch.position, None);
        assert_eq!(first_batch.line(), 1);
    }

    #[test]
    fn test_from_parser_error_keeps_message_and_position() {
        let err = ParseError::from(sqlparser::parser::ParserError::ParserError(
            "Expected: an expression, found: FROM at Line: 3, Column: 8".to_string(),
        ));
        assert_eq!(err.position, Some(Position { line: 3, column: 8 }));
        assert_eq!(
            err.diagnostic_line(),
            " - (3,8):sql parser error: Expected: an expression, found: FROM at Line: 3, Column: 8"
        );
    }

    #[test]
    fn test_display_includes_dialect_and_position() {
        let err = ParseError::with_position("bad token", 3, 4).with_dialect(Dialect::Mssql);
        assert_eq!(
            err.to_string(),
            "Parse error (Mssql) at line 3, column 4: bad token"
        );
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = PersistError::UnknownVariant {
            index: 3,
            kind: None,
        };
        assert_eq!(
            err.to_string(),
            "Unknown analysis record at index 3: kind <missing>"
        );
    }
}
