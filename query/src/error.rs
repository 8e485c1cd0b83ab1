//! Query parse error types.

use std::fmt;

/// A parse error with the byte position it occurred at.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn unexpected_eof(position: usize, expected: &str) -> Self {
        Self::new(
            format!("unexpected end of query, expected {}", expected),
            position,
        )
    }

    pub fn unexpected_token(position: usize, expected: &str, found: &str) -> Self {
        Self::new(format!("expected {}, found {}", expected, found), position)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "query parse error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
