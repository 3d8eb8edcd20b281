//! Error handling for the SimpleDB engine.
//!
//! This module provides the closed error taxonomy shared by the lexer,
//! parser, storage engine, and executor, plus source-location tracking
//! for parse failures.

use std::fmt;

/// A span in the source SQL text, represented as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn point(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// The kind of error the engine can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleDbError {
    /// Tokenizer/parser rejection, or empty input.
    Parse(String),
    /// An operation referenced an unknown table.
    TableNotFound(String),
    /// Insert/update/predicate referenced an unknown column.
    ColumnNotFound(String),
    /// Coercion failure, VARCHAR overflow, or an unknown operator.
    DataType(String),
    /// Insert/update would leave a NOT NULL column holding Null.
    NotNullViolation(String),
    /// Insert/update collided on the PRIMARY KEY column.
    PrimaryKeyViolation(String),
    /// Insert/update collided on a UNIQUE column.
    UniqueConstraintViolation(String),
}

impl fmt::Display for SimpleDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleDbError::Parse(msg) => write!(f, "{}", msg),
            SimpleDbError::TableNotFound(msg) => write!(f, "{}", msg),
            SimpleDbError::ColumnNotFound(msg) => write!(f, "{}", msg),
            SimpleDbError::DataType(msg) => write!(f, "{}", msg),
            SimpleDbError::NotNullViolation(msg) => write!(f, "{}", msg),
            SimpleDbError::PrimaryKeyViolation(msg) => write!(f, "{}", msg),
            SimpleDbError::UniqueConstraintViolation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SimpleDbError {}

impl SimpleDbError {
    pub fn parse(msg: impl Into<String>) -> Self {
        SimpleDbError::Parse(msg.into())
    }

    pub fn parse_at(msg: impl Into<String>, span: Span) -> Self {
        SimpleDbError::Parse(format!("{} at position {}", msg.into(), span.start))
    }

    pub fn table_not_found(name: &str) -> Self {
        SimpleDbError::TableNotFound(format!("Table '{}' does not exist", name))
    }

    pub fn column_not_found(name: &str) -> Self {
        SimpleDbError::ColumnNotFound(format!("Column '{}' not found", name))
    }
}

/// A specialized Result type for SimpleDB operations.
pub type Result<T> = std::result::Result<T, SimpleDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimpleDbError::table_not_found("users");
        assert_eq!(format!("{}", err), "Table 'users' does not exist");
    }

    #[test]
    fn test_parse_at_includes_position() {
        let err = SimpleDbError::parse_at("unexpected token", Span::point(7));
        assert!(format!("{}", err).contains("position 7"));
    }
}
