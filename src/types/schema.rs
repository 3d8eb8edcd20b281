//! Column definitions: declared type, VARCHAR length, and constraints.

use super::value::Value;
use crate::error::{Result, SimpleDbError};
use std::fmt;

/// The declared type tag of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Varchar,
    Boolean,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Varchar => write!(f, "VARCHAR"),
            DataType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// A column constraint, drawn from a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey,
    Unique,
    NotNull,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::PrimaryKey => write!(f, "PRIMARY KEY"),
            Constraint::Unique => write!(f, "UNIQUE"),
            Constraint::NotNull => write!(f, "NOT NULL"),
        }
    }
}

const DEFAULT_VARCHAR_LENGTH: usize = 255;

/// A single column's declaration: name, type, optional VARCHAR length,
/// and an unordered set of constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub length: Option<usize>,
    pub constraints: Vec<Constraint>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn varchar_length(&self) -> usize {
        self.length.unwrap_or(DEFAULT_VARCHAR_LENGTH)
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&Constraint::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.contains(&Constraint::Unique)
    }

    /// PRIMARY KEY implies NOT NULL.
    pub fn is_not_null(&self) -> bool {
        self.is_primary_key() || self.constraints.contains(&Constraint::NotNull)
    }

    /// Coerce an incoming value toward this column's declared type.
    /// Null always passes; the constraint check happens separately.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self.data_type {
            DataType::Int => match value {
                Value::Integer(_) => Ok(value),
                Value::Text(ref s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                    SimpleDbError::DataType(format!("Cannot convert '{}' to INT", s))
                }),
                Value::Boolean(b) => Ok(Value::Integer(if b { 1 } else { 0 })),
                Value::Null => unreachable!(),
            },
            DataType::Varchar => {
                let text = match value {
                    Value::Text(s) => s,
                    other => other.render(),
                };
                let max_length = self.varchar_length();
                if text.chars().count() > max_length {
                    return Err(SimpleDbError::DataType(format!(
                        "String too long for VARCHAR({}): {} chars",
                        max_length,
                        text.chars().count()
                    )));
                }
                Ok(Value::Text(text))
            }
            DataType::Boolean => match value {
                Value::Boolean(_) => Ok(value),
                Value::Integer(i) => Ok(Value::Boolean(i != 0)),
                Value::Text(ref s) => {
                    if s.eq_ignore_ascii_case("true") || s == "1" || s.eq_ignore_ascii_case("yes")
                    {
                        Ok(Value::Boolean(true))
                    } else if s.eq_ignore_ascii_case("false")
                        || s == "0"
                        || s.eq_ignore_ascii_case("no")
                    {
                        Ok(Value::Boolean(false))
                    } else {
                        Err(SimpleDbError::DataType(format!(
                            "Cannot convert '{}' to BOOLEAN",
                            s
                        )))
                    }
                }
                Value::Null => unreachable!(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_implies_not_null() {
        let col = ColumnDef::new("id", DataType::Int)
            .with_constraints(vec![Constraint::PrimaryKey]);
        assert!(col.is_not_null());
        assert!(col.is_primary_key());
    }

    #[test]
    fn test_coerce_int_from_text() {
        let col = ColumnDef::new("age", DataType::Int);
        assert_eq!(col.coerce(Value::Text("42".into())).unwrap(), Value::Integer(42));
        assert!(col.coerce(Value::Text("abc".into())).is_err());
    }

    #[test]
    fn test_coerce_varchar_overflow() {
        let col = ColumnDef::new("name", DataType::Varchar).with_length(3);
        assert!(col.coerce(Value::Text("abcd".into())).is_err());
        assert!(col.coerce(Value::Text("abc".into())).is_ok());
    }

    #[test]
    fn test_coerce_boolean_from_text() {
        let col = ColumnDef::new("active", DataType::Boolean);
        assert_eq!(col.coerce(Value::Text("YES".into())).unwrap(), Value::Boolean(true));
        assert_eq!(col.coerce(Value::Text("no".into())).unwrap(), Value::Boolean(false));
        assert!(col.coerce(Value::Text("maybe".into())).is_err());
    }

    #[test]
    fn test_coerce_null_always_passes() {
        let col = ColumnDef::new("id", DataType::Int)
            .with_constraints(vec![Constraint::PrimaryKey]);
        assert_eq!(col.coerce(Value::Null).unwrap(), Value::Null);
    }
}
