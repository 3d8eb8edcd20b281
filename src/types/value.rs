//! SQL value types.

use std::fmt;

/// A tagged SQL value. Flows from parser literals through constraint
/// checks, into row storage, and back out in results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INT",
            Value::Text(_) => "VARCHAR",
            Value::Boolean(_) => "BOOLEAN",
        }
    }

    /// Render this value the way the snapshot/display layer expects:
    /// the textual form used by VARCHAR coercion and `Display`.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Integer(0).is_null());
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::Integer(1).type_name(), "INT");
        assert_eq!(Value::Text("x".into()).type_name(), "VARCHAR");
        assert_eq!(Value::Boolean(true).type_name(), "BOOLEAN");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Text("hi".into()).to_string(), "hi");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_value_from_conversions() {
        assert_eq!(Value::from(5i64), Value::Integer(5));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
        assert_eq!(Value::from(true), Value::Boolean(true));
    }
}
