//! WHERE-clause expressions: condition atoms and logic connectors.

use crate::types::Value;

/// A comparison operator allowed in a condition atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A logic connector joining two condition atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

/// A single condition atom: `column operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: CompareOp,
    pub value: Value,
}

/// A flat WHERE clause: condition atoms interleaved with connectors,
/// evaluated strictly left-to-right with no precedence (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
pub enum WhereItem {
    Condition(Condition),
    Connector(Logic),
}

pub type Where = Vec<WhereItem>;
