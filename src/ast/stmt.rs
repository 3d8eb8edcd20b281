//! Statement AST: the `Command` tagged variant produced by the parser.

use super::expr::Where;
use crate::types::{ColumnDef, Value};

/// Sort direction for ORDER BY; defaults to `Asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// `ORDER BY <column> [ASC|DESC]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// A single inner join: `[INNER] JOIN <table> ON <left> = <right>`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub table: String,
    pub left_col: String,
    pub right_col: String,
}

/// A single SELECT projection item.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Star,
    Column { name: String, alias: Option<String> },
    CountStar { alias: String },
}

/// The parser's structured output: one variant per supported SQL
/// statement kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    },
    DropTable {
        table: String,
    },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    },
    Select {
        table: String,
        projection: Vec<Projection>,
        join: Option<JoinSpec>,
        where_clause: Option<Where>,
        order_by: Option<OrderBy>,
        limit: Option<u64>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        where_clause: Option<Where>,
    },
    Delete {
        table: String,
        where_clause: Option<Where>,
    },
}
