//! Command tree definitions: the parser's structured output, one
//! variant per supported SQL statement kind.

mod expr;
mod stmt;

pub use expr::{CompareOp, Condition, Logic, Where, WhereItem};
pub use stmt::{Command, Direction, JoinSpec, OrderBy, Projection};

/// Strip everything before the final `.` in a (possibly dotted)
/// column name, e.g. `users.id` -> `id`. Bare names pass through.
pub fn column_suffix(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_suffix() {
        assert_eq!(column_suffix("users.id"), "id");
        assert_eq!(column_suffix("id"), "id");
        assert_eq!(column_suffix("a.b.c"), "c");
    }
}
