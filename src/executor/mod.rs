//! The query executor: turns a parsed [`Command`] into effects on a
//! [`Database`] and a result the caller can render.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ast::{Command, Direction, Projection};
use crate::error::Result;
use crate::parser;
use crate::storage::{Database, Row};
use crate::types::Value;

/// The outcome of executing one SQL statement. `execute` never panics
/// and never returns an `Err` — every failure is folded into `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Rows {
        columns: Vec<String>,
        rows: Vec<Row>,
        count: usize,
    },
    Message(String),
    Error(String),
}

/// Executes SQL statements against a [`Database`], auto-saving to its
/// snapshot file (if any) after every successful mutating command.
pub struct Executor {
    db: Database,
}

impl Executor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Parse and run one SQL statement.
    pub fn execute(&mut self, sql: &str) -> ExecResult {
        match self.run(sql) {
            Ok(result) => result,
            Err(err) => ExecResult::Error(err.to_string()),
        }
    }

    fn run(&mut self, sql: &str) -> Result<ExecResult> {
        let command = parser::parse(sql)?;
        match command {
            Command::CreateTable {
                table,
                columns,
                if_not_exists,
            } => self.execute_create(table, columns, if_not_exists),
            Command::DropTable { table } => self.execute_drop(table),
            Command::Insert {
                table,
                columns,
                values,
            } => self.execute_insert(table, columns, values),
            Command::Select {
                table,
                projection,
                join,
                where_clause,
                order_by,
                limit,
            } => self.execute_select(table, projection, join, where_clause, order_by, limit),
            Command::Update {
                table,
                assignments,
                where_clause,
            } => self.execute_update(table, assignments, where_clause),
            Command::Delete { table, where_clause } => self.execute_delete(table, where_clause),
        }
    }

    fn execute_create(
        &mut self,
        table: String,
        columns: Vec<crate::types::ColumnDef>,
        if_not_exists: bool,
    ) -> Result<ExecResult> {
        if if_not_exists && self.db.list_tables().contains(&table.as_str()) {
            return Ok(ExecResult::Message(format!(
                "Table '{}' already exists (skipped)",
                table
            )));
        }

        self.db.create_table(&table, columns, if_not_exists)?;
        self.db.save()?;
        Ok(ExecResult::Message(format!(
            "Table '{}' created successfully",
            table
        )))
    }

    fn execute_drop(&mut self, table: String) -> Result<ExecResult> {
        self.db.drop_table(&table)?;
        self.db.save()?;
        Ok(ExecResult::Message(format!(
            "Table '{}' dropped successfully",
            table
        )))
    }

    fn execute_insert(
        &mut self,
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    ) -> Result<ExecResult> {
        let t = self.db.get_table(&table)?;

        let row: HashMap<String, Value> = match columns {
            Some(names) => {
                if names.len() != values.len() {
                    return Ok(ExecResult::Error(
                        "Column count does not match value count".to_string(),
                    ));
                }
                names.into_iter().zip(values).collect()
            }
            None => {
                if t.columns.len() != values.len() {
                    return Ok(ExecResult::Error(format!(
                        "Expected {} values, got {}",
                        t.columns.len(),
                        values.len()
                    )));
                }
                t.columns
                    .iter()
                    .map(|c| c.name.clone())
                    .zip(values)
                    .collect()
            }
        };

        self.db.get_table_mut(&table)?.insert_row(&row)?;
        self.db.save()?;
        Ok(ExecResult::Message("1 row inserted".to_string()))
    }

    fn execute_select(
        &mut self,
        table: String,
        projection: Vec<Projection>,
        join: Option<crate::ast::JoinSpec>,
        where_clause: Option<crate::ast::Where>,
        order_by: Option<crate::ast::OrderBy>,
        limit: Option<u64>,
    ) -> Result<ExecResult> {
        let t = self.db.get_table(&table)?;
        let row_indexes = t.find_rows(where_clause.as_ref())?;
        let mut rows: Vec<Row> = row_indexes
            .into_iter()
            .filter_map(|i| t.row_at(i).cloned())
            .collect();

        if let Some(order_by) = &order_by {
            let reverse = order_by.direction == Direction::Desc;
            rows.sort_by(|a, b| {
                let ordering = compare_for_order(a.get(&order_by.column), b.get(&order_by.column));
                if reverse {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }

        let join_table_name = join.as_ref().map(|j| j.table.clone());
        if let Some(join_spec) = &join {
            let join_table = self.db.get_table(&join_spec.table)?;
            let left_col = crate::ast::column_suffix(&join_spec.left_col);
            let right_col = crate::ast::column_suffix(&join_spec.right_col);

            let mut joined = Vec::new();
            for row in &rows {
                let Some(match_value) = row.get(left_col).filter(|v| !v.is_null()) else {
                    continue;
                };
                for (_, j_row) in join_table.live_rows() {
                    if j_row.get(right_col) == Some(match_value) {
                        let mut merged = row.clone();
                        for (k, v) in j_row {
                            if merged.contains_key(k) {
                                merged.insert(format!("{}.{}", join_spec.table, k), v.clone());
                            } else {
                                merged.insert(k.clone(), v.clone());
                            }
                        }
                        joined.push(merged);
                    }
                }
            }
            rows = joined;
        }

        if let Some(count_alias) = projection.iter().find_map(|p| match p {
            Projection::CountStar { alias } => Some(alias.clone()),
            _ => None,
        }) {
            let mut result_row = Row::new();
            result_row.insert(count_alias.clone(), Value::Integer(rows.len() as i64));
            return Ok(ExecResult::Rows {
                columns: vec![count_alias],
                rows: vec![result_row],
                count: 1,
            });
        }

        if projection.iter().any(|p| matches!(p, Projection::Star)) {
            let mut result_columns: Vec<String> =
                t.columns.iter().map(|c| c.name.clone()).collect();
            if let Some(join_table_name) = &join_table_name {
                let join_table = self.db.get_table(join_table_name)?;
                for col in &join_table.columns {
                    if !result_columns.contains(&col.name) {
                        result_columns.push(col.name.clone());
                    }
                }
            }
            let count = rows.len();
            return Ok(ExecResult::Rows {
                columns: result_columns,
                rows,
                count,
            });
        }

        let mappings: Vec<(String, String)> = projection
            .iter()
            .filter_map(|p| match p {
                Projection::Column { name, alias } => {
                    let source = crate::ast::column_suffix(name).to_string();
                    let alias = alias.clone().unwrap_or_else(|| source.clone());
                    Some((source, alias))
                }
                _ => None,
            })
            .collect();

        let result_columns: Vec<String> = mappings.iter().map(|(_, alias)| alias.clone()).collect();
        let result_rows: Vec<Row> = rows
            .iter()
            .map(|row| {
                mappings
                    .iter()
                    .map(|(source, alias)| {
                        (alias.clone(), row.get(source).cloned().unwrap_or(Value::Null))
                    })
                    .collect()
            })
            .collect();
        let count = result_rows.len();

        Ok(ExecResult::Rows {
            columns: result_columns,
            rows: result_rows,
            count,
        })
    }

    fn execute_update(
        &mut self,
        table: String,
        assignments: Vec<(String, Value)>,
        where_clause: Option<crate::ast::Where>,
    ) -> Result<ExecResult> {
        let updates: HashMap<String, Value> = assignments.into_iter().collect();
        let t = self.db.get_table(&table)?;
        let row_indexes = t.find_rows(where_clause.as_ref())?;

        let t = self.db.get_table_mut(&table)?;
        for index in &row_indexes {
            // A failure here leaves every prior index in this loop
            // already updated in memory without persisting — there is
            // no transaction to roll back (spec §4.6 update semantics).
            t.update_row(*index, &updates)?;
        }

        self.db.save()?;
        Ok(ExecResult::Message(format!(
            "{} row(s) updated",
            row_indexes.len()
        )))
    }

    fn execute_delete(
        &mut self,
        table: String,
        where_clause: Option<crate::ast::Where>,
    ) -> Result<ExecResult> {
        let t = self.db.get_table(&table)?;
        let row_indexes = t.find_rows(where_clause.as_ref())?;

        let t = self.db.get_table_mut(&table)?;
        let mut descending = row_indexes.clone();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        for index in descending {
            t.delete_row(index);
        }

        self.db.save()?;
        Ok(ExecResult::Message(format!(
            "{} row(s) deleted",
            row_indexes.len()
        )))
    }
}

/// Order two optional values the way ORDER BY expects: a missing or
/// NULL value sorts as if it were an empty string; same-variant values
/// compare natively; mismatched non-null types fall back to comparing
/// their rendered text so sorting can never fail outright.
fn compare_for_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Integer(x)), Some(Value::Integer(y))) => x.cmp(y),
        (Some(Value::Text(x)), Some(Value::Text(y))) => x.cmp(y),
        (Some(Value::Boolean(x)), Some(Value::Boolean(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.render().cmp(&y.render()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn exec() -> Executor {
        Executor::new(Database::in_memory())
    }

    #[test]
    fn test_create_insert_select_roundtrip() {
        let mut ex = exec();
        assert!(matches!(
            ex.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(20));"),
            ExecResult::Message(_)
        ));
        assert!(matches!(
            ex.execute("INSERT INTO users VALUES (1, 'Alice');"),
            ExecResult::Message(_)
        ));
        match ex.execute("SELECT * FROM users;") {
            ExecResult::Rows { columns, rows, count } => {
                assert_eq!(columns, vec!["id".to_string(), "name".to_string()]);
                assert_eq!(count, 1);
                assert_eq!(rows[0].get("name"), Some(&Value::Text("Alice".into())));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_select_with_alias_and_where() {
        let mut ex = exec();
        ex.execute("CREATE TABLE t (id INT PRIMARY KEY, age INT);");
        ex.execute("INSERT INTO t VALUES (1, 30);");
        ex.execute("INSERT INTO t VALUES (2, 40);");

        match ex.execute("SELECT age AS years FROM t WHERE age >= 35;") {
            ExecResult::Rows { columns, rows, count } => {
                assert_eq!(columns, vec!["years".to_string()]);
                assert_eq!(count, 1);
                assert_eq!(rows[0].get("years"), Some(&Value::Integer(40)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_count_star() {
        let mut ex = exec();
        ex.execute("CREATE TABLE t (id INT);");
        ex.execute("INSERT INTO t VALUES (1);");
        ex.execute("INSERT INTO t VALUES (2);");

        match ex.execute("SELECT COUNT(*) FROM t;") {
            ExecResult::Rows { columns, rows, count } => {
                assert_eq!(columns, vec!["count".to_string()]);
                assert_eq!(count, 1);
                assert_eq!(rows[0].get("count"), Some(&Value::Integer(2)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_update_and_delete_counts() {
        let mut ex = exec();
        ex.execute("CREATE TABLE t (id INT PRIMARY KEY, active BOOLEAN);");
        ex.execute("INSERT INTO t VALUES (1, TRUE);");
        ex.execute("INSERT INTO t VALUES (2, TRUE);");

        match ex.execute("UPDATE t SET active = FALSE WHERE id = 1;") {
            ExecResult::Message(msg) => assert_eq!(msg, "1 row(s) updated"),
            other => panic!("unexpected result: {:?}", other),
        }

        match ex.execute("DELETE FROM t WHERE active = TRUE;") {
            ExecResult::Message(msg) => assert_eq!(msg, "1 row(s) deleted"),
            other => panic!("unexpected result: {:?}", other),
        }

        match ex.execute("SELECT * FROM t;") {
            ExecResult::Rows { count, .. } => assert_eq!(count, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_join() {
        let mut ex = exec();
        ex.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(20));");
        ex.execute("CREATE TABLE orders (id INT PRIMARY KEY, user_id INT);");
        ex.execute("INSERT INTO users VALUES (1, 'Alice');");
        ex.execute("INSERT INTO orders VALUES (100, 1);");

        match ex.execute("SELECT * FROM users INNER JOIN orders ON id = user_id;") {
            ExecResult::Rows { rows, count, .. } => {
                assert_eq!(count, 1);
                assert_eq!(rows[0].get("orders.id"), Some(&Value::Integer(100)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_table_not_found_is_error_not_panic() {
        let mut ex = exec();
        match ex.execute("SELECT * FROM ghost;") {
            ExecResult::Error(_) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_order_by_null_sorts_first() {
        let mut ex = exec();
        ex.execute("CREATE TABLE t (id INT PRIMARY KEY, label VARCHAR(10));");
        ex.execute("INSERT INTO t (id) VALUES (1);");
        ex.execute("INSERT INTO t VALUES (2, 'a');");

        match ex.execute("SELECT id FROM t ORDER BY label ASC;") {
            ExecResult::Rows { rows, .. } => {
                assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
                assert_eq!(rows[1].get("id"), Some(&Value::Integer(2)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
