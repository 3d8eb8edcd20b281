//! A single table: schema, rows, and the secondary indexes that back
//! its PRIMARY KEY and UNIQUE columns.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::ast::{column_suffix, CompareOp, Logic, Where, WhereItem};
use crate::error::{Result, SimpleDbError};
use crate::types::{ColumnDef, Value};

/// A single stored row, keyed by column name.
pub type Row = HashMap<String, Value>;

/// A table's data and the indexes needed to enforce its constraints.
///
/// Deleted rows become tombstones (`None`) rather than being removed,
/// so that row positions stay stable for the lifetime of a statement.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    rows: Vec<Option<Row>>,
    indexes: HashMap<String, HashMap<Value, usize>>,
    primary_key: Option<String>,
    unique_columns: HashSet<String>,
    not_null_columns: HashSet<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        let mut indexes = HashMap::new();
        let mut primary_key = None;
        let mut unique_columns = HashSet::new();
        let mut not_null_columns = HashSet::new();

        for col in &columns {
            if col.is_primary_key() {
                primary_key = Some(col.name.clone());
                indexes.entry(col.name.clone()).or_insert_with(HashMap::new);
                not_null_columns.insert(col.name.clone());
            }
            if col.is_unique() {
                unique_columns.insert(col.name.clone());
                indexes.entry(col.name.clone()).or_insert_with(HashMap::new);
            }
            if col.is_not_null() {
                not_null_columns.insert(col.name.clone());
            }
        }

        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            indexes,
            primary_key,
            unique_columns,
            not_null_columns,
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every live (non-tombstoned) row, in position order.
    pub fn live_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.as_ref().map(|r| (i, r)))
    }

    pub fn row_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    pub fn row_at(&self, index: usize) -> Option<&Row> {
        self.rows.get(index).and_then(|r| r.as_ref())
    }

    fn validate_row(&self, row: &Row, row_index: Option<usize>) -> Result<()> {
        for col_name in row.keys() {
            if self.get_column(col_name).is_none() {
                return Err(SimpleDbError::ColumnNotFound(format!(
                    "Column '{}' does not exist in table '{}'",
                    col_name, self.name
                )));
            }
        }

        for col_name in &self.not_null_columns {
            if row.get(col_name).map_or(true, Value::is_null) {
                return Err(SimpleDbError::NotNullViolation(format!(
                    "Column '{}' cannot be NULL",
                    col_name
                )));
            }
        }

        if let Some(pk) = &self.primary_key {
            if let Some(value) = row.get(pk).filter(|v| !v.is_null()) {
                if let Some(&existing) = self.indexes[pk].get(value) {
                    if row_index != Some(existing) {
                        return Err(SimpleDbError::PrimaryKeyViolation(format!(
                            "Primary key '{}' value {} already exists",
                            pk, value
                        )));
                    }
                }
            }
        }

        for col_name in &self.unique_columns {
            if let Some(value) = row.get(col_name).filter(|v| !v.is_null()) {
                if let Some(&existing) = self.indexes[col_name].get(value) {
                    if row_index != Some(existing) {
                        return Err(SimpleDbError::UniqueConstraintViolation(format!(
                            "UNIQUE constraint violated for column '{}' value {}",
                            col_name, value
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Insert a new row built from `values` (missing columns default to
    /// NULL), validating types and constraints. Returns the row's position.
    pub fn insert_row(&mut self, values: &HashMap<String, Value>) -> Result<usize> {
        for col_name in values.keys() {
            if self.get_column(col_name).is_none() {
                return Err(SimpleDbError::ColumnNotFound(format!(
                    "Column '{}' does not exist in table '{}'",
                    col_name, self.name
                )));
            }
        }

        let mut row = Row::new();
        for col in &self.columns {
            let value = values.get(&col.name).cloned().unwrap_or(Value::Null);
            row.insert(col.name.clone(), col.coerce(value)?);
        }

        self.validate_row(&row, None)?;

        let row_index = self.rows.len();
        for (col_name, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(col_name).filter(|v| !v.is_null()) {
                index.insert(value.clone(), row_index);
            }
        }
        self.rows.push(Some(row));

        Ok(row_index)
    }

    /// Apply `updates` to the row at `row_index`. A no-op if the index is
    /// out of range or already tombstoned.
    pub fn update_row(&mut self, row_index: usize, updates: &HashMap<String, Value>) -> Result<()> {
        let Some(old_row) = self.rows.get(row_index).and_then(|r| r.clone()) else {
            return Ok(());
        };

        let mut new_row = old_row.clone();
        for (col_name, value) in updates {
            let col = self
                .get_column(col_name)
                .ok_or_else(|| SimpleDbError::column_not_found(col_name))?;
            new_row.insert(col_name.clone(), col.coerce(value.clone())?);
        }

        self.validate_row(&new_row, Some(row_index))?;

        for (col_name, index) in self.indexes.iter_mut() {
            if let Some(value) = old_row.get(col_name).filter(|v| !v.is_null()) {
                index.remove(value);
            }
        }
        for (col_name, index) in self.indexes.iter_mut() {
            if let Some(value) = new_row.get(col_name).filter(|v| !v.is_null()) {
                index.insert(value.clone(), row_index);
            }
        }

        self.rows[row_index] = Some(new_row);
        Ok(())
    }

    /// Tombstone the row at `row_index`. A no-op if already tombstoned.
    pub fn delete_row(&mut self, row_index: usize) {
        let Some(slot) = self.rows.get_mut(row_index) else {
            return;
        };
        let Some(row) = slot.take() else {
            return;
        };
        for (col_name, index) in self.indexes.iter_mut() {
            if let Some(value) = row.get(col_name).filter(|v| !v.is_null()) {
                index.remove(value);
            }
        }
    }

    /// Row positions matching `conditions`, or every live row if `None`.
    pub fn find_rows(&self, conditions: Option<&Where>) -> Result<Vec<usize>> {
        match conditions {
            None => Ok(self.live_rows().map(|(i, _)| i).collect()),
            Some(conditions) => {
                let mut matches = Vec::new();
                for (i, row) in self.live_rows() {
                    if self.evaluate_conditions(row, conditions)? {
                        matches.push(i);
                    }
                }
                Ok(matches)
            }
        }
    }

    /// Evaluate a flat WHERE clause against one row. Connectors fold
    /// strictly left-to-right with no operator precedence (spec §4.5):
    /// each atom combines with the pending connector, then its trailing
    /// connector becomes the new pending one.
    fn evaluate_conditions(&self, row: &Row, conditions: &Where) -> Result<bool> {
        let mut result = true;
        let mut pending = Logic::And;

        for item in conditions {
            match item {
                WhereItem::Connector(logic) => pending = *logic,
                WhereItem::Condition(cond) => {
                    let column = column_suffix(&cond.column);
                    let row_value = row
                        .get(column)
                        .ok_or_else(|| SimpleDbError::column_not_found(column))?;
                    let atom = compare_values(row_value, cond.operator, &cond.value)?;
                    result = match pending {
                        Logic::And => result && atom,
                        Logic::Or => result || atom,
                    };
                }
            }
        }

        Ok(result)
    }

    /// Rebuild a table from its serialized parts, re-running every row
    /// through [`Table::insert_row`] so constraints and indexes are
    /// reconstructed identically to a live session.
    pub fn from_parts(name: String, columns: Vec<ColumnDef>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Table::new(name, columns);
        for row in rows {
            table.insert_row(&row)?;
        }
        Ok(table)
    }
}

/// Compare two values per spec §4.5: `=`/`!=` work on any pair; ordering
/// operators require both sides present and of the same comparable type,
/// and treat a NULL operand as never satisfying the comparison.
fn compare_values(left: &Value, op: CompareOp, right: &Value) -> Result<bool> {
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::NotEq => Ok(left != right),
        _ => {
            if left.is_null() || right.is_null() {
                return Ok(false);
            }
            let ordering = match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
                (Value::Text(a), Value::Text(b)) => a.cmp(b),
                _ => {
                    return Err(SimpleDbError::DataType(format!(
                        "Cannot compare {} and {}",
                        left.type_name(),
                        right.type_name()
                    )))
                }
            };
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::LtEq => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::GtEq => ordering != Ordering::Less,
                CompareOp::Eq | CompareOp::NotEq => unreachable!(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Condition;
    use crate::types::{Constraint, DataType};

    fn users_table() -> Table {
        let columns = vec![
            ColumnDef::new("id", DataType::Int).with_constraints(vec![Constraint::PrimaryKey]),
            ColumnDef::new("name", DataType::Varchar)
                .with_length(20)
                .with_constraints(vec![Constraint::NotNull]),
            ColumnDef::new("email", DataType::Varchar)
                .with_length(50)
                .with_constraints(vec![Constraint::Unique]),
        ];
        Table::new("users", columns)
    }

    fn row(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_insert_and_find_all() {
        let mut table = users_table();
        table
            .insert_row(&row(&[
                ("id", Value::Integer(1)),
                ("name", Value::Text("Alice".into())),
                ("email", Value::Text("a@x.com".into())),
            ]))
            .unwrap();
        assert_eq!(table.find_rows(None).unwrap(), vec![0]);
    }

    #[test]
    fn test_primary_key_violation() {
        let mut table = users_table();
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A".into()))]))
            .unwrap();
        let err = table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("B".into()))]))
            .unwrap_err();
        assert!(matches!(err, SimpleDbError::PrimaryKeyViolation(_)));
    }

    #[test]
    fn test_insert_rejects_unknown_column() {
        let mut table = users_table();
        let err = table
            .insert_row(&row(&[("id", Value::Integer(1)), ("bogus", Value::Integer(1))]))
            .unwrap_err();
        assert!(matches!(err, SimpleDbError::ColumnNotFound(_)));
    }

    #[test]
    fn test_not_null_violation() {
        let mut table = users_table();
        let err = table.insert_row(&row(&[("id", Value::Integer(1))])).unwrap_err();
        assert!(matches!(err, SimpleDbError::NotNullViolation(_)));
    }

    #[test]
    fn test_unique_constraint_violation() {
        let mut table = users_table();
        table
            .insert_row(&row(&[
                ("id", Value::Integer(1)),
                ("name", Value::Text("A".into())),
                ("email", Value::Text("dup@x.com".into())),
            ]))
            .unwrap();
        let err = table
            .insert_row(&row(&[
                ("id", Value::Integer(2)),
                ("name", Value::Text("B".into())),
                ("email", Value::Text("dup@x.com".into())),
            ]))
            .unwrap_err();
        assert!(matches!(err, SimpleDbError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_delete_then_reinsert_same_key() {
        let mut table = users_table();
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A".into()))]))
            .unwrap();
        table.delete_row(0);
        assert_eq!(table.find_rows(None).unwrap(), Vec::<usize>::new());
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A2".into()))]))
            .unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_update_row_revalidates_constraints() {
        let mut table = users_table();
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A".into()))]))
            .unwrap();
        table
            .insert_row(&row(&[("id", Value::Integer(2)), ("name", Value::Text("B".into()))]))
            .unwrap();

        let mut updates = HashMap::new();
        updates.insert("id".to_string(), Value::Integer(2));
        let err = table.update_row(0, &updates).unwrap_err();
        assert!(matches!(err, SimpleDbError::PrimaryKeyViolation(_)));
    }

    #[test]
    fn test_where_left_to_right_no_precedence() {
        let mut table = users_table();
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A".into()))]))
            .unwrap();

        // id = 1 OR id = 99 AND name = 'nope' -> ((true OR false) AND false) = false
        let conditions = vec![
            WhereItem::Condition(Condition {
                column: "id".into(),
                operator: CompareOp::Eq,
                value: Value::Integer(1),
            }),
            WhereItem::Connector(Logic::Or),
            WhereItem::Condition(Condition {
                column: "id".into(),
                operator: CompareOp::Eq,
                value: Value::Integer(99),
            }),
            WhereItem::Connector(Logic::And),
            WhereItem::Condition(Condition {
                column: "name".into(),
                operator: CompareOp::Eq,
                value: Value::Text("nope".into()),
            }),
        ];
        assert_eq!(table.find_rows(Some(&conditions)).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_mixed_type_ordering_is_a_data_type_error() {
        let mut table = users_table();
        table
            .insert_row(&row(&[("id", Value::Integer(1)), ("name", Value::Text("A".into()))]))
            .unwrap();
        let conditions = vec![WhereItem::Condition(Condition {
            column: "id".into(),
            operator: CompareOp::Gt,
            value: Value::Text("x".into()),
        })];
        assert!(matches!(
            table.find_rows(Some(&conditions)),
            Err(SimpleDbError::DataType(_))
        ));
    }
}
