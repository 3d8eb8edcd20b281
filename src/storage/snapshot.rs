//! Single-file persistence: a self-describing JSON-shaped snapshot of
//! every table, read and written with a small hand-rolled reader/writer
//! rather than a general-purpose serialization crate, in keeping with
//! this crate's preference for hand-written recursive-descent scanners
//! over pulled-in grammars (see the SQL lexer).

use std::fs;
use std::path::Path;

use crate::error::{Result, SimpleDbError};
use crate::types::{ColumnDef, Constraint, DataType, Value};

use super::table::{Row, Table};

/// A minimal JSON value tree, just expressive enough for the snapshot
/// format: `{"tables": {name: {name, columns, rows}}}`.
#[derive(Debug, Clone, PartialEq)]
enum Json {
    Null,
    Bool(bool),
    Number(i64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    fn as_object(&self) -> Result<&[(String, Json)]> {
        match self {
            Json::Object(entries) => Ok(entries),
            other => Err(SimpleDbError::parse(format!(
                "Expected a JSON object, found {:?}",
                other
            ))),
        }
    }

    fn as_array(&self) -> Result<&[Json]> {
        match self {
            Json::Array(items) => Ok(items),
            other => Err(SimpleDbError::parse(format!(
                "Expected a JSON array, found {:?}",
                other
            ))),
        }
    }

    fn as_str(&self) -> Result<&str> {
        match self {
            Json::String(s) => Ok(s),
            other => Err(SimpleDbError::parse(format!(
                "Expected a JSON string, found {:?}",
                other
            ))),
        }
    }

    fn as_i64(&self) -> Result<i64> {
        match self {
            Json::Number(n) => Ok(*n),
            other => Err(SimpleDbError::parse(format!(
                "Expected a JSON number, found {:?}",
                other
            ))),
        }
    }

    fn get<'a>(&'a self, key: &str) -> Option<&'a Json> {
        self.as_object()
            .ok()
            .and_then(|obj| obj.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }
}

/// Write `tables` to `path` as the JSON-shaped snapshot. The write goes
/// to a sibling temp file first, then is renamed into place, so a crash
/// mid-write cannot leave a half-written snapshot behind.
pub fn save(path: &Path, tables: &[Table]) -> Result<()> {
    let doc = Json::Object(vec![(
        "tables".to_string(),
        Json::Object(
            tables
                .iter()
                .map(|t| (t.name.clone(), table_to_json(t)))
                .collect(),
        ),
    )]);

    let text = render(&doc, 0);

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, text)
        .map_err(|e| SimpleDbError::parse(format!("Failed to write snapshot: {}", e)))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| SimpleDbError::parse(format!("Failed to finalize snapshot: {}", e)))?;
    Ok(())
}

/// Load every table out of the snapshot file at `path`.
pub fn load(path: &Path) -> Result<Vec<Table>> {
    let text = fs::read_to_string(path)
        .map_err(|e| SimpleDbError::parse(format!("Failed to read snapshot: {}", e)))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc = parse_json(&text)?;
    let tables_obj = doc
        .get("tables")
        .ok_or_else(|| SimpleDbError::parse("Snapshot is missing a 'tables' key"))?
        .as_object()?;

    let mut tables = Vec::with_capacity(tables_obj.len());
    for (_, table_json) in tables_obj {
        tables.push(table_from_json(table_json)?);
    }
    Ok(tables)
}

fn table_to_json(table: &Table) -> Json {
    let columns = Json::Array(table.columns.iter().map(column_to_json).collect());
    let rows = Json::Array(table.live_rows().map(|(_, row)| row_to_json(row)).collect());
    Json::Object(vec![
        ("name".to_string(), Json::String(table.name.clone())),
        ("columns".to_string(), columns),
        ("rows".to_string(), rows),
    ])
}

fn table_from_json(json: &Json) -> Result<Table> {
    let name = json
        .get("name")
        .ok_or_else(|| SimpleDbError::parse("Table entry is missing 'name'"))?
        .as_str()?
        .to_string();

    let columns = json
        .get("columns")
        .ok_or_else(|| SimpleDbError::parse("Table entry is missing 'columns'"))?
        .as_array()?
        .iter()
        .map(column_from_json)
        .collect::<Result<Vec<_>>>()?;

    let rows = json
        .get("rows")
        .ok_or_else(|| SimpleDbError::parse("Table entry is missing 'rows'"))?
        .as_array()?
        .iter()
        .map(row_from_json)
        .collect::<Result<Vec<_>>>()?;

    Table::from_parts(name, columns, rows)
}

fn column_to_json(col: &ColumnDef) -> Json {
    let mut entries = vec![
        ("name".to_string(), Json::String(col.name.clone())),
        ("type".to_string(), Json::String(col.data_type.to_string())),
    ];
    if let Some(length) = col.length {
        entries.push(("length".to_string(), Json::Number(length as i64)));
    }
    entries.push((
        "constraints".to_string(),
        Json::Array(
            col.constraints
                .iter()
                .map(|c| Json::String(c.to_string()))
                .collect(),
        ),
    ));
    Json::Object(entries)
}

fn column_from_json(json: &Json) -> Result<ColumnDef> {
    let name = json
        .get("name")
        .ok_or_else(|| SimpleDbError::parse("Column entry is missing 'name'"))?
        .as_str()?
        .to_string();
    let type_name = json
        .get("type")
        .ok_or_else(|| SimpleDbError::parse("Column entry is missing 'type'"))?
        .as_str()?;
    let data_type = match type_name {
        "INT" => DataType::Int,
        "VARCHAR" => DataType::Varchar,
        "BOOLEAN" => DataType::Boolean,
        other => {
            return Err(SimpleDbError::parse(format!(
                "Unknown column type '{}' in snapshot",
                other
            )))
        }
    };

    let mut column = ColumnDef::new(name, data_type);
    if let Some(length) = json.get("length") {
        column = column.with_length(length.as_i64()?.max(0) as usize);
    }
    if let Some(constraints) = json.get("constraints") {
        let constraints = constraints
            .as_array()?
            .iter()
            .map(|c| match c.as_str()? {
                "PRIMARY KEY" => Ok(Constraint::PrimaryKey),
                "UNIQUE" => Ok(Constraint::Unique),
                "NOT NULL" => Ok(Constraint::NotNull),
                other => Err(SimpleDbError::parse(format!(
                    "Unknown constraint '{}' in snapshot",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        column = column.with_constraints(constraints);
    }
    Ok(column)
}

fn row_to_json(row: &Row) -> Json {
    Json::Object(
        row.iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

fn row_from_json(json: &Json) -> Result<Row> {
    json.as_object()?
        .iter()
        .map(|(k, v)| Ok((k.clone(), value_from_json(v)?)))
        .collect()
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Integer(n) => Json::Number(*n),
        Value::Text(s) => Json::String(s.clone()),
        Value::Boolean(b) => Json::Bool(*b),
    }
}

fn value_from_json(json: &Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Number(n) => Value::Integer(*n),
        Json::String(s) => Value::Text(s.clone()),
        Json::Bool(b) => Value::Boolean(*b),
        Json::Array(_) | Json::Object(_) => {
            return Err(SimpleDbError::parse("Unexpected compound value in snapshot"))
        }
    })
}

// --- rendering -----------------------------------------------------------

fn render(json: &Json, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let inner_pad = "  ".repeat(indent + 1);
    match json {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => render_string(s),
        Json::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let body = items
                .iter()
                .map(|item| format!("{}{}", inner_pad, render(item, indent + 1)))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("[\n{}\n{}]", body, pad)
        }
        Json::Object(entries) => {
            if entries.is_empty() {
                return "{}".to_string();
            }
            let body = entries
                .iter()
                .map(|(k, v)| {
                    format!("{}{}: {}", inner_pad, render_string(k), render(v, indent + 1))
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{{\n{}\n{}}}", body, pad)
        }
    }
}

fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// --- parsing ---------------------------------------------------------------

fn parse_json(text: &str) -> Result<Json> {
    let mut parser = JsonParser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != parser.chars.len() {
        return Err(SimpleDbError::parse("Trailing content after JSON value"));
    }
    Ok(value)
}

struct JsonParser {
    chars: Vec<char>,
    pos: usize,
}

impl JsonParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.advance() == Some(expected) {
            Ok(())
        } else {
            Err(SimpleDbError::parse(format!(
                "Expected '{}' in snapshot JSON",
                expected
            )))
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<()> {
        for expected in literal.chars() {
            if self.advance() != Some(expected) {
                return Err(SimpleDbError::parse(format!(
                    "Expected literal '{}' in snapshot JSON",
                    literal
                )));
            }
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Json> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => Ok(Json::String(self.parse_string()?)),
            Some('t') => {
                self.expect_literal("true")?;
                Ok(Json::Bool(true))
            }
            Some('f') => {
                self.expect_literal("false")?;
                Ok(Json::Bool(false))
            }
            Some('n') => {
                self.expect_literal("null")?;
                Ok(Json::Null)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            _ => Err(SimpleDbError::parse("Unexpected end of snapshot JSON")),
        }
    }

    fn parse_object(&mut self) -> Result<Json> {
        self.expect('{')?;
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.advance();
            return Ok(Json::Object(entries));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some('}') => break,
                _ => return Err(SimpleDbError::parse("Expected ',' or '}' in snapshot JSON")),
            }
        }
        Ok(Json::Object(entries))
    }

    fn parse_array(&mut self) -> Result<Json> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.advance();
            return Ok(Json::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some(']') => break,
                _ => return Err(SimpleDbError::parse("Expected ',' or ']' in snapshot JSON")),
            }
        }
        Ok(Json::Array(items))
    }

    fn parse_string(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(SimpleDbError::parse("Unterminated string in snapshot JSON")),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('/') => out.push('/'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    _ => return Err(SimpleDbError::parse("Invalid escape in snapshot JSON")),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Json> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>()
            .map(Json::Number)
            .map_err(|_| SimpleDbError::parse(format!("Invalid number '{}' in snapshot JSON", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Constraint, DataType};
    use std::collections::HashMap;

    #[test]
    fn test_roundtrip_through_json_text() {
        let columns = vec![
            ColumnDef::new("id", DataType::Int).with_constraints(vec![Constraint::PrimaryKey]),
            ColumnDef::new("name", DataType::Varchar).with_length(20),
        ];
        let mut table = Table::new("users", columns);
        let mut values = HashMap::new();
        values.insert("id".to_string(), Value::Integer(1));
        values.insert("name".to_string(), Value::Text("Alice".into()));
        table.insert_row(&values).unwrap();

        let json = table_to_json(&table);
        let text = render(&json, 0);
        let parsed = parse_json(&text).unwrap();
        let rebuilt = table_from_json(&parsed).unwrap();

        assert_eq!(rebuilt.name, "users");
        assert_eq!(rebuilt.row_count(), 1);
        let (_, row) = rebuilt.live_rows().next().unwrap();
        assert_eq!(row.get("name"), Some(&Value::Text("Alice".into())));
    }

    #[test]
    fn test_tombstoned_rows_are_compacted_out() {
        let columns = vec![ColumnDef::new("id", DataType::Int)];
        let mut table = Table::new("t", columns);
        let mut values = HashMap::new();
        values.insert("id".to_string(), Value::Integer(1));
        table.insert_row(&values).unwrap();
        table.delete_row(0);

        let json = table_to_json(&table);
        let rows = json.get("rows").unwrap().as_array().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert!(parse_json("{} extra").is_err());
    }
}
