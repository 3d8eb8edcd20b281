//! SQL Parser.
//!
//! Recursive-descent parser that turns a token stream from [`crate::lexer`]
//! into a [`Command`] tree, per the grammar in spec §4.2.

use crate::ast::{
    CompareOp, Command, Condition, Direction, JoinSpec, Logic, OrderBy, Projection, Where,
    WhereItem,
};
use crate::error::{Result, SimpleDbError};
use crate::lexer::{Keyword, Lexer, NumberLiteral, Token, TokenKind};
use crate::types::{ColumnDef, Constraint, DataType, Value};

/// Parse a single SQL statement into a [`Command`].
pub fn parse(sql: &str) -> Result<Command> {
    Parser::new(sql)?.parse_command()
}

/// Recursive-descent parser over a pre-tokenized SQL statement.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(sql: &str) -> Result<Self> {
        let mut tokens = Lexer::tokenize(sql)?;
        if tokens.is_empty() {
            return Err(SimpleDbError::parse("Empty SQL statement"));
        }
        if matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Semicolon)) {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Err(SimpleDbError::parse("Empty SQL statement"));
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn parse_command(&mut self) -> Result<Command> {
        let first = self.current()?;
        let keyword = match &first.kind {
            TokenKind::Keyword(kw) => *kw,
            other => {
                return Err(SimpleDbError::parse_at(
                    format!("Expected a keyword, found {}", other),
                    first.span,
                ))
            }
        };

        match keyword {
            Keyword::Create => self.parse_create_table(),
            Keyword::Drop => self.parse_drop_table(),
            Keyword::Insert => self.parse_insert(),
            Keyword::Select => self.parse_select(),
            Keyword::Update => self.parse_update(),
            Keyword::Delete => self.parse_delete(),
            other => Err(SimpleDbError::parse_at(
                format!("Unknown command '{}'", other),
                first.span,
            )),
        }
    }

    // --- CREATE TABLE ---------------------------------------------------

    fn parse_create_table(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let if_not_exists = if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };

        let table = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Command::CreateTable {
            table,
            columns,
            if_not_exists,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let type_token = self.current()?.clone();
        let data_type = match &type_token.kind {
            TokenKind::Keyword(Keyword::Int) => DataType::Int,
            TokenKind::Keyword(Keyword::Varchar) => DataType::Varchar,
            TokenKind::Keyword(Keyword::Boolean) => DataType::Boolean,
            other => {
                return Err(SimpleDbError::parse_at(
                    format!("Expected a column type, found {}", other),
                    type_token.span,
                ))
            }
        };
        self.advance();

        let mut column = ColumnDef::new(name, data_type);

        if data_type == DataType::Varchar && self.check(&TokenKind::LParen) {
            self.advance();
            let length = self.expect_integer_literal()?;
            self.expect(TokenKind::RParen)?;
            column = column.with_length(length.max(0) as usize);
        }

        let mut constraints = Vec::new();
        loop {
            if self.check_keyword(Keyword::Primary) {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                constraints.push(Constraint::PrimaryKey);
            } else if self.check_keyword(Keyword::Unique) {
                self.advance();
                constraints.push(Constraint::Unique);
            } else if self.check_keyword(Keyword::Not) {
                self.advance();
                self.expect_keyword(Keyword::Null)?;
                constraints.push(Constraint::NotNull);
            } else {
                break;
            }
        }
        column = column.with_constraints(constraints);

        Ok(column)
    }

    // --- DROP TABLE ------------------------------------------------------

    fn parse_drop_table(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Table)?;
        let table = self.expect_identifier()?;
        Ok(Command::DropTable { table })
    }

    // --- INSERT ----------------------------------------------------------

    fn parse_insert(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table = self.expect_identifier()?;

        let columns = if self.check(&TokenKind::LParen) {
            self.advance();
            let mut names = Vec::new();
            loop {
                names.push(self.expect_identifier()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            Some(names)
        } else {
            None
        };

        self.expect_keyword(Keyword::Values)?;
        self.expect(TokenKind::LParen)?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Command::Insert {
            table,
            columns,
            values,
        })
    }

    // --- SELECT ------------------------------------------------------------

    fn parse_select(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Select)?;

        let mut projection = Vec::new();
        loop {
            if self.check_keyword(Keyword::From) {
                break;
            }
            projection.push(self.parse_projection_item()?);

            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }

        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;

        let join = self.parse_optional_join()?;

        let where_clause = if self.check_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            let column = self.expect_identifier()?;
            let direction = if self.check_keyword(Keyword::Desc) {
                self.advance();
                Direction::Desc
            } else if self.check_keyword(Keyword::Asc) {
                self.advance();
                Direction::Asc
            } else {
                Direction::Asc
            };
            Some(OrderBy { column, direction })
        } else {
            None
        };

        let limit = if self.check_keyword(Keyword::Limit) {
            self.advance();
            let n = self.expect_integer_literal()?;
            if n < 0 {
                return Err(SimpleDbError::parse("LIMIT must be non-negative"));
            }
            Some(n as u64)
        } else {
            None
        };

        Ok(Command::Select {
            table,
            projection,
            join,
            where_clause,
            order_by,
            limit,
        })
    }

    fn parse_projection_item(&mut self) -> Result<Projection> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(Projection::Star);
        }

        if let TokenKind::Identifier(name) = &self.current()?.kind {
            if name.eq_ignore_ascii_case("count") {
                self.advance();
                self.expect(TokenKind::LParen)?;
                self.expect(TokenKind::Star)?;
                self.expect(TokenKind::RParen)?;
                let alias = if self.check_keyword(Keyword::As) {
                    self.advance();
                    self.expect_identifier()?
                } else {
                    "count".to_string()
                };
                return Ok(Projection::CountStar { alias });
            }

            let name = name.clone();
            self.advance();
            let alias = if self.check_keyword(Keyword::As) {
                self.advance();
                Some(self.expect_identifier()?)
            } else {
                None
            };
            return Ok(Projection::Column { name, alias });
        }

        let tok = self.current()?.clone();
        Err(SimpleDbError::parse_at(
            format!("Expected a projection column, found {}", tok.kind),
            tok.span,
        ))
    }

    fn parse_optional_join(&mut self) -> Result<Option<JoinSpec>> {
        let has_join = if self.check_keyword(Keyword::Inner) {
            self.advance();
            self.expect_keyword(Keyword::Join)?;
            true
        } else if self.check_keyword(Keyword::Join) {
            self.advance();
            true
        } else {
            false
        };

        if !has_join {
            return Ok(None);
        }

        let table = self.expect_identifier()?;
        self.expect_keyword(Keyword::On)?;
        let left_col = self.expect_identifier()?;
        self.expect(TokenKind::Eq)?;
        let right_col = self.expect_identifier()?;

        Ok(Some(JoinSpec {
            table,
            left_col,
            right_col,
        }))
    }

    fn parse_where(&mut self) -> Result<Where> {
        let mut items = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            let operator = self.parse_compare_op()?;
            let value = self.parse_literal()?;
            items.push(WhereItem::Condition(Condition {
                column,
                operator,
                value,
            }));

            if self.check_keyword(Keyword::And) {
                self.advance();
                items.push(WhereItem::Connector(Logic::And));
            } else if self.check_keyword(Keyword::Or) {
                self.advance();
                items.push(WhereItem::Connector(Logic::Or));
            } else {
                break;
            }
        }
        Ok(items)
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp> {
        let tok = self.current()?.clone();
        let op = match tok.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            other => {
                return Err(SimpleDbError::parse_at(
                    format!("Expected a comparison operator, found {}", other),
                    tok.span,
                ))
            }
        };
        self.advance();
        Ok(op)
    }

    // --- UPDATE ------------------------------------------------------------

    fn parse_update(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Update)?;
        let table = self.expect_identifier()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_literal()?;
            assignments.push((column, value));

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let where_clause = if self.check_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Command::Update {
            table,
            assignments,
            where_clause,
        })
    }

    // --- DELETE ------------------------------------------------------------

    fn parse_delete(&mut self) -> Result<Command> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;

        let where_clause = if self.check_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Command::Delete {
            table,
            where_clause,
        })
    }

    // --- literals ------------------------------------------------------------

    fn parse_literal(&mut self) -> Result<Value> {
        let tok = self.current()?.clone();
        let value = match tok.kind {
            TokenKind::String(s) => Value::Text(s),
            TokenKind::Number(NumberLiteral::Integer(n)) => Value::Integer(n),
            // The data model has no floating-point value; a literal written
            // with a decimal point truncates toward zero.
            TokenKind::Number(NumberLiteral::Float(f)) => Value::Integer(f as i64),
            TokenKind::Boolean(b) => Value::Boolean(b),
            TokenKind::Keyword(Keyword::Null) => Value::Null,
            other => {
                return Err(SimpleDbError::parse_at(
                    format!("Expected a value, found {}", other),
                    tok.span,
                ))
            }
        };
        self.advance();
        Ok(value)
    }

    fn expect_integer_literal(&mut self) -> Result<i64> {
        let tok = self.current()?.clone();
        match tok.kind {
            TokenKind::Number(NumberLiteral::Integer(n)) => {
                self.advance();
                Ok(n)
            }
            other => Err(SimpleDbError::parse_at(
                format!("Expected an integer literal, found {}", other),
                tok.span,
            )),
        }
    }

    // --- token-stream plumbing ------------------------------------------------

    fn current(&self) -> Result<&Token> {
        self.tokens
            .get(self.pos)
            .ok_or_else(|| SimpleDbError::parse("Unexpected end of statement"))
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn check(&self, expected: &TokenKind) -> bool {
        self.tokens.get(self.pos).map(|t| &t.kind) == Some(expected)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.is_keyword(kw))
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        let tok = self.current()?.clone();
        if tok.kind == expected {
            self.advance();
            Ok(tok)
        } else {
            Err(SimpleDbError::parse_at(
                format!("Expected {}, found {}", expected, tok.kind),
                tok.span,
            ))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Token> {
        let tok = self.current()?.clone();
        if tok.is_keyword(kw) {
            self.advance();
            Ok(tok)
        } else {
            Err(SimpleDbError::parse_at(
                format!("Expected keyword {}, found {}", kw, tok.kind),
                tok.span,
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let tok = self.current()?.clone();
        match tok.kind {
            TokenKind::Identifier(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(SimpleDbError::parse_at(
                format!("Expected an identifier, found {}", other),
                tok.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Command, Direction, Projection};

    #[test]
    fn test_parse_create_table() {
        let cmd = parse("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50));").unwrap();
        match cmd {
            Command::CreateTable {
                table,
                columns,
                if_not_exists,
            } => {
                assert_eq!(table, "users");
                assert!(!if_not_exists);
                assert_eq!(columns.len(), 2);
                assert!(columns[0].is_primary_key());
                assert_eq!(columns[1].varchar_length(), 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_table_if_not_exists() {
        let cmd = parse("CREATE TABLE IF NOT EXISTS x (id INT);").unwrap();
        match cmd {
            Command::CreateTable { if_not_exists, .. } => assert!(if_not_exists),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_insert_with_columns() {
        let cmd = parse("INSERT INTO users (id, name) VALUES (1, 'Alice');").unwrap();
        match cmd {
            Command::Insert {
                table,
                columns,
                values,
            } => {
                assert_eq!(table, "users");
                assert_eq!(columns, Some(vec!["id".to_string(), "name".to_string()]));
                assert_eq!(values, vec![Value::Integer(1), Value::Text("Alice".into())]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_select_star_with_where_order_limit() {
        let cmd = parse("SELECT id FROM t WHERE age >= 25 ORDER BY age DESC LIMIT 2;").unwrap();
        match cmd {
            Command::Select {
                table,
                projection,
                order_by,
                limit,
                ..
            } => {
                assert_eq!(table, "t");
                assert_eq!(
                    projection,
                    vec![Projection::Column {
                        name: "id".to_string(),
                        alias: None
                    }]
                );
                assert_eq!(
                    order_by,
                    Some(OrderBy {
                        column: "age".to_string(),
                        direction: Direction::Desc
                    })
                );
                assert_eq!(limit, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_count_star_default_alias() {
        let cmd = parse("SELECT COUNT(*) FROM t;").unwrap();
        match cmd {
            Command::Select { projection, .. } => {
                assert_eq!(
                    projection,
                    vec![Projection::CountStar {
                        alias: "count".to_string()
                    }]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_join() {
        let cmd =
            parse("SELECT * FROM users INNER JOIN orders ON id = user_id;").unwrap();
        match cmd {
            Command::Select { join: Some(j), .. } => {
                assert_eq!(j.table, "orders");
                assert_eq!(j.left_col, "id");
                assert_eq!(j.right_col, "user_id");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_where_left_to_right_connectors() {
        let cmd = parse("SELECT * FROM t WHERE a = 1 OR b = 2 AND c = 3;").unwrap();
        match cmd {
            Command::Select {
                where_clause: Some(items),
                ..
            } => {
                assert_eq!(items.len(), 5);
                assert!(matches!(items[1], WhereItem::Connector(Logic::Or)));
                assert!(matches!(items[3], WhereItem::Connector(Logic::And)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(parse("").is_err());
        assert!(parse(";").is_err());
    }

    #[test]
    fn test_update_and_delete() {
        let cmd = parse("UPDATE t SET a = 1, b = 'x' WHERE id = 5;").unwrap();
        assert!(matches!(cmd, Command::Update { .. }));

        let cmd = parse("DELETE FROM t WHERE id = 5;").unwrap();
        assert!(matches!(cmd, Command::Delete { .. }));
    }
}
