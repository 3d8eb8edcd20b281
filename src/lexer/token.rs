//! Token definitions for the SQL lexer.

use crate::error::Span;
use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if *k == kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// A numeric literal, integer or floating-point depending on whether
/// the source text contained a `.`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Integer(i64),
    Float(f64),
}

/// The kind of token. A closed set: KEYWORD, IDENTIFIER, STRING,
/// NUMBER, BOOLEAN, OPERATOR.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    String(String),
    Number(NumberLiteral),
    Boolean(bool),

    // Operators / punctuation
    Eq,        // =
    NotEq,     // !=
    Lt,        // <
    LtEq,      // <=
    Gt,        // >
    GtEq,      // >=
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    Semicolon, // ;
    Star,      // *

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword {}", kw),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::String(s) => write!(f, "string '{}'", s),
            TokenKind::Number(NumberLiteral::Integer(n)) => write!(f, "integer {}", n),
            TokenKind::Number(NumberLiteral::Float(n)) => write!(f, "float {}", n),
            TokenKind::Boolean(b) => write!(f, "{}", b),
            TokenKind::Eq => write!(f, "="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::Comma => write!(f, ","),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// SQL keywords recognized by the lexer, a closed set for this
/// dialect. Matched case-insensitively; the token's text is upper-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Table,
    Drop,
    Primary,
    Key,
    Unique,
    Not,
    Null,
    Int,
    Varchar,
    Boolean,
    Order,
    By,
    Limit,
    Asc,
    Desc,
    And,
    Or,
    Inner,
    Join,
    On,
    True,
    False,
    If,
    Exists,
    As,
}

impl Keyword {
    /// Parse a bareword (already matched case-insensitively by the
    /// caller) into a keyword, if it is one.
    pub fn parse(word: &str) -> Option<Keyword> {
        Some(match word.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "DROP" => Keyword::Drop,
            "PRIMARY" => Keyword::Primary,
            "KEY" => Keyword::Key,
            "UNIQUE" => Keyword::Unique,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "INT" => Keyword::Int,
            "VARCHAR" => Keyword::Varchar,
            "BOOLEAN" => Keyword::Boolean,
            "ORDER" => Keyword::Order,
            "BY" => Keyword::By,
            "LIMIT" => Keyword::Limit,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "INNER" => Keyword::Inner,
            "JOIN" => Keyword::Join,
            "ON" => Keyword::On,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            "IF" => Keyword::If,
            "EXISTS" => Keyword::Exists,
            "AS" => Keyword::As,
            _ => return None,
        })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Drop => "DROP",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::Unique => "UNIQUE",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::Int => "INT",
            Keyword::Varchar => "VARCHAR",
            Keyword::Boolean => "BOOLEAN",
            Keyword::Order => "ORDER",
            Keyword::By => "BY",
            Keyword::Limit => "LIMIT",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Inner => "INNER",
            Keyword::Join => "JOIN",
            Keyword::On => "ON",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::If => "IF",
            Keyword::Exists => "EXISTS",
            Keyword::As => "AS",
        };
        write!(f, "{}", text)
    }
}
