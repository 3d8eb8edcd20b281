//! SQL Lexer/Tokenizer.
//!
//! Converts a SQL source string into a stream of tokens for this
//! restricted dialect: whitespace-separated keywords, identifiers,
//! string/number/boolean literals, and a small fixed operator set.

mod token;

pub use token::{Keyword, NumberLiteral, Token, TokenKind};

use crate::error::{Result, SimpleDbError, Span};

/// SQL Lexer that tokenizes input into a stream of tokens.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Tokenize the entire input, stopping before the implicit EOF token.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.pos;

        if self.is_at_end() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        let c = self.advance();

        match c {
            '(' => Ok(self.make_token(TokenKind::LParen)),
            ')' => Ok(self.make_token(TokenKind::RParen)),
            ',' => Ok(self.make_token(TokenKind::Comma)),
            ';' => Ok(self.make_token(TokenKind::Semicolon)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            '=' => Ok(self.make_token(TokenKind::Eq)),
            '!' => {
                if self.matches('=') {
                    Ok(self.make_token(TokenKind::NotEq))
                } else {
                    Err(SimpleDbError::parse_at(
                        format!("Unexpected character '{}'", c),
                        Span::new(self.start, self.pos),
                    ))
                }
            }
            '<' => {
                if self.matches('=') {
                    Ok(self.make_token(TokenKind::LtEq))
                } else {
                    Ok(self.make_token(TokenKind::Lt))
                }
            }
            '>' => {
                if self.matches('=') {
                    Ok(self.make_token(TokenKind::GtEq))
                } else {
                    Ok(self.make_token(TokenKind::Gt))
                }
            }
            '\'' | '"' => self.scan_string(c),
            '0'..='9' => {
                self.pos = self.start;
                self.scan_number()
            }
            '-' if self.peek_char().is_some_and(|d| d.is_ascii_digit()) => {
                self.pos = self.start;
                self.scan_number()
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_identifier_or_keyword()
            }
            _ => Err(SimpleDbError::parse_at(
                format!("Unexpected character '{}'", c),
                Span::new(self.start, self.pos),
            )),
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<Token> {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(SimpleDbError::parse_at(
                    "Unterminated string literal",
                    Span::new(self.start, self.pos),
                ));
            }
            let c = self.advance();
            if c == quote {
                break;
            } else if c == '\\' {
                if self.is_at_end() {
                    return Err(SimpleDbError::parse_at(
                        "Unterminated string literal",
                        Span::new(self.start, self.pos),
                    ));
                }
                value.push(self.advance());
            } else {
                value.push(c);
            }
        }
        Ok(self.make_token(TokenKind::String(value)))
    }

    fn scan_number(&mut self) -> Result<Token> {
        if self.check('-') {
            self.advance();
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.check('.') {
            is_float = true;
            self.advance();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(|v| self.make_token(TokenKind::Number(NumberLiteral::Float(v))))
                .map_err(|_| {
                    SimpleDbError::parse_at(
                        format!("Invalid number '{}'", text),
                        Span::new(self.start, self.pos),
                    )
                })
        } else {
            text.parse::<i64>()
                .map(|v| self.make_token(TokenKind::Number(NumberLiteral::Integer(v))))
                .map_err(|_| {
                    SimpleDbError::parse_at(
                        format!("Invalid number '{}'", text),
                        Span::new(self.start, self.pos),
                    )
                })
        }
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<Token> {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.input[self.start..self.pos];

        if let Some(keyword) = Keyword::parse(text) {
            match keyword {
                Keyword::True => Ok(self.make_token(TokenKind::Boolean(true))),
                Keyword::False => Ok(self.make_token(TokenKind::Boolean(false))),
                _ => Ok(self.make_token(TokenKind::Keyword(keyword))),
            }
        } else {
            Ok(self.make_token(TokenKind::Identifier(text.to_string())))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> char {
        let c = self.input[self.pos..].chars().next().unwrap();
        self.pos += c.len_utf8();
        c
    }

    fn check(&self, expected: char) -> bool {
        self.peek_char() == Some(expected)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos), &self.input[self.start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        let tokens = kinds("SELECT * FROM users");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Star,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier("users".to_string()),
            ]
        );
    }

    #[test]
    fn test_dotted_identifier_is_one_token() {
        let tokens = kinds("users.id");
        assert_eq!(tokens, vec![TokenKind::Identifier("users.id".to_string())]);
    }

    #[test]
    fn test_two_char_operators_take_precedence() {
        let tokens = kinds("!= <= >=");
        assert_eq!(
            tokens,
            vec![TokenKind::NotEq, TokenKind::LtEq, TokenKind::GtEq]
        );
    }

    #[test]
    fn test_negative_number_literal() {
        let tokens = kinds("-5 -3.5");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Number(NumberLiteral::Integer(-5)),
                TokenKind::Number(NumberLiteral::Float(-3.5)),
            ]
        );
    }

    #[test]
    fn test_no_binary_minus() {
        // '-' not immediately followed by a digit is not a valid token.
        assert!(Lexer::tokenize("5 - 3").is_err());
    }

    #[test]
    fn test_keyword_case_folding() {
        let tokens = kinds("select FROM WhErE");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
            ]
        );
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(
            kinds("TRUE false"),
            vec![TokenKind::Boolean(true), TokenKind::Boolean(false)]
        );
    }

    #[test]
    fn test_string_with_escape() {
        let tokens = kinds(r#"'it\'s here'"#);
        assert_eq!(
            tokens,
            vec![TokenKind::String("it's here".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(Lexer::tokenize("'abc").is_err());
    }

    #[test]
    fn test_unexpected_character_fails() {
        assert!(Lexer::tokenize("SELECT % FROM t").is_err());
    }
}
