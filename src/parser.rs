use std::mem;

use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{
        AccessorKey, BinOp, Expr, Token,
        operators::{HIGHEST_CHAIN_PRECEDENCE, LOWEST_PRECEDENCE},
    },
    lexer::{Grammar, LexError, Lexer, Position, Spanned},
    number,
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("expected {expected}, found {found} at {position}")]
    Unexpected {
        position: Position,
        expected: String,
        found: String,
    },
    #[error("{reason} at {position}")]
    Message { position: Position, reason: String },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Unexpected { position, .. } | ParseError::Message { position, .. } => {
                *position
            }
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Spanned,
    previous_end: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current,
            previous_end: 0,
        })
    }

    pub fn grammar(&self) -> Grammar {
        self.lexer.grammar()
    }

    /// The token that will be consumed next.
    pub fn peek(&self) -> &Token {
        &self.current.token
    }

    /// The next token with its source range.
    pub fn span(&self) -> &Spanned {
        &self.current
    }

    /// Character offset just past the last consumed token.
    pub fn consumed_until(&self) -> usize {
        self.previous_end
    }

    pub fn advance(&mut self) -> Result<(), ParseError> {
        self.previous_end = self.current.end.offset;
        self.current = self.lexer.next_spanned()?;
        Ok(())
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::Unexpected {
            position: self.current.start,
            expected: expected.into(),
            found: self.current.token.describe(),
        }
    }

    pub fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(expected.describe()));
        }
        self.advance()
    }

    pub fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    /// Parse primary expressions: literals, identifiers, calls, groups,
    /// array and object literals.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current.token {
            Token::Number(_) | Token::String(_) | Token::Boolean(_) | Token::Null => {
                let value = match mem::replace(&mut self.current.token, Token::Eof) {
                    Token::Number(n) => Value::Number(n),
                    Token::String(s) => Value::String(s),
                    Token::Boolean(b) => Value::Boolean(b),
                    _ => Value::Null,
                };
                self.advance()?;
                Ok(Expr::Literal(value))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_sequence(Token::RParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => {
                self.advance()?;
                Ok(Expr::Array(self.parse_sequence(Token::RBracket)?))
            }
            Token::LBrace => {
                self.advance()?;
                self.parse_object_literal()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Comma-separated expressions up to `close`. Empty, doubled or
    /// trailing separators are rejected.
    fn parse_sequence(&mut self, close: Token) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![];
        if self.check(&close) {
            self.advance()?;
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_object_key(&mut self) -> Result<String, ParseError> {
        let key = match &self.current.token {
            Token::Identifier(s) | Token::String(s) => s.clone(),
            Token::Number(n) => number::format_number(*n),
            _ => return Err(self.unexpected("object key")),
        };
        self.advance()?;
        Ok(key)
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        if !self.check(&Token::RBrace) {
            loop {
                let key = self.parse_object_key()?;
                self.expect(Token::Colon)?;
                let value = self.parse_expression()?;
                pairs.push((key, value));

                if self.check(&Token::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Expr::Object(pairs))
    }

    /// Parse accessor chains (`.name`, `[key]`) following a primary.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        let mut keys = vec![];

        loop {
            if self.check(&Token::Dot) {
                self.advance()?;
                let name = match &self.current.token {
                    Token::Identifier(n) => n.clone(),
                    _ => return Err(self.unexpected("property name")),
                };
                self.advance()?;
                keys.push(AccessorKey::Literal(name));
            } else if self.check(&Token::LBracket) {
                self.advance()?;
                let key = match self.parse_expression()? {
                    Expr::Literal(Value::String(s)) => AccessorKey::Literal(s),
                    computed => AccessorKey::Computed(computed),
                };
                self.expect(Token::RBracket)?;
                keys.push(key);
            } else {
                break;
            }
        }

        if keys.is_empty() {
            Ok(base)
        } else {
            Ok(Expr::Accessor {
                base: Box::new(base),
                keys,
            })
        }
    }

    /// `**` binds tighter than prefix operators on its left and accepts
    /// them on its right (`2 ** -1`), associating to the right.
    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if !self.check(&Token::StarStar) {
            return Ok(base);
        }
        self.advance()?;
        let exponent = self.parse_unary()?;
        Ok(Expr::Binary {
            head: Box::new(base),
            tail: vec![(BinOp::Power, exponent)],
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let mut ops = vec![];
        while let Some(op) = self.current.token.unary_op() {
            ops.push(op);
            self.advance()?;
        }

        let operand = self.parse_exponent()?;
        if ops.is_empty() {
            Ok(operand)
        } else {
            Ok(Expr::Unary {
                ops,
                operand: Box::new(operand),
            })
        }
    }

    fn binary_op_at(&self, level: u8) -> Option<BinOp> {
        self.current
            .token
            .binary_op()
            .filter(|op| op.precedence() == level)
    }

    /// One left-associative precedence level, collected into a flat chain.
    fn parse_binary(&mut self, level: u8) -> Result<Expr, ParseError> {
        if level > HIGHEST_CHAIN_PRECEDENCE {
            return self.parse_unary();
        }

        let head = self.parse_binary(level + 1)?;
        let mut tail = vec![];

        while let Some(op) = self.binary_op_at(level) {
            self.advance()?;
            let right = self.parse_binary(level + 1)?;
            tail.push((op, right));
        }

        if tail.is_empty() {
            Ok(head)
        } else {
            Ok(Expr::Binary {
                head: Box::new(head),
                tail,
            })
        }
    }

    /// Parse one expression including conditionals, without requiring the
    /// input to end afterwards.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let test = self.parse_binary(LOWEST_PRECEDENCE)?;

        match self.current.token {
            Token::Question => {
                self.advance()?;
                let when_true = self.parse_expression()?;
                self.expect(Token::Colon)?;
                let when_false = self.parse_expression()?;
                Ok(Expr::Conditional {
                    test: Box::new(test),
                    when_true: Some(Box::new(when_true)),
                    when_false: Box::new(when_false),
                })
            }
            Token::Elvis => {
                self.advance()?;
                let when_false = self.parse_expression()?;
                Ok(Expr::Conditional {
                    test: Box::new(test),
                    when_true: None,
                    when_false: Box::new(when_false),
                })
            }
            _ => Ok(test),
        }
    }

    /// Parse a complete expression; the input must end after it.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        trace!(grammar = ?self.grammar(), "parsing expression");
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

impl Parser {
    /// Parse a complete type expression such as `Map<String, List<Number>> | Boolean`.
    pub fn parse_type(&mut self) -> Result<Expr, ParseError> {
        trace!("parsing type expression");
        let expr = self.parse_union_type()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }

    fn parse_union_type(&mut self) -> Result<Expr, ParseError> {
        let mut members = vec![self.parse_single_type()?];
        while self.check(&Token::Pipe) {
            self.advance()?;
            members.push(self.parse_single_type()?);
        }
        Ok(Expr::UnionType(members))
    }

    fn parse_single_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.start.offset;
        let name = match &self.current.token {
            Token::Identifier(name) => name.clone(),
            _ => return Err(self.unexpected("type name")),
        };
        self.advance()?;

        let mut template = vec![];
        if self.check(&Token::Lt) {
            self.advance()?;
            loop {
                template.push(self.parse_union_type()?);
                if self.check(&Token::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
            self.expect_closing_angle()?;
        }

        let mut config = None;
        if self.check(&Token::LBrace) {
            self.advance()?;
            config = Some(Box::new(self.parse_object_literal()?));
        }

        Ok(Expr::SingleType {
            name,
            config,
            fullname: self.lexer.slice(start, self.previous_end),
            template,
        })
    }

    /// Consumes one `>`, splitting `>>` and `>>>` that close nested templates.
    fn expect_closing_angle(&mut self) -> Result<(), ParseError> {
        let rest = match self.current.token {
            Token::Gt => return self.advance(),
            Token::Shr => Token::Gt,
            Token::UShr => Token::Shr,
            _ => return Err(self.unexpected("'>'")),
        };
        self.previous_end = self.current.start.offset + 1;
        self.current.token = rest;
        self.current.start.offset += 1;
        self.current.start.column += 1;
        Ok(())
    }
}
