//! Query filters compiled to PostgREST query strings.
//!
//! ```text
//! age = 32                                  age=eq.32
//! FTS(description, "findme")                description=fts.findme
//! OR(name = "Vincent", age > 32)            or=(name.eq.Vincent,age.gt.32)
//! AND(name = "Vincent", NOT(age > 32))      and=(name.eq.Vincent,age.not.gt.32)
//! ```
//!
//! Operands are literals, not expressions. Comparison operators are
//! `= != < <= > >=` and the words `LIKE ILIKE IS IN`.

use std::fmt;

use tracing::trace;

use crate::{
    ast::Token,
    lexer::{Grammar, Lexer},
    number::format_number,
    parser::{ParseError, Parser},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Ilike,
    Is,
    In,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Like => "like",
            CompareOp::Ilike => "ilike",
            CompareOp::Is => "is",
            CompareOp::In => "in",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        [
            ("LIKE", CompareOp::Like),
            ("ILIKE", CompareOp::Ilike),
            ("IS", CompareOp::Is),
            ("IN", CompareOp::In),
        ]
        .into_iter()
        .find(|(name, _)| word.eq_ignore_ascii_case(name))
        .map(|(_, op)| op)
    }
}

/// Full-text search flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullTextOp {
    /// `to_tsquery`
    Fts,
    /// `plainto_tsquery`
    Plfts,
    /// `phraseto_tsquery`
    Phfts,
    /// `websearch_to_tsquery`
    Wfts,
}

impl FullTextOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FullTextOp::Fts => "fts",
            FullTextOp::Plfts => "plfts",
            FullTextOp::Phfts => "phfts",
            FullTextOp::Wfts => "wfts",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        [
            ("FTS", FullTextOp::Fts),
            ("PLFTS", FullTextOp::Plfts),
            ("PHFTS", FullTextOp::Phfts),
            ("WFTS", FullTextOp::Wfts),
        ]
        .into_iter()
        .find(|(name, _)| word.eq_ignore_ascii_case(name))
        .map(|(_, op)| op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    FullText {
        field: String,
        op: FullTextOp,
        term: String,
        language: Option<String>,
    },
    Not(Box<Filter>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

const RESERVED: &[char] = &[',', '(', ')', '"', '\\'];

fn render_scalar(value: &Value) -> String {
    let text = match value {
        Value::Number(n) => return format_number(*n),
        Value::String(s) => s.clone(),
        other => return other.as_string(),
    };
    if text.contains(RESERVED) || text.trim() != text || text.is_empty() {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        text
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_scalar).collect();
            format!("({})", items.join(","))
        }
        other => render_scalar(other),
    }
}

impl Filter {
    /// Query-string form at the top level (`field=op.value`).
    pub fn to_query_string(&self) -> String {
        self.render(true, false)
    }

    fn render(&self, root: bool, negated: bool) -> String {
        let not = if negated { "not." } else { "" };
        let condition = |field: &str, op: String, value: String| {
            if root {
                format!("{}={}{}.{}", field, not, op, value)
            } else {
                format!("{}.{}{}.{}", field, not, op, value)
            }
        };

        match self {
            Filter::Not(inner) => inner.render(root, !negated),
            Filter::Compare { field, op, value } => {
                condition(field, op.as_str().to_string(), render_value(value))
            }
            Filter::FullText {
                field,
                op,
                term,
                language,
            } => {
                let op = match language {
                    Some(language) => format!("{}({})", op.as_str(), language),
                    None => op.as_str().to_string(),
                };
                condition(field, op, render_scalar(&Value::String(term.clone())))
            }
            Filter::And(items) | Filter::Or(items) => {
                let name = if matches!(self, Filter::And(_)) { "and" } else { "or" };
                let inner: Vec<String> = items.iter().map(|f| f.render(false, false)).collect();
                if root {
                    format!("{}{}=({})", not, name, inner.join(","))
                } else {
                    format!("{}{}({})", not, name, inner.join(","))
                }
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

struct FilterParser {
    parser: Parser,
}

impl FilterParser {
    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            position: self.parser.span().start,
            expected: expected.to_string(),
            found: self.parser.peek().describe(),
        }
    }

    fn identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        let Token::Identifier(name) = self.parser.peek() else {
            return Err(self.unexpected(expected));
        };
        let name = name.clone();
        self.parser.advance()?;
        Ok(name)
    }

    fn parse_filter(&mut self) -> Result<Filter, ParseError> {
        match self.parser.peek() {
            Token::And | Token::Or => {
                let is_and = self.parser.check(&Token::And);
                self.parser.advance()?;
                let items = self.parse_arguments()?;
                Ok(if is_and { Filter::And(items) } else { Filter::Or(items) })
            }
            Token::Not => {
                self.parser.advance()?;
                self.parser.expect(Token::LParen)?;
                let inner = self.parse_filter()?;
                self.parser.expect(Token::RParen)?;
                Ok(Filter::Not(Box::new(inner)))
            }
            Token::Identifier(_) => {
                let field = self.identifier("field name")?;
                match FullTextOp::from_word(&field) {
                    Some(op) if self.parser.check(&Token::LParen) => self.parse_full_text(op),
                    _ => self.parse_comparison(field),
                }
            }
            _ => Err(self.unexpected("condition")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Filter>, ParseError> {
        self.parser.expect(Token::LParen)?;
        let mut items = vec![self.parse_filter()?];
        while self.parser.check(&Token::Comma) {
            self.parser.advance()?;
            items.push(self.parse_filter()?);
        }
        self.parser.expect(Token::RParen)?;
        Ok(items)
    }

    fn parse_full_text(&mut self, op: FullTextOp) -> Result<Filter, ParseError> {
        self.parser.expect(Token::LParen)?;
        let field = self.identifier("field name")?;
        self.parser.expect(Token::Comma)?;
        let term = self.parse_literal()?.as_string();
        let mut language = None;
        if self.parser.check(&Token::Comma) {
            self.parser.advance()?;
            language = Some(self.parse_literal()?.as_string());
        }
        self.parser.expect(Token::RParen)?;
        Ok(Filter::FullText {
            field,
            op,
            term,
            language,
        })
    }

    fn parse_operator(&mut self) -> Result<CompareOp, ParseError> {
        let op = match self.parser.peek() {
            Token::Assign | Token::EqEq => CompareOp::Eq,
            Token::NotEq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::LtEq => CompareOp::Lte,
            Token::Gt => CompareOp::Gt,
            Token::GtEq => CompareOp::Gte,
            Token::Identifier(word) => match CompareOp::from_word(word) {
                Some(op) => op,
                None => return Err(self.unexpected("comparison operator")),
            },
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.parser.advance()?;
        Ok(op)
    }

    fn parse_comparison(&mut self, field: String) -> Result<Filter, ParseError> {
        let op = self.parse_operator()?;
        let value = if op == CompareOp::In {
            self.parser.expect(Token::LParen)?;
            let mut items = vec![self.parse_literal()?];
            while self.parser.check(&Token::Comma) {
                self.parser.advance()?;
                items.push(self.parse_literal()?);
            }
            self.parser.expect(Token::RParen)?;
            Value::Array(items)
        } else {
            self.parse_literal()?
        };
        Ok(Filter::Compare { field, op, value })
    }

    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        let negative = self.parser.check(&Token::Minus);
        if negative {
            self.parser.advance()?;
        }
        let value = match self.parser.peek() {
            Token::Number(n) => Value::Number(if negative { -n } else { *n }),
            Token::String(s) if !negative => Value::String(s.clone()),
            Token::Boolean(b) if !negative => Value::Boolean(*b),
            Token::Null if !negative => Value::Null,
            _ => return Err(self.unexpected("literal value")),
        };
        self.parser.advance()?;
        Ok(value)
    }
}

pub fn parse_filter(source: &str) -> Result<Filter, ParseError> {
    trace!("parsing query filter");
    let mut parser = FilterParser {
        parser: Parser::new(Lexer::with_grammar(source, Grammar::Filter))?,
    };
    let filter = parser.parse_filter()?;
    parser.parser.expect(Token::Eof)?;
    Ok(filter)
}

/// Compiles a filter expression to a PostgREST query string.
pub fn to_postgrest(source: &str) -> Result<String, ParseError> {
    Ok(parse_filter(source)?.to_query_string())
}
