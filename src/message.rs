//! Dialogue lines of the form `speaker : content`.
//!
//! The speaker is either an expression followed by `:` (a bare identifier
//! speaks its own name, anything else is evaluated) or free text up to the
//! first `:`. The content is either a single quoted string, taken as is, or
//! free text where `{{ expression }}` spans are evaluated and substituted.
//!
//! ```text
//! Jonathan : "Bonjour Vincent"
//! 'Jon' + 'athan' : 'Bonjour Vincent'
//! Jonathan : Bonjour Vincent, tu as {{ 32 + 1 }} pièces.
//! ```

use serde::Serialize;

use crate::{
    ast::{Expr, Token},
    context::EvalContext,
    error::Result,
    evaluator::{EvalError, Evaluator},
    lexer::{Lexer, Position},
    parser::{ParseError, Parser},
};

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub speaker: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Expr(Expr),
}

/// Text with evaluated `{{ }}` spans.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn text(text: impl Into<String>) -> Self {
        Template {
            segments: vec![Segment::Text(text.into())],
        }
    }

    /// Splits free text into literal runs and interpolated expressions.
    pub fn parse(text: &str) -> std::result::Result<Self, ParseError> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments = vec![];
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
                let rest: String = chars[i + 2..].iter().collect();
                let (expr, consumed) = parse_interpolation(&rest)?;
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Expr(expr));
                i += 2 + consumed;
            } else {
                literal.push(chars[i]);
                i += 1;
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }
        Ok(Template { segments })
    }

    pub fn render(&self, context: &mut EvalContext) -> std::result::Result<String, EvalError> {
        let mut evaluator = Evaluator::new(context);
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expr(expr) => out.push_str(&evaluator.evaluate(expr)?.as_string()),
            }
        }
        Ok(out)
    }

    pub async fn render_async(
        &self,
        context: &mut EvalContext,
    ) -> std::result::Result<String, EvalError> {
        let mut evaluator = Evaluator::new(context);
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expr(expr) => {
                    out.push_str(&evaluator.evaluate_async(expr).await?.as_string())
                }
            }
        }
        Ok(out)
    }
}

/// A parsed line, ready to be rendered against a context.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    pub speaker: Template,
    pub content: Template,
}

impl MessageTemplate {
    pub fn render(&self, context: &mut EvalContext) -> std::result::Result<Message, EvalError> {
        Ok(Message {
            speaker: self.speaker.render(context)?,
            content: self.content.render(context)?,
        })
    }

    pub async fn render_async(
        &self,
        context: &mut EvalContext,
    ) -> std::result::Result<Message, EvalError> {
        Ok(Message {
            speaker: self.speaker.render_async(context).await?,
            content: self.content.render_async(context).await?,
        })
    }
}

/// Parses the expression after `{{` and returns it with the number of
/// characters consumed through the closing `}}`.
fn parse_interpolation(rest: &str) -> std::result::Result<(Expr, usize), ParseError> {
    let mut parser = Parser::new(Lexer::new(rest))?;
    let expr = parser.parse_expression()?;
    parser.expect(Token::RBrace)?;
    if !parser.check(&Token::RBrace) || parser.span().start.offset != parser.consumed_until() {
        return Err(ParseError::Message {
            position: parser.span().start,
            reason: "expected '}}' to close interpolation".to_string(),
        });
    }
    Ok((expr, parser.span().end.offset))
}

/// Speaker written as an expression directly followed by `:`.
fn expression_speaker(line: &str) -> Option<(Template, usize)> {
    let mut parser = Parser::new(Lexer::new(line)).ok()?;
    let expr = parser.parse_expression().ok()?;
    if !parser.check(&Token::Colon) {
        return None;
    }
    let after_colon = parser.span().end.offset;
    let speaker = match expr {
        Expr::Identifier(name) => Template::text(name),
        other => Template {
            segments: vec![Segment::Expr(other)],
        },
    };
    Some((speaker, after_colon))
}

/// Free-text speaker up to the first `:` outside `{{ }}`.
fn free_text_speaker(line: &str) -> std::result::Result<Option<(String, usize)>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                let rest: String = chars[i + 2..].iter().collect();
                let (_, consumed) = parse_interpolation(&rest)?;
                i += 2 + consumed;
            }
            ':' => return Ok(Some((chars[..i].iter().collect(), i + 1))),
            _ => i += 1,
        }
    }
    Ok(None)
}

fn quoted_content(content: &str) -> Option<String> {
    let mut lexer = Lexer::new(content);
    match (lexer.next_token(), lexer.next_token()) {
        (Ok(Token::String(s)), Ok(Token::Eof)) => Some(s),
        _ => None,
    }
}

fn message_error(line: usize, column: usize, reason: &str) -> ParseError {
    ParseError::Message {
        position: Position {
            offset: column.saturating_sub(1),
            line,
            column,
        },
        reason: reason.to_string(),
    }
}

/// Parses a single `speaker : content` line.
pub fn parse_message(line: &str) -> std::result::Result<MessageTemplate, ParseError> {
    parse_line(line, 1)
}

fn parse_line(line: &str, line_no: usize) -> std::result::Result<MessageTemplate, ParseError> {
    let (speaker, content_start) = match expression_speaker(line) {
        Some(found) => found,
        None => {
            let Some((text, after)) = free_text_speaker(line)? else {
                return Err(message_error(
                    line_no,
                    line.chars().count() + 1,
                    "expected ':' between speaker and content",
                ));
            };
            if text.trim().is_empty() {
                return Err(message_error(line_no, 1, "empty speaker"));
            }
            (Template::parse(text.trim())?, after)
        }
    };

    let content: String = line.chars().skip(content_start).collect();
    let content = content.trim();
    if content.is_empty() {
        return Err(message_error(line_no, content_start + 1, "empty content"));
    }
    if content.starts_with(':') {
        return Err(message_error(line_no, content_start + 1, "doubled ':' separator"));
    }

    let content = match quoted_content(content) {
        Some(text) => Template::text(text),
        None => Template::parse(content)?,
    };
    Ok(MessageTemplate { speaker, content })
}

/// Parses every non-blank line of `text` as a message.
pub fn parse_messages(text: &str) -> std::result::Result<Vec<MessageTemplate>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(line, index + 1))
        .collect()
}

/// Parses and renders every message in `text`.
pub fn render_messages(text: &str, context: &mut EvalContext) -> Result<Vec<Message>> {
    let templates = parse_messages(text)?;
    let mut messages = Vec::with_capacity(templates.len());
    for template in &templates {
        messages.push(template.render(context)?);
    }
    Ok(messages)
}

pub async fn render_messages_async(
    text: &str,
    context: &mut EvalContext,
) -> Result<Vec<Message>> {
    let templates = parse_messages(text)?;
    let mut messages = Vec::with_capacity(templates.len());
    for template in &templates {
        messages.push(template.render_async(context).await?);
    }
    Ok(messages)
}
