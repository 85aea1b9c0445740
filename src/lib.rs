//! An embeddable expression language.
//!
//! Expressions are parsed once and evaluated against a caller-owned
//! [`EvalContext`] that supplies identifier values (a static map, a
//! synchronous resolver or an asynchronous one) and host functions.
//!
//! ```
//! use mace_lang::{EvalContext, IdentifierSource, Value, eval};
//!
//! let mut ctx = EvalContext::new()
//!     .with_identifiers(IdentifierSource::from_map([("a", Value::from(vec![1, 2, 3]))]));
//!
//! assert_eq!(eval("a[2] * 10 + Math_max(1, 4)", &mut ctx).unwrap(), Value::Number(34.0));
//! assert_eq!(eval("0 ?: 'fallback'", &mut ctx).unwrap(), Value::from("fallback"));
//! ```

pub mod ast;
pub mod builtins;
pub mod cli;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod message;
pub mod number;
pub mod output;
pub mod paragraph;
pub mod parser;
pub mod types;
pub mod value;

pub use ast::{BinOp, Expr, Token, UnaryOp};
pub use context::{
    AsyncIdentifierResolver, EvalContext, IdentifierResolver, IdentifierSource, NativeFunction,
    ResolveError,
};
pub use error::{Error, Result};
pub use evaluator::{EvalError, Evaluator};
pub use filter::{Filter, to_postgrest};
pub use lexer::{Grammar, LexError, Lexer, Position};
pub use message::{Message, parse_messages, render_messages};
pub use output::{to_json, to_json_pretty};
pub use paragraph::{Paragraph, split_paragraphs};
pub use parser::{ParseError, Parser};
pub use types::{TypeRecord, evaluate_type};
pub use value::{ObjectMap, Value};

/// Parses a complete expression in the default grammar.
pub fn parse(source: &str) -> std::result::Result<Expr, ParseError> {
    parse_with(source, Grammar::default())
}

pub fn parse_with(source: &str, grammar: Grammar) -> std::result::Result<Expr, ParseError> {
    Parser::new(Lexer::with_grammar(source, grammar))?.parse()
}

/// Parses and evaluates `source`. Nothing is evaluated if parsing fails.
pub fn eval(source: &str, context: &mut EvalContext) -> Result<Value> {
    let expr = parse(source)?;
    Ok(Evaluator::new(context).evaluate(&expr)?)
}

/// Like [`eval`], awaiting asynchronous identifier resolvers.
pub async fn eval_async(source: &str, context: &mut EvalContext) -> Result<Value> {
    let expr = parse(source)?;
    Ok(Evaluator::new(context).evaluate_async(&expr).await?)
}
