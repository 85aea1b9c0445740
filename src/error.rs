//! Umbrella error for the one-call APIs that parse and evaluate together.

use thiserror::Error;

use crate::{evaluator::EvalError, parser::ParseError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Lexing or parsing failed; nothing was evaluated.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Evaluation aborted.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl From<crate::lexer::LexError> for Error {
    fn from(error: crate::lexer::LexError) -> Self {
        Error::Parse(ParseError::Lex(error))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
