//! CLI support for mace-lang
//!
//! Every command of the `mace` binary is available here as a function
//! returning a [`Value`](crate::Value), so other tools can embed them.

mod check;
mod convert;
mod layers;

pub use check::{EvalOptions, EvalReport, execute_check, execute_eval};
pub use convert::{json_to_value, to_value};
pub use layers::{execute_filter, execute_message, execute_paragraphs, execute_type};

use std::io;

use crate::{Error, EvalError, IdentifierSource, ParseError, Value};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parser error
    Parse(ParseError),
    /// Evaluation error
    Eval(EvalError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// `--vars` was valid JSON but not an object
    Vars(String),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Eval(e) => write!(f, "Evaluation error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Vars(found) => write!(f, "--vars must be a JSON object, got {}", found),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Pass it as an argument or pipe it to stdin."),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Eval(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<EvalError> for CliError {
    fn from(e: EvalError) -> Self {
        CliError::Eval(e)
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        match e {
            Error::Parse(e) => CliError::Parse(e),
            Error::Eval(e) => CliError::Eval(e),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Static identifiers from a `--vars` JSON object; `None` binds nothing.
pub fn parse_vars(vars: Option<&str>) -> Result<IdentifierSource, CliError> {
    let Some(text) = vars else {
        return Ok(IdentifierSource::default());
    };
    match json_to_value(serde_json::from_str(text)?) {
        Value::Object(map) => Ok(IdentifierSource::Static(map.into_iter().collect())),
        other => Err(CliError::Vars(other.type_name().to_string())),
    }
}
