//! Commands for the type, message, filter and paragraph layers

use super::{CliError, parse_vars, to_value};
use crate::{EvalContext, Value, filter, message, paragraph, types};

fn context(vars: Option<&str>) -> Result<EvalContext, CliError> {
    Ok(EvalContext::new().with_identifiers(parse_vars(vars)?))
}

/// Evaluate a type expression into its list of records.
pub fn execute_type(source: &str, vars: Option<&str>) -> Result<Value, CliError> {
    let records = types::evaluate_type(source, &mut context(vars)?)?;
    Ok(to_value(&records)?)
}

/// Parse and render `speaker : content` lines.
pub fn execute_message(text: &str, vars: Option<&str>) -> Result<Value, CliError> {
    let messages = message::render_messages(text, &mut context(vars)?)?;
    Ok(to_value(&messages)?)
}

/// Compile a query filter; the result is the query string.
pub fn execute_filter(source: &str) -> Result<Value, CliError> {
    Ok(Value::String(filter::to_postgrest(source)?))
}

pub fn execute_paragraphs(text: &str) -> Result<Value, CliError> {
    Ok(to_value(&paragraph::split_paragraphs(text))?)
}
