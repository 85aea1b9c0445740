//! Validate and evaluate expressions

use super::{CliError, parse_vars};
use crate::value::ObjectMap;
use crate::{EvalContext, Evaluator, Grammar, Lexer, Parser, Value};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON object of static identifiers
    pub vars: Option<String>,
    pub grammar: Grammar,
    /// Report the identifiers the evaluation reached
    pub track: bool,
}

/// Result of an eval operation
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub value: Value,
    /// Present only when tracking was requested
    pub identifiers: Option<Vec<String>>,
}

impl EvalReport {
    /// The bare value, or `{value, identifiers}` when identifiers were tracked.
    pub fn into_value(self) -> Value {
        let Some(identifiers) = self.identifiers else {
            return self.value;
        };
        let mut report = ObjectMap::new();
        report.insert("value".to_string(), self.value);
        report.insert("identifiers".to_string(), Value::from(identifiers));
        Value::Object(report)
    }
}

/// Only validate syntax, don't evaluate.
pub fn execute_check(expression: &str, grammar: Grammar) -> Result<(), CliError> {
    Parser::new(Lexer::with_grammar(expression, grammar))?.parse()?;
    Ok(())
}

/// Parse and evaluate an expression against the given variables.
pub fn execute_eval(options: &EvalOptions) -> Result<EvalReport, CliError> {
    let expr = Parser::new(Lexer::with_grammar(&options.expression, options.grammar))?.parse()?;

    let mut context = EvalContext::new().with_identifiers(parse_vars(options.vars.as_deref())?);
    if options.track {
        context = context.track_identifiers();
    }

    let value = Evaluator::new(&mut context).evaluate(&expr)?;
    Ok(EvalReport {
        value,
        identifiers: context.take_identifiers_order(),
    })
}
