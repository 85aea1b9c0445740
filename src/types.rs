//! Type expressions: `Name`, `Name<T, U>`, `Name{config}` and `A | B` unions.
//!
//! A type expression evaluates to a list of [`TypeRecord`]s, one per union
//! member. Template arguments are themselves unions, so a record's
//! `template` is a list of record lists.
//!
//! ```
//! use mace_lang::{EvalContext, types::evaluate_type};
//!
//! let mut ctx = EvalContext::new();
//! let records = evaluate_type("Map<String, List<String>> | Boolean", &mut ctx).unwrap();
//! assert_eq!(records[0].fullname, "Map<String, List<String>>");
//! assert_eq!(records[0].template[1][0].name, "List");
//! assert_eq!(records[1].name, "Boolean");
//! ```

use std::fmt;

use serde::Serialize;

use crate::{
    ast::Expr,
    context::EvalContext,
    error::Result,
    evaluator::Evaluator,
    lexer::{Grammar, Lexer},
    output,
    parser::{ParseError, Parser},
    value::{ObjectMap, Value},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeRecord {
    pub name: String,
    pub config: ObjectMap,
    /// Source text the type was read from
    pub fullname: String,
    pub template: Vec<Vec<TypeRecord>>,
}

impl TypeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        TypeRecord {
            fullname: name.clone(),
            name,
            config: ObjectMap::new(),
            template: vec![],
        }
    }

    fn from_value(value: &Value) -> Option<TypeRecord> {
        let Value::Object(fields) = value else {
            return None;
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

        let config = match fields.get("config") {
            Some(Value::Object(config)) => config.clone(),
            _ => ObjectMap::new(),
        };
        let template = match fields.get("template") {
            Some(Value::Array(arguments)) => arguments.iter().map(records_from_value).collect(),
            _ => vec![],
        };

        Some(TypeRecord {
            name: text("name")?,
            config,
            fullname: text("fullname")?,
            template,
        })
    }
}

/// Canonical source form; parsing it yields an equal record (up to `fullname`).
impl fmt::Display for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.template.is_empty() {
            let arguments: Vec<String> = self.template.iter().map(|u| format_union(u)).collect();
            write!(f, "<{}>", arguments.join(", "))?;
        }
        if !self.config.is_empty() {
            f.write_str(&output::to_source(&Value::Object(self.config.clone())))?;
        }
        Ok(())
    }
}

/// Renders union members joined by ` | `.
pub fn format_union(records: &[TypeRecord]) -> String {
    records
        .iter()
        .map(TypeRecord::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Converts an evaluated union (array of record objects) into records.
pub fn records_from_value(value: &Value) -> Vec<TypeRecord> {
    match value {
        Value::Array(members) => members.iter().filter_map(TypeRecord::from_value).collect(),
        other => TypeRecord::from_value(other).into_iter().collect(),
    }
}

pub fn parse_type(source: &str) -> std::result::Result<Expr, ParseError> {
    Parser::new(Lexer::with_grammar(source, Grammar::Extended))?.parse_type()
}

pub fn evaluate_type(source: &str, context: &mut EvalContext) -> Result<Vec<TypeRecord>> {
    let expr = parse_type(source)?;
    let value = Evaluator::new(context).evaluate(&expr)?;
    Ok(records_from_value(&value))
}

pub async fn evaluate_type_async(
    source: &str,
    context: &mut EvalContext,
) -> Result<Vec<TypeRecord>> {
    let expr = parse_type(source)?;
    let value = Evaluator::new(context).evaluate_async(&expr).await?;
    Ok(records_from_value(&value))
}
