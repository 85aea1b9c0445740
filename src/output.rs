//! Text rendering of runtime values.
//!
//! - [`to_json()`] / [`to_json_pretty()`] - JSON with keys in insertion order
//!   (2-space indentation when pretty). `NaN` and infinities have no JSON form
//!   and render as `null`.
//! - [`to_source()`] - expression text that evaluates back to the value,
//!   used to print type configs.
//!
//! # Examples
//!
//! ```
//! use mace_lang::Value;
//! use mace_lang::output::{to_json, to_json_pretty, to_source};
//!
//! let value = Value::from(vec![Value::Number(1.5), Value::from("a\"b")]);
//!
//! assert_eq!(to_json(&value), r#"[1.5,"a\"b"]"#);
//! assert_eq!(to_json_pretty(&Value::Number(42.0)), "42");
//! assert_eq!(to_source(&value), r#"[1.5, "a\"b"]"#);
//! ```

use crate::number::format_number;
use crate::value::{ObjectMap, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) if n.is_finite() => format_number(*n),
            Value::Number(_) => "null".to_string(),
            Value::String(s) => format!("\"{}\"", escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        let items: Vec<String> = arr
            .iter()
            .map(|v| self.print_value(v, indent + 1))
            .collect();
        self.wrap('[', ']', items, indent)
    }

    fn print_object(&self, obj: &ObjectMap, indent: usize) -> String {
        let separator = if self.pretty { ": " } else { ":" };
        let items: Vec<String> = obj
            .iter()
            .map(|(k, v)| {
                format!(
                    "\"{}\"{}{}",
                    escape_string(k),
                    separator,
                    self.print_value(v, indent + 1)
                )
            })
            .collect();
        self.wrap('{', '}', items, indent)
    }

    fn wrap(&self, open: char, close: char, items: Vec<String>, indent: usize) -> String {
        if items.is_empty() {
            return format!("{}{}", open, close);
        }
        if !self.pretty {
            return format!("{}{}{}", open, items.join(","), close);
        }

        let inner = "  ".repeat(indent + 1);
        let lines: Vec<String> = items.iter().map(|item| format!("{}{}", inner, item)).collect();
        format!("{}\n{}\n{}{}", open, lines.join(",\n"), "  ".repeat(indent), close)
    }
}

fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Converts a Value to compact JSON.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON.
///
/// # Examples
///
/// ```
/// use mace_lang::Value;
/// use mace_lang::output::to_json_pretty;
/// use mace_lang::value::ObjectMap;
///
/// let mut obj = ObjectMap::new();
/// obj.insert("name".to_string(), Value::from("Alice"));
/// obj.insert("age".to_string(), Value::Number(30.0));
///
/// assert_eq!(
///     to_json_pretty(&Value::Object(obj)),
///     "{\n  \"name\": \"Alice\",\n  \"age\": 30\n}"
/// );
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !matches!(key, "true" | "false" | "null")
        && !key.starts_with("NOT")
        && !matches!(key, "AND" | "OR")
}

fn source_number(n: f64) -> String {
    if n.is_nan() {
        "Number_NaN".to_string()
    } else if n == f64::INFINITY {
        "Number_POSITIVE_INFINITY".to_string()
    } else if n == f64::NEG_INFINITY {
        "Number_NEGATIVE_INFINITY".to_string()
    } else {
        format_number(n)
    }
}

/// Renders a value as expression source.
pub fn to_source(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => source_number(*n),
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(to_source).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    let key = if is_bare_key(k) {
                        k.clone()
                    } else {
                        to_source(&Value::String(k.clone()))
                    };
                    format!("{}: {}", key, to_source(v))
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_numbers_are_null_in_json() {
        assert_eq!(to_json(&Value::Number(f64::NAN)), "null");
        assert_eq!(to_json(&Value::Number(1e21)), "1e+21");
    }

    #[test]
    fn source_quotes_awkward_keys() {
        let mut obj = ObjectMap::new();
        obj.insert("plain".to_string(), Value::Number(1.0));
        obj.insert("with space".to_string(), Value::Null);
        obj.insert("true".to_string(), Value::Boolean(false));
        assert_eq!(
            to_source(&Value::Object(obj)),
            r#"{plain: 1, "with space": null, "true": false}"#
        );
    }

    #[test]
    fn pretty_nesting() {
        let value = Value::from(vec![Value::from(vec![1])]);
        assert_eq!(to_json_pretty(&value), "[\n  [\n    1\n  ]\n]");
    }
}
