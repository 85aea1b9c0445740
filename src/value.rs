use std::cmp::Ordering;
use indexmap::IndexMap;
use serde::Serialize;

use crate::number;

/// A runtime value produced by evaluating an expression.
///
/// Mirrors JSON: every number is a double, objects keep their keys in
/// insertion order.
///
/// # Examples
///
/// ```
/// use mace_lang::Value;
/// use mace_lang::value::ObjectMap;
///
/// let null = Value::Null;
/// let number = Value::Number(3.5);
/// let text = Value::from("hello");
///
/// let array = Value::Array(vec![Value::Number(1.0), Value::Boolean(true)]);
///
/// let mut obj = ObjectMap::new();
/// obj.insert("key".to_string(), Value::from("value"));
/// let object = Value::Object(obj);
/// ```
/// Object storage. Re-inserting a key overwrites it in place.
pub type ObjectMap = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// null
    #[default]
    Null,

    /// true / false
    Boolean(bool),

    /// IEEE-754 double
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Ordered list of values
    Array(Vec<Value>),

    /// String-keyed map
    Object(ObjectMap),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// `false`, `0`, `NaN`, `""` and `null` are falsy; everything else,
    /// empty arrays and objects included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Numeric conversion used by arithmetic operators.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b { 1.0 } else { 0.0 }
            }
            Value::Number(n) => *n,
            Value::String(s) => number::str_to_number(s),
            Value::Array(_) => number::str_to_number(&self.as_string()),
            Value::Object(_) => f64::NAN,
        }
    }

    /// String conversion used by concatenation and the message layer.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number::format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.as_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Strings stand for themselves, composites render as text, the rest
    /// become numbers.
    fn to_primitive(&self) -> Value {
        if self.is_composite() {
            Value::String(self.as_string())
        } else {
            self.clone()
        }
    }

    /// Type-and-value equality (`===`). `NaN` is never equal to itself;
    /// arrays and objects compare structurally.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, va)| b.get(k).is_some_and(|vb| va.strict_eq(vb)))
            }
            _ => self == other,
        }
    }

    /// Coercing equality (`==`).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a.strict_eq(b),
            (Value::Boolean(_), _) => Value::Number(self.as_number()).loose_eq(other),
            (_, Value::Boolean(_)) => self.loose_eq(&Value::Number(other.as_number())),
            (Value::Number(a), Value::String(_)) => *a == other.as_number(),
            (Value::String(_), Value::Number(b)) => self.as_number() == *b,
            (a, b) if a.is_composite() && !b.is_composite() => a.to_primitive().loose_eq(b),
            (a, b) if b.is_composite() && !a.is_composite() => a.loose_eq(&b.to_primitive()),
            _ => false,
        }
    }

    /// Ordering used by `<`, `<=`, `>` and `>=`.
    ///
    /// Two strings compare by characters, anything else numerically.
    /// `None` means unordered (a `NaN` was involved).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        let (left, right) = (self.to_primitive(), other.to_primitive());
        match (&left, &right) {
            (Value::String(a), Value::String(b)) => Some(a.chars().cmp(b.chars())),
            _ => left.as_number().partial_cmp(&right.as_number()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
