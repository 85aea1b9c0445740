//! JSON -> Value conversion utilities

use serde::Serialize;

use crate::Value;

/// Convert serde_json::Value to a runtime Value. Every number becomes a double.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Serialize any record (type records, messages, paragraphs) into a Value.
pub fn to_value<T: Serialize>(record: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record).map(json_to_value)
}
