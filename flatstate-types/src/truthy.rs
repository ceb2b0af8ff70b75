//! JSON truthiness and shape helpers.

use serde_json::Value;

/// Returns true if the value counts as set when used as a flag.
///
/// `null`, `false`, zero, `NaN` and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns true for objects and arrays, the only values a schema can descend into.
#[must_use]
pub fn is_structural(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Short name of a value's JSON type, for error messages.
#[must_use]
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
