//! Value parsing for command arguments.

use serialstore::Value;

/// Parse a command-line value.
///
/// Valid JSON becomes the matching value (`42` is an integer, `"42"` a
/// string, `{"a":1}` an object). Anything else is taken as a plain string.
pub fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::String(raw.to_string()),
    }
}
