//! Existence guard
//!
//! Client-side duplicate check run before every POST. It lists the target
//! collection and looks for an entry with the value about to be created.
//!
//! The list-then-create sequence is not atomic: two callers creating the same
//! name concurrently can both pass the check. TrafficJam enforces no uniqueness
//! of its own, so this scan is the only protection there is.

use serde_json::Value;
use tracing::warn;

/// Whether any entry of `collection` has `key == value`
///
/// An absent or empty collection never matches.
pub fn check_exists(collection: Option<&Value>, key: &str, value: &Value) -> bool {
    find_existing(collection, key, value).is_some()
}

/// First entry of `collection` with `key == value`
pub fn find_existing<'a>(collection: Option<&'a Value>, key: &str, value: &Value) -> Option<&'a Value> {
    let entries = match collection? {
        Value::Array(entries) => entries,
        Value::Null => return None,
        other => {
            warn!("Expected a list of existing entries, got {}; assuming no duplicate", kind_of(other));
            return None;
        }
    };

    entries
        .iter()
        .find(|entry| entry.get(key).is_some_and(|found| same_value(found, value)))
}

/// Equality that tolerates numbers sent back as strings and vice versa
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => a == b,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
