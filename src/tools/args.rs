//! Typed access to a tool call's argument object.

use serde_json::{Map, Value};

/// The argument bag of one tool call.
///
/// Values of the wrong JSON type are treated as absent. Empty strings are
/// treated as absent too, so an optional `"output_path": ""` is simply not
/// passed on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    fields: Map<String, Value>,
}

impl ToolArgs {
    /// Wrap a JSON value; anything other than an object yields an empty bag.
    pub fn new(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Non-empty string field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `true` only for a JSON `true`.
    pub fn bool_field(&self, key: &str) -> bool {
        self.bool_field_or(key, false)
    }

    /// Boolean field, `default` when absent or not a boolean.
    pub fn bool_field_or(&self, key: &str, default: bool) -> bool {
        self.fields
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Non-negative integer field, `default` when absent or not an integer.
    pub fn u64_field_or(&self, key: &str, default: u64) -> u64 {
        self.fields
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(default)
    }

    /// Array of strings. Non-string elements are skipped; `None` unless the
    /// field is a non-empty array with at least one string.
    pub fn string_list(&self, key: &str) -> Option<Vec<&str>> {
        let items: Vec<&str> = self
            .fields
            .get(key)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .collect();
        (!items.is_empty()).then_some(items)
    }
}

impl From<Value> for ToolArgs {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
