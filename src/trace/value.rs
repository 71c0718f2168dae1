use serde::{Deserialize, Serialize};
use std::fmt;

/// The value a block produced while being evaluated.
///
/// Serialized untagged, so a trace entry's `result` reads as plain JSON:
/// `true`, `"action-block"`, `{"policyId": "p1", "loaded": true}` or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Text(String),
    Record(serde_json::Value),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// A record describing a failure, as stored on the trace entry of a block that failed.
    pub fn error(message: impl Into<String>) -> Self {
        Value::Record(serde_json::json!({ "error": message.into() }))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Record(v) => write!(f, "{}", v),
        }
    }
}
