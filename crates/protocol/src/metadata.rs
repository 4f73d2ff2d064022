use serde::Serialize;
use serde_json::{Map, Value};

use crate::ProtocolError;

/// Flat key/value metadata returned by the backend on a successful upload.
///
/// No schema is assumed. Entries keep the order in which they appear in the
/// response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResultMetadata {
    fields: Map<String, Value>,
}

impl ResultMetadata {
    /// Decodes a response body that must be a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProtocolError> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ProtocolError::NotAnObject(kind_of(&other))),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the backend returned an empty object.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(key, rendered value)` pairs in decoding order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), render_value(value)))
    }

    /// Display lines of the form `key: value`, in decoding order.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect()
    }
}

/// Renders one metadata value for display.
///
/// Strings are shown without quotes; every other value is shown as its
/// compact JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
