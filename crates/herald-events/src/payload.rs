use crate::error::{EventError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Arbitrary key-value data attached to a published event.
///
/// The bus never inspects a payload; it is shared read-only by every
/// handler dispatched for one publish call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parse a payload from JSON text. The document must be an object.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Payload {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Payload {
    type Error = EventError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(EventError::InvalidPayload { found: "null" }),
            Value::Bool(_) => Err(EventError::InvalidPayload { found: "boolean" }),
            Value::Number(_) => Err(EventError::InvalidPayload { found: "number" }),
            Value::String(_) => Err(EventError::InvalidPayload { found: "string" }),
            Value::Array(_) => Err(EventError::InvalidPayload { found: "array" }),
        }
    }
}
