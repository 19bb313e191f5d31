//! Envelope types and error definitions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while unwrapping an invocation payload.
///
/// Every variant is a client error: the host sent something this route
/// cannot interpret.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Malformed invocation envelope: {0}")]
    Envelope(String),

    #[error("Invocation data has no \"{0}\" entry")]
    MissingValue(String),

    #[error("Invocation data entry \"{key}\" must be a string, got {found}")]
    NotAString { key: String, found: &'static str },

    #[error("Embedded document is not a quoted JSON string: {0}")]
    Unquote(String),

    #[error("Invalid payload: {0}")]
    Payload(String),
}

/// Request body posted by the custom-handler host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeRequest {
    /// Trigger and input binding data, keyed by binding name
    #[serde(default)]
    pub data: HashMap<String, Value>,
    /// Trigger metadata (sys, invocation properties); not interpreted
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

/// Response body returned to the custom-handler host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    /// Output binding values, keyed by binding name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub outputs: HashMap<String, Value>,
    /// Lines surfaced as invocation logs by the host
    #[serde(default)]
    pub logs: Vec<String>,
    /// Value for a `$return` binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
}

impl InvokeResponse {
    /// Response carrying the single log line `"success"`
    pub fn success() -> Self {
        Self {
            logs: vec!["success".to_string()],
            ..Default::default()
        }
    }

    /// Set an output binding value
    pub fn with_output(mut self, binding: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(binding.into(), value);
        self
    }
}
