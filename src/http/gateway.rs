//! Gateway event and response envelopes
//!
//! These mirror the proxy-integration payloads exchanged with the hosting
//! gateway: camelCase keys, string-encoded status code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Inbound event describing one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: String,
    /// Values are usually strings, but direct invocations may pass them
    /// already typed (`{"tile": 512}`)
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, Value>>,
}

impl InboundEvent {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            http_method: method.into(),
            query_string_parameters: None,
        }
    }

    /// Add one query-string parameter
    #[must_use]
    pub fn with_query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_query_value(key, Value::String(value.into()))
    }

    /// Add one query-string parameter carrying a JSON value
    #[must_use]
    pub fn with_query_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Outbound response envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
}

impl OutboundResponse {
    /// Numeric status code
    pub fn status(&self) -> u16 {
        self.status_code.parse().unwrap_or(500)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Serialize for the gateway
    pub fn to_json(&self) -> String {
        // A map of strings and a bool cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}
