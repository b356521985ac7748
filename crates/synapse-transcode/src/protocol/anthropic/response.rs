//! Messages API response and error bodies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::ContentBlock;

/// Messages API response body (also the `message` of `message_start`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Message identifier
    pub id: String,
    /// Always `message`
    #[serde(rename = "type", default = "default_message_type")]
    pub message_type: String,
    /// Always `assistant`
    #[serde(default = "default_role")]
    pub role: String,
    /// Generated content
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Model that produced the message
    pub model: String,
    /// Why generation stopped (null while streaming)
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence that ended generation
    #[serde(default)]
    pub stop_sequence: Option<String>,
    /// Token usage
    #[serde(default)]
    pub usage: Usage,
    /// Code execution container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Value>,
    /// Fields this schema does not model (`context_management`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_message_type() -> String {
    "message".to_owned()
}

fn default_role() -> String {
    "assistant".to_owned()
}

/// Token usage
///
/// `input_tokens` is absent from most `message_delta` usage objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Completion tokens
    #[serde(default)]
    pub output_tokens: u32,
    /// Prompt tokens written to the cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u32>,
    /// Prompt tokens read from the cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u32>,
    /// Cache writes split by TTL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation: Option<Value>,
    /// Server tool invocation counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_tool_use: Option<Value>,
    /// Tier that served the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    /// Fields this schema does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Error body, returned instead of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `error`
    #[serde(rename = "type")]
    pub response_type: String,
    /// What went wrong
    pub error: ApiError,
    /// Request identifier, when Anthropic reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type (`overloaded_error`, `invalid_request_error`, ...)
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable message
    pub message: String,
    /// Fields this schema does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
