use serde::{Deserialize, Serialize};

use super::extras::{Extras, VendorRaw};
use super::message::Message;
use super::vendor::Vendor;

/// Reason the model stopped generating
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation
    Stop,
    /// Hit the `max_tokens` limit
    Length,
    /// Model decided to call a tool
    ToolCalls,
    /// Content was filtered or refused
    ContentFilter,
    /// Anything without a canonical meaning (paused turns, new vendor values)
    Unknown,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion)
    pub total_tokens: u32,
    /// Prompt tokens written to the vendor's prompt cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_tokens: Option<u32>,
    /// Prompt tokens served from the vendor's prompt cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u32>,
    /// Completion tokens spent on reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    /// Original vendor usage object, including sub-counts with no canonical field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<VendorRaw>,
}

impl Usage {
    /// Usage from prompt and completion counts
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
            cache_creation_tokens: None,
            cache_read_tokens: None,
            reasoning_tokens: None,
            raw: None,
        }
    }
}

/// Error reported by the vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable message
    pub message: String,
    /// Vendor error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Original vendor error object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<VendorRaw>,
}

impl ErrorDetail {
    /// Error with a type and message only
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            code: None,
            raw: None,
        }
    }
}

/// A single completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice
    pub index: u32,
    /// Generated message
    pub message: Message,
    /// Why generation stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// The vendor's own stop reason string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_finish_reason: Option<String>,
}

/// Vendor-agnostic completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseContract {
    /// Vendor the response was received from
    pub source: Vendor,
    /// Unique response identifier
    pub id: String,
    /// Model used for generation
    pub model: String,
    /// Unix timestamp of creation, when the vendor reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Error, when the vendor answered with one instead of choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    /// Vendor fields with no canonical slot
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

impl ResponseContract {
    /// Response carrying only an error
    pub fn failure(source: Vendor, error: ErrorDetail) -> Self {
        Self {
            source,
            id: String::new(),
            model: String::new(),
            created: None,
            choices: Vec::new(),
            usage: None,
            error: Some(error),
            extras: Extras::new(),
        }
    }

    /// Whether the vendor reported success
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
