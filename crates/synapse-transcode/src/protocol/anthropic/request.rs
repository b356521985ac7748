//! Messages API request

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::content::{ContentBlock, TextBlock};

/// Messages API request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Conversation turns
    pub messages: Vec<InputMessage>,
    /// System prompt (top-level, not in messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,
    /// Request metadata (`user_id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Tool selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Extended thinking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
    /// Capacity tier (`auto`, `standard_only`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    /// Fields this schema does not model (`container`, `mcp_servers`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// System prompt, plain or as text blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Plain text
    Text(String),
    /// Text blocks, possibly with cache control
    Blocks(Vec<TextBlock>),
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Author
    pub role: MessageRole,
    /// Content
    pub content: MessageContent,
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Human turn (also carries tool results)
    User,
    /// Model turn
    Assistant,
}

/// Message content, shorthand string or block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text shorthand
    Text(String),
    /// Content blocks
    Blocks(Vec<ContentBlock>),
}

/// Tool definition
///
/// Custom tools have no `type` (or `"custom"`); every other `type` names a
/// built-in tool (`bash_20250124`, `web_search_20250305`, ...) whose shape is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Client-defined function tool
    Custom(CustomTool),
    /// Anthropic-defined tool
    Builtin(Value),
}

impl Tool {
    /// Wire `type` tag, `custom` for client tools without one
    pub fn kind(&self) -> &str {
        match self {
            Self::Custom(tool) => tool.tool_type.as_deref().unwrap_or("custom"),
            Self::Builtin(value) => value.get("type").and_then(Value::as_str).unwrap_or("custom"),
        }
    }
}

impl Serialize for Tool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Custom(tool) => tool.serialize(serializer),
            Self::Builtin(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Tool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value.get("type").and_then(Value::as_str) {
            None | Some("custom") => CustomTool::deserialize(value)
                .map(Self::Custom)
                .map_err(serde::de::Error::custom),
            Some(_) => Ok(Self::Builtin(value)),
        }
    }
}

/// Client-defined function tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTool {
    /// Explicit `"custom"` tag, when the client sent one
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Tool name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the input
    pub input_schema: Value,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Tool selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides
    Auto {
        /// Limit to one tool call per turn
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
    /// Model must use some tool
    Any {
        /// Limit to one tool call per turn
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
    /// Model must use the named tool
    Tool {
        /// Tool name
        name: String,
        /// Limit to one tool call per turn
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
    /// Model must not use tools
    None,
}

impl ToolChoice {
    /// The `disable_parallel_tool_use` flag, if set
    pub const fn disable_parallel_tool_use(&self) -> Option<bool> {
        match self {
            Self::Auto {
                disable_parallel_tool_use,
            }
            | Self::Any {
                disable_parallel_tool_use,
            }
            | Self::Tool {
                disable_parallel_tool_use,
                ..
            } => *disable_parallel_tool_use,
            Self::None => None,
        }
    }
}

/// Extended thinking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// `enabled` or `disabled`
    #[serde(rename = "type")]
    pub thinking_type: String,
    /// Token budget when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builtin_tools_are_kept_verbatim() {
        let raw = json!({"type": "bash_20250124", "name": "bash"});
        let tool: Tool = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(tool, Tool::Builtin(raw.clone()));
        assert_eq!(tool.kind(), "bash_20250124");
        assert_eq!(serde_json::to_value(&tool).unwrap(), raw);
    }

    #[test]
    fn untyped_tool_is_custom() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "get_weather",
            "input_schema": {"type": "object"}
        }))
        .unwrap();
        let Tool::Custom(custom) = tool else {
            panic!("expected custom tool");
        };
        assert_eq!(custom.name, "get_weather");
        assert_eq!(custom.tool_type, None);
    }

    #[test]
    fn unmodelled_fields_are_collected() {
        let request: MessagesRequest = serde_json::from_value(json!({
            "model": "claude-sonnet-4-5",
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": "Hello"}],
            "container": "container_1"
        }))
        .unwrap();
        assert_eq!(request.extra.get("container"), Some(&json!("container_1")));
        assert_eq!(request.messages[0].content, MessageContent::Text("Hello".to_owned()));
    }

    #[test]
    fn unknown_tool_choice_is_rejected() {
        let result: Result<ToolChoice, _> = serde_json::from_value(json!({"type": "sometimes"}));
        assert!(result.is_err());
    }
}
