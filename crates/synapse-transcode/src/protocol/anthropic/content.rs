//! Content blocks shared by requests, responses and stream events

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content block in a message, a system prompt, or a stream start
///
/// Blocks whose `type` is not listed here (or that do not match their
/// declared shape) decode into `Unknown` and re-encode unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text
    Text(TextBlock),
    /// Image input
    Image(ImageBlock),
    /// Document input
    Document(DocumentBlock),
    /// Client tool invocation
    ToolUse(ToolUseBlock),
    /// Client tool result
    ToolResult(ToolResultBlock),
    /// Extended thinking
    Thinking(ThinkingBlock),
    /// Encrypted extended thinking
    RedactedThinking(RedactedThinkingBlock),
    /// Tool executed by Anthropic (web search, code execution)
    ServerToolUse(ToolUseBlock),
    /// Web search results
    WebSearchToolResult(WebSearchToolResultBlock),
    /// Search result supplied for grounding
    SearchResult(SearchResultBlock),
    /// Any other block, verbatim
    #[serde(untagged)]
    Unknown(Value),
}

impl ContentBlock {
    /// Text block without citations or cache control
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock {
            text: text.into(),
            citations: None,
            cache_control: None,
        })
    }

    /// Wire `type` tag
    pub fn kind(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Document(_) => "document",
            Self::ToolUse(_) => "tool_use",
            Self::ToolResult(_) => "tool_result",
            Self::Thinking(_) => "thinking",
            Self::RedactedThinking(_) => "redacted_thinking",
            Self::ServerToolUse(_) => "server_tool_use",
            Self::WebSearchToolResult(_) => "web_search_tool_result",
            Self::SearchResult(_) => "search_result",
            Self::Unknown(value) => value.get("type").and_then(Value::as_str).unwrap_or("unknown"),
        }
    }
}

/// Text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// The text
    pub text: String,
    /// Citations backing the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Value>>,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Where image or document bytes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// Inline base64
    Base64 {
        /// MIME type
        media_type: String,
        /// Payload
        data: String,
    },
    /// Remote URL
    Url {
        /// Location
        url: String,
    },
    /// Inline plain text (documents only)
    Text {
        /// MIME type
        media_type: String,
        /// Payload
        data: String,
    },
    /// Uploaded file
    File {
        /// File identifier
        file_id: String,
    },
    /// Nested content blocks (documents only)
    Content {
        /// The blocks
        content: Vec<ContentBlock>,
    },
}

/// Image block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Image bytes
    pub source: Source,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Document block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBlock {
    /// Document bytes
    pub source: Source,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Context about the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Citation configuration (`{"enabled": true}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Value>,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Tool invocation block (client or server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseBlock {
    /// Invocation id (`toolu_...` or `srvtoolu_...`)
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool input
    pub input: Value,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Tool result content, plain or as blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Plain text
    Text(String),
    /// Content blocks
    Blocks(Vec<ContentBlock>),
}

/// Tool result block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    /// Invocation this answers
    pub tool_use_id: String,
    /// Result content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ToolResultContent>,
    /// Whether the tool failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Thinking block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingBlock {
    /// Reasoning text
    pub thinking: String,
    /// Integrity signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Redacted thinking block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedThinkingBlock {
    /// Encrypted payload
    pub data: String,
}

/// Web search results block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchToolResultBlock {
    /// Server tool invocation this answers
    pub tool_use_id: String,
    /// Result list or error object
    pub content: Value,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

/// Search result block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultBlock {
    /// Origin of the result
    pub source: String,
    /// Title
    pub title: String,
    /// Result body (text blocks)
    pub content: Vec<ContentBlock>,
    /// Citation configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Value>,
    /// Prompt caching breakpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_block_decodes_typed() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "tool_use",
            "id": "toolu_123",
            "name": "get_weather",
            "input": {"city": "Paris"}
        }))
        .unwrap();
        let ContentBlock::ToolUse(tool_use) = &block else {
            panic!("expected tool_use, got {block:?}");
        };
        assert_eq!(tool_use.id, "toolu_123");
        assert_eq!(block.kind(), "tool_use");
    }

    #[test]
    fn unknown_block_survives_verbatim() {
        let raw = json!({"type": "container_upload", "file_id": "file_1"});
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block, ContentBlock::Unknown(raw.clone()));
        assert_eq!(block.kind(), "container_upload");
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn malformed_known_block_is_kept_verbatim() {
        let raw = json!({"type": "tool_use", "id": "toolu_1"});
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block, ContentBlock::Unknown(raw));
    }

    #[test]
    fn text_block_round_trip_keeps_cache_control() {
        let raw = json!({"type": "text", "text": "hi", "cache_control": {"type": "ephemeral"}});
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn tool_result_accepts_string_and_blocks() {
        let text: ToolResultBlock = serde_json::from_value(json!({"tool_use_id": "t", "content": "15C"})).unwrap();
        assert_eq!(text.content, Some(ToolResultContent::Text("15C".to_owned())));

        let blocks: ToolResultBlock = serde_json::from_value(json!({
            "tool_use_id": "t",
            "content": [{"type": "text", "text": "15C"}]
        }))
        .unwrap();
        assert_eq!(blocks.content, Some(ToolResultContent::Blocks(vec![ContentBlock::text("15C")])));
    }
}
