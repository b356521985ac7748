use serde::{Deserialize, Serialize};

use super::extras::{Extras, Opaque, VendorRaw};

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool/function result
    Tool,
}

/// Message in a conversation or a generated choice
///
/// `parts` keeps the ordered, typed content fragments. `content` is the
/// flattened text, set when the message is pure text. `tool_calls` and
/// `tool_results` are convenience views over the tool fragments for
/// consumers that do not walk `parts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Flattened plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Ordered content fragments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<ContentPart>,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool results supplied by the user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
    /// Optional participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Vendor fields with no canonical slot
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

impl Message {
    /// Plain text message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(text.into()),
            ..Self::empty(role)
        }
    }

    /// Message with no content at all
    pub fn empty(role: Role) -> Self {
        Self {
            role,
            content: None,
            parts: Vec::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            name: None,
            extras: Extras::new(),
        }
    }

    /// Build a message from ordered parts, deriving the convenience views
    pub fn from_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        let tool_calls = parts.iter().filter_map(ContentPart::as_tool_call).collect();
        let tool_results = parts.iter().filter_map(ContentPart::as_tool_result).collect();
        let content = flatten_text(&parts);

        Self {
            role,
            content,
            parts,
            tool_calls,
            tool_results,
            ..Self::empty(role)
        }
    }

    /// All text in the message, joined
    pub fn text_content(&self) -> String {
        if self.parts.is_empty() {
            return self.content.clone().unwrap_or_default();
        }
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Joined text of `parts`, or `None` unless every part is text
pub fn flatten_text(parts: &[ContentPart]) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    let mut text = String::new();
    for part in parts {
        match part {
            ContentPart::Text(part) => text.push_str(&part.text),
            _ => return None,
        }
    }
    Some(text)
}

/// Typed content fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text
    Text(TextPart),
    /// Image input
    Image(MediaPart),
    /// Document input
    Document(DocumentPart),
    /// Model reasoning
    Thinking(ThinkingPart),
    /// Encrypted model reasoning
    RedactedThinking(RedactedThinkingPart),
    /// Client tool invocation
    ToolUse(ToolUsePart),
    /// Result of a client tool invocation
    ToolResult(ToolResultPart),
    /// Tool executed by the vendor itself
    ServerToolUse(ToolUsePart),
    /// Result of a vendor-executed web search
    WebSearchResult(WebSearchResultPart),
    /// Search result supplied as input
    SearchResult(SearchResultPart),
    /// Fragment of a kind the canonical schema does not know
    Other(OtherPart),
}

impl ContentPart {
    /// Plain text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart {
            text: text.into(),
            extras: Extras::new(),
        })
    }

    /// Canonical tool call for a client tool-use part
    pub fn as_tool_call(&self) -> Option<ToolCall> {
        match self {
            Self::ToolUse(tool_use) => Some(ToolCall::new(
                tool_use.id.clone(),
                tool_use.name.clone(),
                tool_use.input.as_str().to_owned(),
            )),
            _ => None,
        }
    }

    /// Canonical tool result for a tool-result part
    pub fn as_tool_result(&self) -> Option<ToolResult> {
        match self {
            Self::ToolResult(result) => Some(ToolResult {
                tool_call_id: result.tool_use_id.clone(),
                content: result.content().as_text(),
                is_error: result.is_error,
            }),
            _ => None,
        }
    }

    /// Vendor fields attached to this part
    pub fn extras(&self) -> Option<&Extras> {
        match self {
            Self::Text(p) => Some(&p.extras),
            Self::Image(p) => Some(&p.extras),
            Self::Document(p) => Some(&p.extras),
            Self::Thinking(p) => Some(&p.extras),
            Self::RedactedThinking(p) => Some(&p.extras),
            Self::ToolUse(p) | Self::ServerToolUse(p) => Some(&p.extras),
            Self::ToolResult(p) => Some(&p.extras),
            Self::WebSearchResult(p) => Some(&p.extras),
            Self::SearchResult(p) => Some(&p.extras),
            Self::Other(_) => None,
        }
    }
}

/// Text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text
    pub text: String,
    /// Vendor fields (citations, cache control)
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Where an image or document's bytes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    /// Inline base64 data
    Base64 {
        /// MIME type
        media_type: String,
        /// Base64 payload
        data: String,
    },
    /// Remote URL
    Url {
        /// Location
        url: String,
    },
    /// Inline plain text
    Text {
        /// MIME type
        media_type: String,
        /// Text payload
        data: String,
    },
    /// Previously uploaded file
    File {
        /// Vendor file identifier
        file_id: String,
    },
    /// Nested content fragments
    Content {
        /// The fragments
        parts: Vec<ContentPart>,
    },
}

impl MediaSource {
    /// Parse a `data:` URI into a base64 source, anything else into a URL source
    pub fn from_url(url: &str) -> Self {
        if let Some(rest) = url.strip_prefix("data:")
            && let Some((mime_and_encoding, data)) = rest.split_once(',')
        {
            let media_type = mime_and_encoding.strip_suffix(";base64").unwrap_or(mime_and_encoding);
            return Self::Base64 {
                media_type: media_type.to_owned(),
                data: data.to_owned(),
            };
        }
        Self::Url { url: url.to_owned() }
    }

    /// URL form of the source, if it has one
    pub fn to_url(&self) -> Option<String> {
        match self {
            Self::Base64 { media_type, data } => Some(format!("data:{media_type};base64,{data}")),
            Self::Url { url } => Some(url.clone()),
            Self::Text { .. } | Self::File { .. } | Self::Content { .. } => None,
        }
    }
}

/// Image fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPart {
    /// Image bytes
    pub source: MediaSource,
    /// Vendor fields (detail level, cache control)
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Document fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPart {
    /// Document bytes
    pub source: MediaSource,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form context about the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Vendor fields (citation config, cache control)
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Reasoning fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPart {
    /// Reasoning text
    pub thinking: String,
    /// Integrity signature over the reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Encrypted reasoning fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactedThinkingPart {
    /// Opaque encrypted payload
    pub data: String,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Tool invocation fragment (client or server side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUsePart {
    /// Invocation identifier
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool input as JSON
    pub input: Opaque,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Tool output, either plain text or nested fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// Plain text
    Text(String),
    /// Nested fragments
    Parts(Vec<ContentPart>),
}

impl ToolOutput {
    /// Flatten the output to text
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Tool result fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultPart {
    /// Invocation this result answers
    pub tool_use_id: String,
    /// Output, absent when the tool produced nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ToolOutput>,
    /// Whether the tool failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

impl ToolResultPart {
    /// Output as a value that always exists
    pub fn content(&self) -> ToolOutput {
        self.output.clone().unwrap_or_else(|| ToolOutput::Text(String::new()))
    }
}

/// Web search results produced by a server tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResultPart {
    /// Server tool invocation this answers
    pub tool_use_id: String,
    /// Results (or an error object) as the vendor returned them
    pub content: Opaque,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Search result supplied as input for grounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPart {
    /// Where the result came from
    pub source: String,
    /// Result title
    pub title: String,
    /// Result body
    pub content: Vec<ContentPart>,
    /// Vendor fields
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

/// Fragment of an unrecognized kind, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPart {
    /// Vendor tag of the fragment
    pub kind: String,
    /// The original fragment
    pub raw: VendorRaw,
}

/// A tool/function call requested by the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Build a tool call from raw parts
    pub fn new(id: String, name: String, arguments: String) -> Self {
        Self {
            id,
            function: FunctionCall { name, arguments },
        }
    }
}

/// Function name and arguments within a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result responds to
    pub tool_call_id: String,
    /// Output content from the tool, flattened to text
    pub content: String,
    /// Whether the tool failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}
