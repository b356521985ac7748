use serde::{Deserialize, Serialize};

use super::extras::{Extensions, Opaque, VendorRaw};
use super::message::{ContentPart, Message};
use super::response::{ErrorDetail, FinishReason, Usage};
use super::vendor::Vendor;

/// Reserved value for an output/content/annotation index nobody supplied
///
/// Distinct from 0, which is a legitimate index. Index repair replaces it
/// before an event reaches a consumer.
pub const UNSET_INDEX: i64 = -1;

/// Kind of a canonical stream event
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreamEventType {
    /// A new message begins
    MessageStart,
    /// Message-level metadata changed (stop reason, usage)
    MessageDelta,
    /// The message is complete
    MessageStop,
    /// A new content block begins
    ContentBlockStart,
    /// Incremental content within a block
    ContentBlockDelta,
    /// A content block is complete
    ContentBlockStop,
    /// Keep-alive
    Ping,
    /// The vendor (or the converter) reported an error
    Error,
}

impl StreamEventType {
    /// Whether the event addresses a content block rather than the message
    pub const fn is_content_block(self) -> bool {
        matches!(self, Self::ContentBlockStart | Self::ContentBlockDelta | Self::ContentBlockStop)
    }
}

/// Classification of a content block at its start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockKind {
    /// Text
    Text,
    /// Client tool invocation
    ToolUse,
    /// Reasoning
    Thinking,
    /// Encrypted reasoning
    RedactedThinking,
    /// Vendor-executed tool invocation
    ServerToolUse,
    /// Vendor web search results
    WebSearchToolResult,
    /// Anything else
    Other,
}

/// Payload of a `content_block_start` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block classification
    pub kind: BlockKind,
    /// Canonical form of the block's initial content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<ContentPart>,
    /// The original vendor block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<VendorRaw>,
}

/// Classification of an incremental content update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeltaType {
    /// Text fragment
    Text,
    /// Tool input JSON fragment
    InputJson,
    /// Reasoning fragment
    Thinking,
    /// Reasoning signature
    Signature,
    /// Citation attached to text
    Citations,
    /// Anything else
    Other,
}

/// The single field an incremental update changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaContent {
    /// Text fragment
    Text {
        /// Fragment
        text: String,
    },
    /// Tool input JSON fragment
    InputJson {
        /// Fragment, not valid JSON on its own
        partial_json: String,
    },
    /// Reasoning fragment
    Thinking {
        /// Fragment
        thinking: String,
    },
    /// Reasoning signature
    Signature {
        /// Signature
        signature: String,
    },
    /// Citation attached to the block's text
    Citations {
        /// Citation as the vendor expressed it
        citation: Opaque,
    },
    /// Unrecognized update
    Other {
        /// Vendor tag
        kind: String,
    },
}

impl DeltaContent {
    /// Classification of the update
    pub const fn delta_type(&self) -> DeltaType {
        match self {
            Self::Text { .. } => DeltaType::Text,
            Self::InputJson { .. } => DeltaType::InputJson,
            Self::Thinking { .. } => DeltaType::Thinking,
            Self::Signature { .. } => DeltaType::Signature,
            Self::Citations { .. } => DeltaType::Citations,
            Self::Other { .. } => DeltaType::Other,
        }
    }
}

/// Payload of a `content_block_delta` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    /// What changed
    pub content: DeltaContent,
    /// The original vendor delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<VendorRaw>,
}

impl StreamDelta {
    /// Classification of the update
    pub const fn delta_type(&self) -> DeltaType {
        self.content.delta_type()
    }
}

/// Payload of a `message_start` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStart {
    /// Model generating the message
    pub model: String,
    /// Initial message content (role, parts, tool calls)
    pub message: Message,
    /// Usage known at start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Payload of a `message_delta` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDelta {
    /// Canonical stop reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// The vendor's own stop reason string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_finish_reason: Option<String>,
    /// Stop sequence that ended generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
    /// Cumulative usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// The original vendor delta object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<VendorRaw>,
}

/// Event-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPayload {
    /// Carried by `message_start`
    Message(MessageStart),
    /// Carried by `content_block_start`
    Content(ContentBlock),
    /// Carried by `content_block_delta`
    Delta(StreamDelta),
    /// Carried by `message_delta`
    MessageDelta(MessageDelta),
    /// Carried by `error`
    Error(ErrorDetail),
}

/// Vendor-agnostic streaming event
///
/// Every event carries a full addressing tuple once index repair has run:
/// a strictly increasing `sequence_number`, and output/content indices that
/// never hold [`UNSET_INDEX`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event kind
    #[serde(rename = "type")]
    pub event_type: StreamEventType,
    /// Response the event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Message the event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Output item (content block) the event addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Position in the session, starting at 1; 0 means not yet assigned
    #[serde(default)]
    pub sequence_number: u64,
    /// Output item position
    #[serde(default = "unset_index")]
    pub output_index: i64,
    /// Content block position within the output item
    #[serde(default = "unset_index")]
    pub content_index: i64,
    /// Annotation position, for citation updates
    #[serde(default = "unset_index")]
    pub annotation_index: i64,
    /// Event-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StreamPayload>,
    /// Vendor the event was converted from
    pub source: Vendor,
    /// Per-vendor extension bags
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

const fn unset_index() -> i64 {
    UNSET_INDEX
}

impl StreamEvent {
    /// Event with no identifiers, unset indices and no payload
    pub fn new(event_type: StreamEventType, source: Vendor) -> Self {
        Self {
            event_type,
            response_id: None,
            message_id: None,
            item_id: None,
            sequence_number: 0,
            output_index: UNSET_INDEX,
            content_index: UNSET_INDEX,
            annotation_index: UNSET_INDEX,
            payload: None,
            source,
            extensions: Extensions::default(),
        }
    }

    /// Attach a payload
    #[must_use]
    pub fn with_payload(mut self, payload: StreamPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// `message_start` payload
    pub const fn message(&self) -> Option<&MessageStart> {
        match &self.payload {
            Some(StreamPayload::Message(message)) => Some(message),
            _ => None,
        }
    }

    /// `content_block_start` payload
    pub const fn content(&self) -> Option<&ContentBlock> {
        match &self.payload {
            Some(StreamPayload::Content(content)) => Some(content),
            _ => None,
        }
    }

    /// `content_block_delta` payload
    pub const fn delta(&self) -> Option<&StreamDelta> {
        match &self.payload {
            Some(StreamPayload::Delta(delta)) => Some(delta),
            _ => None,
        }
    }

    /// `message_delta` payload
    pub const fn message_delta(&self) -> Option<&MessageDelta> {
        match &self.payload {
            Some(StreamPayload::MessageDelta(delta)) => Some(delta),
            _ => None,
        }
    }

    /// `error` payload
    pub const fn error(&self) -> Option<&ErrorDetail> {
        match &self.payload {
            Some(StreamPayload::Error(error)) => Some(error),
            _ => None,
        }
    }
}
