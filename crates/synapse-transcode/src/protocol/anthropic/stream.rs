//! Server-sent stream events

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::ContentBlock;
use super::response::{ApiError, MessagesResponse, Usage};
use crate::error::TranscodeError;

/// Every `type` a stream event may carry
pub const EVENT_TYPES: [&str; 8] = [
    "message_start",
    "message_delta",
    "message_stop",
    "content_block_start",
    "content_block_delta",
    "content_block_stop",
    "ping",
    "error",
];

/// One SSE `data:` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Stream opened; carries the message shell
    MessageStart {
        /// Message with empty content and null stop reason
        message: MessagesResponse,
    },
    /// A content block opened
    ContentBlockStart {
        /// Block position
        index: u32,
        /// Initial block content
        content_block: ContentBlock,
    },
    /// Incremental content within a block
    ContentBlockDelta {
        /// Block position
        index: u32,
        /// What changed
        delta: ContentDelta,
    },
    /// A content block closed
    ContentBlockStop {
        /// Block position
        index: u32,
    },
    /// Message-level update (stop reason, usage)
    MessageDelta {
        /// Stop fields
        delta: MessageDeltaBody,
        /// Cumulative usage
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    /// Stream finished
    MessageStop,
    /// Keep-alive
    Ping,
    /// Error mid-stream
    Error {
        /// What went wrong
        error: ApiError,
    },
}

impl StreamEvent {
    /// SSE `event:` name
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentBlockStart { .. } => "content_block_start",
            Self::ContentBlockDelta { .. } => "content_block_delta",
            Self::ContentBlockStop { .. } => "content_block_stop",
            Self::MessageDelta { .. } => "message_delta",
            Self::MessageStop => "message_stop",
            Self::Ping => "ping",
            Self::Error { .. } => "error",
        }
    }
}

/// Parse one stream event, rejecting unknown event types
pub fn parse_stream_event(value: Value) -> Result<StreamEvent, TranscodeError> {
    let Some(event_type) = value.get("type").and_then(Value::as_str) else {
        return Err(TranscodeError::invalid("stream event has no type"));
    };
    if !EVENT_TYPES.contains(&event_type) {
        return Err(TranscodeError::invalid(format!("unknown stream event type: {event_type}")));
    }
    let event_type = event_type.to_owned();
    serde_json::from_value(value)
        .map_err(|e| TranscodeError::invalid(format!("malformed {event_type} event: {e}")))
}

/// Incremental block update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    /// Text fragment
    TextDelta {
        /// Fragment
        text: String,
    },
    /// Tool input JSON fragment
    InputJsonDelta {
        /// Fragment
        partial_json: String,
    },
    /// Thinking fragment
    ThinkingDelta {
        /// Fragment
        thinking: String,
    },
    /// Thinking signature
    SignatureDelta {
        /// Signature
        signature: String,
    },
    /// Citation for the block's text
    CitationsDelta {
        /// Citation location object
        citation: Value,
    },
    /// Any other delta, verbatim
    #[serde(untagged)]
    Unknown(Value),
}

/// Stop fields of a `message_delta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeltaBody {
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence that ended generation
    #[serde(default)]
    pub stop_sequence: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_event_type_is_invalid_argument() {
        let err = parse_stream_event(json!({"type": "message_pause"})).unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidArgument(_)));

        let err = parse_stream_event(json!({"index": 0})).unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidArgument(_)));
    }

    #[test]
    fn parses_tool_use_start() {
        let event = parse_stream_event(json!({
            "type": "content_block_start",
            "index": 2,
            "content_block": {"type": "tool_use", "id": "toolu_123", "name": "get_weather", "input": {}}
        }))
        .unwrap();
        let StreamEvent::ContentBlockStart { index, content_block } = &event else {
            panic!("expected content_block_start");
        };
        assert_eq!(*index, 2);
        assert_eq!(content_block.kind(), "tool_use");
        assert_eq!(event.event_name(), "content_block_start");
    }

    #[test]
    fn unknown_delta_is_kept() {
        let raw = json!({"type": "compaction_delta", "content": "x"});
        let delta: ContentDelta = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(delta, ContentDelta::Unknown(raw));
    }

    #[test]
    fn message_delta_writes_both_stop_fields() {
        let event = StreamEvent::MessageDelta {
            delta: MessageDeltaBody {
                stop_reason: Some("end_turn".to_owned()),
                stop_sequence: None,
            },
            usage: None,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "message_delta", "delta": {"stop_reason": "end_turn", "stop_sequence": null}})
        );
    }
}
