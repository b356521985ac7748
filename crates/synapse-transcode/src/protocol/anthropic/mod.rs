//! Anthropic Messages API wire format types

pub mod content;
pub mod request;
pub mod response;
pub mod stream;

pub use content::{
    ContentBlock, DocumentBlock, ImageBlock, RedactedThinkingBlock, SearchResultBlock, Source, TextBlock,
    ThinkingBlock, ToolResultBlock, ToolResultContent, ToolUseBlock, WebSearchToolResultBlock,
};
pub use request::{
    CustomTool, InputMessage, MessageContent, MessageRole, MessagesRequest, SystemPrompt, ThinkingConfig, Tool,
    ToolChoice,
};
pub use response::{ApiError, ErrorResponse, MessagesResponse, Usage};
pub use stream::{ContentDelta, EVENT_TYPES, MessageDeltaBody, StreamEvent, parse_stream_event};
