//! Canonical contract types
//!
//! Vendor-agnostic request, response and streaming-event schemas that every
//! wire format converts to and from. Pure data: behavior lives in `convert`.

pub mod extras;
pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;
pub mod vendor;

pub use extras::{Extensions, Extras, Opaque, VendorExtras, VendorRaw};
pub use message::{
    ContentPart, DocumentPart, FunctionCall, MediaPart, MediaSource, Message, OtherPart, RedactedThinkingPart, Role,
    SearchResultPart, TextPart, ThinkingPart, ToolCall, ToolOutput, ToolResult, ToolResultPart, ToolUsePart,
    WebSearchResultPart, flatten_text,
};
pub use request::{ReasoningConfig, RequestContract, RequestInput, SamplingParams, SystemPrompt};
pub use response::{Choice, ErrorDetail, FinishReason, ResponseContract, Usage};
pub use stream::{
    BlockKind, ContentBlock, DeltaContent, DeltaType, MessageDelta, MessageStart, StreamDelta, StreamEvent,
    StreamEventType, StreamPayload, UNSET_INDEX,
};
pub use tool::{
    FunctionDefinition, PassthroughTool, ToolChoice, ToolChoiceFunction, ToolChoiceFunctionName, ToolChoiceMode,
    ToolDefinition,
};
pub use vendor::Vendor;
