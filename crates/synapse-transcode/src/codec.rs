//! Vendor codec registry
//!
//! A [`Codec`] bundles the six conversions of one wire format behind an
//! object-safe trait, so callers holding only a [`Vendor`] can translate
//! between any pair of formats through the canonical contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use synapse_config::TranscodeConfig;

use crate::convert::{anthropic, openai};
use crate::error::TranscodeError;
use crate::protocol::anthropic::{ErrorResponse, MessagesRequest, MessagesResponse, parse_stream_event};
use crate::protocol::decode;
use crate::protocol::openai::{DONE, OpenAiErrorResponse, OpenAiRequest, OpenAiResponse};
use crate::stream_context::StreamIndexContext;
use crate::types::{RequestContract, ResponseContract, StreamEvent, Vendor};

/// One server-sent event frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` field, omitted when `None`
    pub event: Option<String>,
    /// `data:` field
    pub data: String,
}

impl SseFrame {
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }

    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
        }
    }
}

impl fmt::Display for SseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(event) = &self.event {
            writeln!(f, "event: {event}")?;
        }
        for line in self.data.lines() {
            writeln!(f, "data: {line}")?;
        }
        writeln!(f)
    }
}

/// Outbound stream state
///
/// Some wire formats repeat message-level fields on every frame, number
/// tool calls on their own or require explicit block boundaries; the encoder
/// remembers what it needs here for the life of one stream.
#[derive(Debug, Default)]
pub struct EncodeState {
    pub(crate) model: Option<String>,
    pub(crate) created: Option<u64>,
    pub(crate) open_block: Option<u32>,
    tool_calls: HashMap<String, u32>,
}

impl EncodeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the tool call owning `item_id`, allocated in first-seen order
    pub(crate) fn tool_index(&mut self, item_id: &str) -> u32 {
        let next = u32::try_from(self.tool_calls.len()).unwrap_or(u32::MAX);
        *self.tool_calls.entry(item_id.to_owned()).or_insert(next)
    }
}

/// Conversions between one vendor wire format and the canonical contract
pub trait Codec: Send + Sync {
    /// Wire format this codec speaks
    fn vendor(&self) -> Vendor;

    /// Vendor request body -> canonical request
    fn decode_request(&self, body: Value) -> Result<RequestContract, TranscodeError>;

    /// Canonical request -> vendor request body
    fn encode_request(&self, contract: &RequestContract) -> Result<Value, TranscodeError>;

    /// Vendor response or error body -> canonical response
    fn decode_response(&self, body: Value) -> Result<ResponseContract, TranscodeError>;

    /// Canonical response -> vendor response or error body
    fn encode_response(&self, contract: &ResponseContract) -> Result<Value, TranscodeError>;

    /// One SSE `data:` payload -> repaired canonical events
    fn decode_stream_event(
        &self,
        data: &str,
        ctx: &mut StreamIndexContext,
    ) -> Result<Vec<StreamEvent>, TranscodeError>;

    /// One canonical event -> zero or more vendor SSE frames
    fn encode_stream_event(&self, event: &StreamEvent, state: &mut EncodeState)
    -> Result<Vec<SseFrame>, TranscodeError>;
}

/// Anthropic Messages API codec
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicCodec {
    config: TranscodeConfig,
}

impl AnthropicCodec {
    pub const fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }
}

impl Codec for AnthropicCodec {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    fn decode_request(&self, body: Value) -> Result<RequestContract, TranscodeError> {
        let request: MessagesRequest = decode("messages request", body)?;
        Ok(anthropic::request::request_to_contract(request, &self.config))
    }

    fn encode_request(&self, contract: &RequestContract) -> Result<Value, TranscodeError> {
        Ok(serde_json::to_value(anthropic::request::request_from_contract(
            contract,
            &self.config,
        ))?)
    }

    fn decode_response(&self, body: Value) -> Result<ResponseContract, TranscodeError> {
        if body.get("type").and_then(Value::as_str) == Some("error") {
            let error: ErrorResponse = decode("error response", body.clone())?;
            return Ok(anthropic::response::error_to_contract(error, &body, &self.config));
        }
        let response: MessagesResponse = decode("messages response", body.clone())?;
        Ok(anthropic::response::response_to_contract(response, &body, &self.config))
    }

    fn encode_response(&self, contract: &ResponseContract) -> Result<Value, TranscodeError> {
        Ok(serde_json::to_value(anthropic::response::response_from_contract(contract))?)
    }

    fn decode_stream_event(
        &self,
        data: &str,
        ctx: &mut StreamIndexContext,
    ) -> Result<Vec<StreamEvent>, TranscodeError> {
        let data = data.trim();
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value =
            serde_json::from_str(data).map_err(|e| TranscodeError::invalid(format!("malformed stream event: {e}")))?;
        let event = parse_stream_event(value.clone())?;
        Ok(vec![anthropic::stream::stream_event_to_contract(
            event,
            &value,
            ctx,
            &self.config,
        )])
    }

    fn encode_stream_event(
        &self,
        event: &StreamEvent,
        state: &mut EncodeState,
    ) -> Result<Vec<SseFrame>, TranscodeError> {
        anthropic::stream::stream_events_from_contract(event, state)?
            .into_iter()
            .map(|wire| Ok(SseFrame::named(wire.name, serde_json::to_string(&wire.data)?)))
            .collect()
    }
}

/// `OpenAI` Chat Completions API codec
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiCodec {
    config: TranscodeConfig,
}

impl OpenAiCodec {
    pub const fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }
}

impl Codec for OpenAiCodec {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAi
    }

    fn decode_request(&self, body: Value) -> Result<RequestContract, TranscodeError> {
        let request: OpenAiRequest = decode("chat completion request", body)?;
        Ok(openai::request::request_to_contract(request, &self.config))
    }

    fn encode_request(&self, contract: &RequestContract) -> Result<Value, TranscodeError> {
        Ok(serde_json::to_value(openai::request::request_from_contract(contract))?)
    }

    fn decode_response(&self, body: Value) -> Result<ResponseContract, TranscodeError> {
        if body.get("error").is_some() && body.get("choices").is_none() {
            let error: OpenAiErrorResponse = decode("error response", body)?;
            return Ok(openai::response::error_to_contract(error, &self.config));
        }
        let response: OpenAiResponse = decode("chat completion", body)?;
        Ok(openai::response::response_to_contract(response, &self.config))
    }

    fn encode_response(&self, contract: &ResponseContract) -> Result<Value, TranscodeError> {
        Ok(serde_json::to_value(openai::response::response_from_contract(contract))?)
    }

    fn decode_stream_event(
        &self,
        data: &str,
        ctx: &mut StreamIndexContext,
    ) -> Result<Vec<StreamEvent>, TranscodeError> {
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        openai::stream::stream_data_to_contract(data, ctx, &self.config)
    }

    fn encode_stream_event(
        &self,
        event: &StreamEvent,
        state: &mut EncodeState,
    ) -> Result<Vec<SseFrame>, TranscodeError> {
        let frame = match openai::stream::stream_event_from_contract(event, state)? {
            None => return Ok(Vec::new()),
            Some(openai::stream::ChunkFrame::Chunk(chunk)) => SseFrame::data(serde_json::to_string(&chunk)?),
            Some(openai::stream::ChunkFrame::Error(error)) => SseFrame::data(serde_json::to_string(&error)?),
            Some(openai::stream::ChunkFrame::Done) => SseFrame::data(DONE),
        };
        Ok(vec![frame])
    }
}

/// Codec for every supported vendor
#[derive(Clone)]
pub struct Codecs {
    anthropic: Arc<dyn Codec>,
    openai: Arc<dyn Codec>,
}

impl Codecs {
    pub fn new(config: TranscodeConfig) -> Self {
        Self {
            anthropic: Arc::new(AnthropicCodec::new(config)),
            openai: Arc::new(OpenAiCodec::new(config)),
        }
    }

    /// Codec for `vendor`
    pub fn get(&self, vendor: Vendor) -> Arc<dyn Codec> {
        match vendor {
            Vendor::Anthropic => Arc::clone(&self.anthropic),
            Vendor::OpenAi => Arc::clone(&self.openai),
        }
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::new(TranscodeConfig::default())
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codecs")
            .field("anthropic", &self.anthropic.vendor())
            .field("openai", &self.openai.vendor())
            .finish()
    }
}
