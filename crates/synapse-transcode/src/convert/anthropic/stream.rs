//! Stream event conversion
//!
//! One wire event maps to exactly one canonical event and back. Inbound
//! events are repaired against the stream's index context before they leave,
//! and capture the JSON objects they were decoded from. Outbound events are
//! rebuilt, then any captured Anthropic objects are written over the rebuild
//! verbatim, so fields the wire types do not model survive a round trip.

use std::collections::BTreeMap;

use serde_json::Value;
use synapse_config::TranscodeConfig;

use super::content::{block_to_part, blocks_to_parts, part_to_block, parts_to_blocks};
use super::finish::{finish_reason, stop_reason};
use super::response::{capture, error_from_canonical, error_to_canonical, usage_from_canonical, usage_to_canonical};
use crate::codec::EncodeState;
use crate::error::TranscodeError;
use crate::protocol::anthropic::{
    ContentBlock as WireBlock, ContentDelta, MessageDeltaBody, MessagesResponse, StreamEvent as WireEvent,
    ThinkingBlock,
};
use crate::repair::repair;
use crate::stream_context::StreamIndexContext;
use crate::types::{
    BlockKind, ContentBlock, DeltaContent, Extras, Message, MessageDelta, MessageStart, Opaque, Role, StreamDelta,
    StreamEvent, StreamEventType, StreamPayload, Vendor, VendorRaw,
};

/// `extensions` key of the original `message_start` message
///
/// Anthropic `extensions` keys are top-level event fields, written back
/// verbatim on the way out.
pub const MESSAGE: &str = "message";

const CONTENT_BLOCK: &str = "content_block";
const DELTA: &str = "delta";
const USAGE: &str = "usage";
const ERROR: &str = "error";

/// Top-level event fields the wire types model
const EVENT_FIELDS: [&str; 7] = ["type", "index", MESSAGE, CONTENT_BLOCK, DELTA, USAGE, ERROR];

/// One outbound Anthropic event
#[derive(Debug, Clone, PartialEq)]
pub struct WirePayload {
    /// SSE `event:` name
    pub name: &'static str,
    /// SSE `data:` body
    pub data: Value,
}

// -- Inbound: Anthropic -> canonical --

/// Convert a parsed event; `original` is the JSON it was parsed from
pub fn stream_event_to_contract(
    event: WireEvent,
    original: &Value,
    ctx: &mut StreamIndexContext,
    config: &TranscodeConfig,
) -> StreamEvent {
    let captured = |field: &str| original.get(field).and_then(|value| capture(config, value));
    let mut out = match event {
        WireEvent::MessageStart { message } => message_start(message, original.get(MESSAGE), config),
        WireEvent::ContentBlockStart { index, content_block } => {
            let kind = block_kind(&content_block);
            let raw = captured(CONTENT_BLOCK);
            let mut out = StreamEvent::new(StreamEventType::ContentBlockStart, Vendor::Anthropic).with_payload(
                StreamPayload::Content(ContentBlock {
                    kind,
                    part: block_to_part(content_block, config),
                    raw,
                }),
            );
            out.content_index = i64::from(index);
            out
        }
        WireEvent::ContentBlockDelta { index, delta } => {
            let raw = captured(DELTA);
            let mut out = StreamEvent::new(StreamEventType::ContentBlockDelta, Vendor::Anthropic).with_payload(
                StreamPayload::Delta(StreamDelta {
                    content: delta_to_canonical(delta),
                    raw,
                }),
            );
            out.content_index = i64::from(index);
            out
        }
        WireEvent::ContentBlockStop { index } => {
            let mut out = StreamEvent::new(StreamEventType::ContentBlockStop, Vendor::Anthropic);
            out.content_index = i64::from(index);
            out
        }
        WireEvent::MessageDelta { delta, usage } => {
            let raw = captured(DELTA);
            StreamEvent::new(StreamEventType::MessageDelta, Vendor::Anthropic).with_payload(
                StreamPayload::MessageDelta(MessageDelta {
                    finish_reason: delta.stop_reason.as_deref().map(finish_reason),
                    native_finish_reason: delta.stop_reason,
                    stop_sequence: delta.stop_sequence,
                    usage: usage
                        .as_ref()
                        .map(|usage| usage_to_canonical(usage, original.get(USAGE), config)),
                    raw,
                }),
            )
        }
        WireEvent::MessageStop => StreamEvent::new(StreamEventType::MessageStop, Vendor::Anthropic),
        WireEvent::Ping => StreamEvent::new(StreamEventType::Ping, Vendor::Anthropic),
        WireEvent::Error { error } => StreamEvent::new(StreamEventType::Error, Vendor::Anthropic)
            .with_payload(StreamPayload::Error(error_to_canonical(&error, original.get(ERROR), config))),
    };
    if let Some(fields) = original.as_object() {
        for (key, value) in fields.iter().filter(|(key, _)| !EVENT_FIELDS.contains(&key.as_str())) {
            out.extensions
                .insert(Vendor::Anthropic, key.clone(), Opaque::from_value(value));
        }
    }
    repair(&mut out, ctx);
    out
}

fn message_start(message: MessagesResponse, original: Option<&Value>, config: &TranscodeConfig) -> StreamEvent {
    let mut out = StreamEvent::new(StreamEventType::MessageStart, Vendor::Anthropic);
    out.message_id = Some(message.id.clone());
    if config.capture_raw
        && let Some(original) = original
    {
        out.extensions
            .insert(Vendor::Anthropic, MESSAGE, Opaque::from_value(original));
    }
    let usage = usage_to_canonical(&message.usage, original.and_then(|message| message.get(USAGE)), config);
    out.with_payload(StreamPayload::Message(MessageStart {
        message: Message::from_parts(Role::Assistant, blocks_to_parts(message.content, config)),
        model: message.model,
        usage: Some(usage),
    }))
}

fn block_kind(block: &WireBlock) -> BlockKind {
    match block {
        WireBlock::Text(_) => BlockKind::Text,
        WireBlock::ToolUse(_) => BlockKind::ToolUse,
        WireBlock::Thinking(_) => BlockKind::Thinking,
        WireBlock::RedactedThinking(_) => BlockKind::RedactedThinking,
        WireBlock::ServerToolUse(_) => BlockKind::ServerToolUse,
        WireBlock::WebSearchToolResult(_) => BlockKind::WebSearchToolResult,
        _ => BlockKind::Other,
    }
}

fn delta_to_canonical(delta: ContentDelta) -> DeltaContent {
    match delta {
        ContentDelta::TextDelta { text } => DeltaContent::Text { text },
        ContentDelta::InputJsonDelta { partial_json } => DeltaContent::InputJson { partial_json },
        ContentDelta::ThinkingDelta { thinking } => DeltaContent::Thinking { thinking },
        ContentDelta::SignatureDelta { signature } => DeltaContent::Signature { signature },
        ContentDelta::CitationsDelta { citation } => DeltaContent::Citations {
            citation: Opaque::from_value(&citation),
        },
        ContentDelta::Unknown(value) => DeltaContent::Other {
            kind: value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown")
                .to_owned(),
        },
    }
}

// -- Outbound: canonical -> Anthropic --

/// Wire form of one event, with captured Anthropic objects written over the rebuild
pub fn stream_payload_from_contract(event: &StreamEvent) -> Result<WirePayload, TranscodeError> {
    let wire = stream_event_from_contract(event)?;
    let name = wire.event_name();
    let mut data = serde_json::to_value(wire)?;
    if let Some(object) = data.as_object_mut() {
        for (field, original) in captured_objects(event) {
            object.insert(field.to_owned(), original);
        }
        for (key, value) in event.extensions.vendor(Vendor::Anthropic).into_iter().flat_map(Extras::iter) {
            match value.to_value() {
                Ok(value) => {
                    object.insert(key.to_owned(), value);
                }
                Err(error) => tracing::warn!(field = key, %error, "dropping event field that failed to decode"),
            }
        }
    }
    Ok(WirePayload { name, data })
}

/// Captured Anthropic objects of an event, by the wire field they came from
fn captured_objects(event: &StreamEvent) -> Vec<(&'static str, Value)> {
    let replay = |raw: Option<&VendorRaw>| VendorRaw::replay::<Value>(raw, Vendor::Anthropic);
    let mut fields = Vec::new();
    match event.event_type {
        StreamEventType::ContentBlockStart => {
            fields.push((CONTENT_BLOCK, event.content().and_then(|content| replay(content.raw.as_ref()))));
        }
        StreamEventType::ContentBlockDelta => {
            fields.push((DELTA, event.delta().and_then(|delta| replay(delta.raw.as_ref()))));
        }
        StreamEventType::MessageDelta => {
            let delta = event.message_delta();
            fields.push((DELTA, delta.and_then(|delta| replay(delta.raw.as_ref()))));
            let usage = delta.and_then(|delta| delta.usage.as_ref());
            fields.push((USAGE, usage.and_then(|usage| replay(usage.raw.as_ref()))));
        }
        StreamEventType::Error => {
            fields.push((ERROR, event.error().and_then(|error| replay(error.raw.as_ref()))));
        }
        StreamEventType::MessageStart
        | StreamEventType::ContentBlockStop
        | StreamEventType::MessageStop
        | StreamEventType::Ping => {}
    }
    fields
        .into_iter()
        .filter_map(|(field, original)| original.map(|original| (field, original)))
        .collect()
}

/// Typed rebuild of one event
pub fn stream_event_from_contract(event: &StreamEvent) -> Result<WireEvent, TranscodeError> {
    let wire = match event.event_type {
        StreamEventType::MessageStart => WireEvent::MessageStart {
            message: message_from_contract(event)?,
        },
        StreamEventType::ContentBlockStart => {
            let content = event
                .content()
                .ok_or_else(|| TranscodeError::invalid("content_block_start without content"))?;
            WireEvent::ContentBlockStart {
                index: wire_index(event)?,
                content_block: block_from_contract(content)?,
            }
        }
        StreamEventType::ContentBlockDelta => {
            let delta = event
                .delta()
                .ok_or_else(|| TranscodeError::invalid("content_block_delta without delta"))?;
            WireEvent::ContentBlockDelta {
                index: wire_index(event)?,
                delta: delta_from_contract(delta)?,
            }
        }
        StreamEventType::ContentBlockStop => WireEvent::ContentBlockStop {
            index: wire_index(event)?,
        },
        StreamEventType::MessageDelta => {
            let delta = event
                .message_delta()
                .ok_or_else(|| TranscodeError::invalid("message_delta without payload"))?;
            let body = VendorRaw::replay(delta.raw.as_ref(), Vendor::Anthropic).unwrap_or_else(|| MessageDeltaBody {
                stop_reason: stop_reason(delta.finish_reason, delta.native_finish_reason.as_deref(), event.source),
                stop_sequence: delta.stop_sequence.clone(),
            });
            WireEvent::MessageDelta {
                delta: body,
                usage: delta.usage.as_ref().map(usage_from_canonical),
            }
        }
        StreamEventType::MessageStop => WireEvent::MessageStop,
        StreamEventType::Ping => WireEvent::Ping,
        StreamEventType::Error => {
            let error = event
                .error()
                .ok_or_else(|| TranscodeError::invalid("error event without detail"))?;
            WireEvent::Error {
                error: error_from_canonical(error),
            }
        }
    };
    Ok(wire)
}

/// Anthropic events for one canonical event, with block boundaries
///
/// Every Anthropic delta sits between a `content_block_start` and a
/// `content_block_stop` for its index, one block open at a time. Streams from
/// formats without block boundaries get them synthesized here.
pub fn stream_events_from_contract(
    event: &StreamEvent,
    state: &mut EncodeState,
) -> Result<Vec<WirePayload>, TranscodeError> {
    let mut out = Vec::new();
    match event.event_type {
        StreamEventType::ContentBlockStart => {
            let index = wire_index(event)?;
            if state.open_block != Some(index) {
                close_open_block(state, &mut out);
            }
            state.open_block = Some(index);
        }
        StreamEventType::ContentBlockDelta => {
            let index = wire_index(event)?;
            if state.open_block != Some(index) {
                close_open_block(state, &mut out);
                out.push(WireEvent::ContentBlockStart {
                    index,
                    content_block: implied_block(event)?,
                });
                state.open_block = Some(index);
            }
        }
        StreamEventType::ContentBlockStop => {
            if state.open_block == Some(wire_index(event)?) {
                state.open_block = None;
            }
        }
        StreamEventType::MessageDelta | StreamEventType::MessageStop => close_open_block(state, &mut out),
        StreamEventType::MessageStart | StreamEventType::Ping | StreamEventType::Error => {}
    }
    let mut payloads = out.into_iter().map(synthesized).collect::<Result<Vec<_>, _>>()?;
    payloads.push(stream_payload_from_contract(event)?);
    Ok(payloads)
}

fn synthesized(wire: WireEvent) -> Result<WirePayload, TranscodeError> {
    Ok(WirePayload {
        name: wire.event_name(),
        data: serde_json::to_value(wire)?,
    })
}

fn close_open_block(state: &mut EncodeState, out: &mut Vec<WireEvent>) {
    if let Some(index) = state.open_block.take() {
        out.push(WireEvent::ContentBlockStop { index });
    }
}

/// Empty block a delta can extend
fn implied_block(event: &StreamEvent) -> Result<WireBlock, TranscodeError> {
    match event.delta().map(|delta| &delta.content) {
        Some(DeltaContent::Text { .. } | DeltaContent::Citations { .. }) => Ok(WireBlock::text("")),
        Some(DeltaContent::Thinking { .. } | DeltaContent::Signature { .. }) => {
            Ok(WireBlock::Thinking(ThinkingBlock {
                thinking: String::new(),
                signature: None,
            }))
        }
        _ => Err(TranscodeError::invalid(format!(
            "content_block_delta at index {} arrived outside a block",
            event.content_index
        ))),
    }
}

fn message_from_contract(event: &StreamEvent) -> Result<MessagesResponse, TranscodeError> {
    if let Some(message) = event.extensions.get_value(Vendor::Anthropic, MESSAGE) {
        return Ok(message);
    }
    let start = event
        .message()
        .ok_or_else(|| TranscodeError::invalid("message_start without message"))?;
    let id = event
        .message_id
        .clone()
        .or_else(|| event.response_id.clone())
        .unwrap_or_default();

    Ok(MessagesResponse {
        id,
        message_type: "message".to_owned(),
        role: "assistant".to_owned(),
        content: parts_to_blocks(&start.message.parts),
        model: start.model.clone(),
        stop_reason: None,
        stop_sequence: None,
        usage: start.usage.as_ref().map(usage_from_canonical).unwrap_or_default(),
        container: None,
        extra: BTreeMap::new(),
    })
}

fn block_from_contract(content: &ContentBlock) -> Result<WireBlock, TranscodeError> {
    if let Some(block) = VendorRaw::replay(content.raw.as_ref(), Vendor::Anthropic) {
        return Ok(block);
    }
    if let Some(block) = content.part.as_ref().and_then(part_to_block) {
        return Ok(block);
    }
    match content.kind {
        BlockKind::Text => Ok(WireBlock::text("")),
        kind => Err(TranscodeError::invalid(format!(
            "content_block_start of kind {kind} has no anthropic representation"
        ))),
    }
}

fn delta_from_contract(delta: &StreamDelta) -> Result<ContentDelta, TranscodeError> {
    if let Some(raw) = VendorRaw::replay(delta.raw.as_ref(), Vendor::Anthropic) {
        return Ok(raw);
    }
    let delta = match &delta.content {
        DeltaContent::Text { text } => ContentDelta::TextDelta { text: text.clone() },
        DeltaContent::InputJson { partial_json } => ContentDelta::InputJsonDelta {
            partial_json: partial_json.clone(),
        },
        DeltaContent::Thinking { thinking } => ContentDelta::ThinkingDelta {
            thinking: thinking.clone(),
        },
        DeltaContent::Signature { signature } => ContentDelta::SignatureDelta {
            signature: signature.clone(),
        },
        DeltaContent::Citations { citation } => ContentDelta::CitationsDelta {
            citation: citation.to_value()?,
        },
        DeltaContent::Other { kind } => {
            return Err(TranscodeError::invalid(format!(
                "delta of kind {kind} has no anthropic representation"
            )));
        }
    };
    Ok(delta)
}

fn wire_index(event: &StreamEvent) -> Result<u32, TranscodeError> {
    u32::try_from(event.content_index)
        .map_err(|_| TranscodeError::invalid(format!("{} has no content index", event.event_type)))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::protocol::anthropic::parse_stream_event;
    use crate::types::{ContentPart, FinishReason, UNSET_INDEX};

    fn convert(raw: &Value, ctx: &mut StreamIndexContext, config: &TranscodeConfig) -> StreamEvent {
        let wire = parse_stream_event(raw.clone()).unwrap();
        stream_event_to_contract(wire, raw, ctx, config)
    }

    fn reverse(event: &StreamEvent) -> Value {
        let payload = stream_payload_from_contract(event).unwrap();
        assert_eq!(payload.data["type"], payload.name);
        payload.data
    }

    #[test]
    fn tool_use_start_is_addressed_by_tool_id() {
        let raw = json!({
            "type": "content_block_start",
            "index": 2,
            "content_block": {"type": "tool_use", "id": "toolu_123", "name": "get_weather", "input": {}}
        });
        let mut ctx = StreamIndexContext::new();
        let event = convert(&raw, &mut ctx, &TranscodeConfig::default());

        assert_eq!(event.content_index, 2);
        assert_eq!(event.item_id.as_deref(), Some("toolu_123"));
        let content = event.content().unwrap();
        assert_eq!(content.kind, BlockKind::ToolUse);
        assert!(matches!(content.part, Some(ContentPart::ToolUse(_))));
        assert_eq!(reverse(&event), raw);
    }

    #[test]
    fn fields_outside_the_wire_types_survive() {
        let raws = [
            json!({
                "type": "message_start",
                "message": {
                    "id": "msg_1", "type": "message", "role": "assistant", "content": [],
                    "model": "claude-sonnet-4-5", "stop_reason": null, "stop_sequence": null,
                    "context_management": {"applied_edits": []},
                    "usage": {"input_tokens": 25, "output_tokens": 1}
                }
            }),
            json!({
                "type": "content_block_start",
                "index": 0,
                "content_block": {"type": "text", "text": "", "citations": null}
            }),
            json!({
                "type": "content_block_start",
                "index": 1,
                "content_block": {
                    "type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {},
                    "caller": {"type": "direct"}
                }
            }),
            json!({
                "type": "message_delta",
                "delta": {"stop_reason": "tool_use", "stop_sequence": null},
                "usage": {"output_tokens": 12, "cache_read_input_tokens": null}
            }),
            json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded", "details": {"retry_after": 3}}
            }),
        ];
        let mut ctx = StreamIndexContext::new();
        for raw in raws {
            let event = convert(&raw, &mut ctx, &TranscodeConfig::default());
            assert_eq!(reverse(&event), raw);
        }
    }

    #[test]
    fn captured_objects_from_another_vendor_are_ignored() {
        let raw = json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hi"}});
        let mut event = convert(&raw, &mut StreamIndexContext::new(), &TranscodeConfig::default());
        if let Some(StreamPayload::Delta(delta)) = &mut event.payload {
            delta.raw = Some(VendorRaw {
                vendor: Vendor::OpenAi,
                data: Opaque::from_value(&json!({"content": "Hi"})),
            });
        }
        assert_eq!(reverse(&event), raw);
    }

    #[test]
    fn message_delta_without_usage_keeps_stop_reason() {
        let raw = json!({"type": "message_delta", "delta": {"stop_reason": "end_turn", "stop_sequence": null}});
        for capture_raw in [true, false] {
            let config = TranscodeConfig {
                capture_raw,
                ..TranscodeConfig::default()
            };
            let event = convert(&raw, &mut StreamIndexContext::new(), &config);
            let delta = event.message_delta().unwrap();
            assert_eq!(delta.finish_reason, Some(FinishReason::Stop));
            assert_eq!(delta.native_finish_reason.as_deref(), Some("end_turn"));
            assert!(delta.usage.is_none());
            assert_eq!(reverse(&event), raw);
        }
    }

    #[test]
    fn message_start_replays_original_message() {
        let raw = json!({
            "type": "message_start",
            "message": {
                "id": "msg_1", "type": "message", "role": "assistant", "content": [],
                "model": "claude-sonnet-4-5", "stop_reason": null, "stop_sequence": null,
                "usage": {"input_tokens": 25, "output_tokens": 1, "cache_creation_input_tokens": 0,
                          "cache_read_input_tokens": 0, "service_tier": "standard"}
            }
        });
        let mut ctx = StreamIndexContext::new();
        let event = convert(&raw, &mut ctx, &TranscodeConfig::default());

        assert_eq!(event.message_id.as_deref(), Some("msg_1"));
        assert_eq!(ctx.get_message_id(), Some("msg_1"));
        assert_eq!(event.message().unwrap().model, "claude-sonnet-4-5");
        assert_eq!(reverse(&event), raw);
    }

    #[test]
    fn rebuild_path_without_raw() {
        let config = TranscodeConfig {
            capture_raw: false,
            ..TranscodeConfig::default()
        };
        let mut ctx = StreamIndexContext::new();
        let raws = [
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hel"}}),
            json!({"type": "content_block_delta", "index": 0,
                   "delta": {"type": "citations_delta", "citation": {"type": "char_location", "cited_text": "x"}}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "ping"}),
            json!({"type": "message_stop"}),
            json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
        ];
        for raw in raws {
            let event = convert(&raw, &mut ctx, &config);
            assert!(event.content().is_none_or(|content| content.raw.is_none()));
            assert_eq!(reverse(&event), raw);
        }
    }

    #[test]
    fn unknown_delta_replays_from_raw() {
        let raw = json!({"type": "content_block_delta", "index": 1, "delta": {"type": "compaction_delta", "x": 1}});
        let event = convert(&raw, &mut StreamIndexContext::new(), &TranscodeConfig::default());
        assert_eq!(
            event.delta().unwrap().content,
            DeltaContent::Other {
                kind: "compaction_delta".to_owned()
            }
        );
        assert_eq!(reverse(&event), raw);
    }

    #[test]
    fn missing_index_cannot_be_written() {
        let mut event = StreamEvent::new(StreamEventType::ContentBlockStop, Vendor::OpenAi);
        event.content_index = UNSET_INDEX;
        let err = stream_event_from_contract(&event).unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidArgument(_)));
    }

    #[test]
    fn missing_payload_is_invalid() {
        let event = StreamEvent::new(StreamEventType::ContentBlockDelta, Vendor::Anthropic);
        assert!(matches!(
            stream_event_from_contract(&event),
            Err(TranscodeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_block_boundaries_are_synthesized() {
        let mut delta = StreamEvent::new(StreamEventType::ContentBlockDelta, Vendor::OpenAi).with_payload(
            StreamPayload::Delta(StreamDelta {
                content: DeltaContent::Text { text: "Hi".to_owned() },
                raw: None,
            }),
        );
        delta.content_index = 0;
        let finish = StreamEvent::new(StreamEventType::MessageDelta, Vendor::OpenAi).with_payload(
            StreamPayload::MessageDelta(MessageDelta {
                finish_reason: Some(FinishReason::Stop),
                native_finish_reason: Some("stop".to_owned()),
                ..MessageDelta::default()
            }),
        );

        let mut state = EncodeState::new();
        let names: Vec<&str> = [&delta, &delta, &finish]
            .into_iter()
            .flat_map(|event| stream_events_from_contract(event, &mut state).unwrap())
            .map(|wire| wire.name)
            .collect();
        assert_eq!(
            names,
            [
                "content_block_start",
                "content_block_delta",
                "content_block_delta",
                "content_block_stop",
                "message_delta"
            ]
        );
    }

    #[test]
    fn delimited_blocks_pass_through() {
        let raws = [
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hi"}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "message_stop"}),
        ];
        let mut ctx = StreamIndexContext::new();
        let mut state = EncodeState::new();
        let out: Vec<Value> = raws
            .iter()
            .map(|raw| convert(raw, &mut ctx, &TranscodeConfig::default()))
            .flat_map(|event| stream_events_from_contract(&event, &mut state).unwrap())
            .map(|wire| wire.data)
            .collect();
        assert_eq!(out, raws);
    }
}
