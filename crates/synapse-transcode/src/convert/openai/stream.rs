//! Chat completion chunk conversion
//!
//! A chunk can carry several things at once (a role, a text fragment, tool
//! call fragments, a finish reason, usage), so inbound it fans out into a
//! list of canonical events. Outbound, each canonical event becomes at most
//! one chunk.

use serde_json::{Value, json};
use synapse_config::TranscodeConfig;

use super::response::{
    error_from_canonical, error_to_canonical, finish_reason, finish_reason_to_wire, unix_now, usage_from_canonical,
    usage_to_canonical,
};
use crate::codec::EncodeState;
use crate::error::TranscodeError;
use crate::protocol::decode;
use crate::protocol::openai::{
    DONE, OpenAiErrorResponse, OpenAiStreamChoice, OpenAiStreamChunk, OpenAiStreamDelta, OpenAiStreamFunctionCall,
    OpenAiStreamToolCall, OpenAiUsage,
};
use crate::repair::repair;
use crate::stream_context::StreamIndexContext;
use crate::types::{
    BlockKind, ContentBlock, ContentPart, DeltaContent, Extras, Message, MessageDelta, MessageStart, Opaque, Role,
    StreamDelta, StreamEvent, StreamEventType, StreamPayload, ToolUsePart, Vendor,
};

/// `extensions` key of the chunk `created` timestamp
const CREATED: &str = "created";

/// One outbound SSE payload
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkFrame {
    Chunk(OpenAiStreamChunk),
    Error(OpenAiErrorResponse),
    Done,
}

// -- Inbound: OpenAI -> canonical --

pub fn stream_data_to_contract(
    data: &str,
    ctx: &mut StreamIndexContext,
    config: &TranscodeConfig,
) -> Result<Vec<StreamEvent>, TranscodeError> {
    let data = data.trim();
    if data == DONE {
        let mut stop = StreamEvent::new(StreamEventType::MessageStop, Vendor::OpenAi);
        repair(&mut stop, ctx);
        return Ok(vec![stop]);
    }

    let value: Value =
        serde_json::from_str(data).map_err(|e| TranscodeError::invalid(format!("malformed chunk: {e}")))?;
    if value.get("error").is_some() {
        let body: OpenAiErrorResponse = decode("error chunk", value)?;
        let mut event = StreamEvent::new(StreamEventType::Error, Vendor::OpenAi)
            .with_payload(StreamPayload::Error(error_to_canonical(&body.error, config)));
        repair(&mut event, ctx);
        return Ok(vec![event]);
    }
    let chunk: OpenAiStreamChunk = decode("chat completion chunk", value)?;

    let mut events = Vec::new();
    if ctx.get_message_id().is_none() {
        events.push(message_start(&chunk));
    }

    let mut usage = chunk.usage.as_ref();
    for choice in &chunk.choices {
        let output_index = i64::from(choice.index);
        choice_events(&chunk.id, choice, output_index, &mut events);

        if let Some(reason) = &choice.finish_reason {
            let mut event = StreamEvent::new(StreamEventType::MessageDelta, Vendor::OpenAi).with_payload(
                StreamPayload::MessageDelta(MessageDelta {
                    finish_reason: Some(finish_reason(reason)),
                    native_finish_reason: Some(reason.clone()),
                    usage: usage.take().map(|usage| usage_to_canonical(usage, config)),
                    ..MessageDelta::default()
                }),
            );
            event.output_index = output_index;
            events.push(event);
        }
    }
    if let Some(usage) = usage {
        events.push(
            StreamEvent::new(StreamEventType::MessageDelta, Vendor::OpenAi).with_payload(StreamPayload::MessageDelta(
                MessageDelta {
                    usage: Some(usage_to_canonical(usage, config)),
                    ..MessageDelta::default()
                },
            )),
        );
    }

    for event in &mut events {
        repair(event, ctx);
    }
    Ok(events)
}

fn message_start(chunk: &OpenAiStreamChunk) -> StreamEvent {
    let mut event = StreamEvent::new(StreamEventType::MessageStart, Vendor::OpenAi).with_payload(
        StreamPayload::Message(MessageStart {
            model: chunk.model.clone(),
            message: Message::empty(Role::Assistant),
            usage: None,
        }),
    );
    event.message_id = Some(chunk.id.clone());
    if let Some(choice) = chunk.choices.first() {
        event.output_index = i64::from(choice.index);
    }
    event
        .extensions
        .insert(Vendor::OpenAi, CREATED, Opaque::from_value(&json!(chunk.created)));
    event
}

/// Text is content index 0; tool call `n` is content index `n + 1`
fn choice_events(chunk_id: &str, choice: &OpenAiStreamChoice, output_index: i64, events: &mut Vec<StreamEvent>) {
    if let Some(text) = choice.delta.content.as_deref().filter(|text| !text.is_empty()) {
        let mut event = StreamEvent::new(StreamEventType::ContentBlockDelta, Vendor::OpenAi).with_payload(
            StreamPayload::Delta(StreamDelta {
                content: DeltaContent::Text { text: text.to_owned() },
                raw: None,
            }),
        );
        event.output_index = output_index;
        event.content_index = 0;
        events.push(event);
    }

    for call in choice.delta.tool_calls.iter().flatten() {
        let content_index = i64::from(call.index) + 1;
        let arguments = call
            .function
            .as_ref()
            .and_then(|function| function.arguments.as_deref())
            .filter(|arguments| !arguments.is_empty());

        if let Some(id) = &call.id {
            let name = call
                .function
                .as_ref()
                .and_then(|function| function.name.clone())
                .unwrap_or_default();
            let mut start = StreamEvent::new(StreamEventType::ContentBlockStart, Vendor::OpenAi).with_payload(
                StreamPayload::Content(ContentBlock {
                    kind: BlockKind::ToolUse,
                    part: Some(ContentPart::ToolUse(ToolUsePart {
                        id: id.clone(),
                        name,
                        input: Opaque::from_value(&json!({})),
                        extras: Extras::new(),
                    })),
                    raw: None,
                }),
            );
            start.output_index = output_index;
            start.content_index = content_index;
            events.push(start);
        } else if arguments.is_none() {
            tracing::debug!(chunk_id, index = call.index, "tool call fragment carries nothing");
        }

        if let Some(arguments) = arguments {
            let mut delta = StreamEvent::new(StreamEventType::ContentBlockDelta, Vendor::OpenAi).with_payload(
                StreamPayload::Delta(StreamDelta {
                    content: DeltaContent::InputJson {
                        partial_json: arguments.to_owned(),
                    },
                    raw: None,
                }),
            );
            delta.output_index = output_index;
            delta.content_index = content_index;
            events.push(delta);
        }
    }
}

// -- Outbound: canonical -> OpenAI --

pub fn stream_event_from_contract(
    event: &StreamEvent,
    state: &mut EncodeState,
) -> Result<Option<ChunkFrame>, TranscodeError> {
    let delta = match event.event_type {
        StreamEventType::MessageStart => {
            let start = event
                .message()
                .ok_or_else(|| TranscodeError::invalid("message_start without message"))?;
            state.model = Some(start.model.clone());
            state.created = Some(
                event
                    .extensions
                    .get_value(Vendor::OpenAi, CREATED)
                    .unwrap_or_else(unix_now),
            );
            OpenAiStreamDelta {
                role: Some("assistant".to_owned()),
                content: Some(String::new()),
                tool_calls: None,
            }
        }
        StreamEventType::ContentBlockStart => {
            let content = event
                .content()
                .ok_or_else(|| TranscodeError::invalid("content_block_start without content"))?;
            let Some(ContentPart::ToolUse(tool_use)) = &content.part else {
                return Ok(None);
            };
            let index = state.tool_index(event.item_id.as_deref().unwrap_or(&tool_use.id));
            OpenAiStreamDelta {
                tool_calls: Some(vec![OpenAiStreamToolCall {
                    index,
                    id: Some(tool_use.id.clone()),
                    tool_type: Some("function".to_owned()),
                    function: Some(OpenAiStreamFunctionCall {
                        name: Some(tool_use.name.clone()),
                        arguments: Some(String::new()),
                    }),
                }]),
                ..OpenAiStreamDelta::default()
            }
        }
        StreamEventType::ContentBlockDelta => {
            let delta = event
                .delta()
                .ok_or_else(|| TranscodeError::invalid("content_block_delta without delta"))?;
            match &delta.content {
                DeltaContent::Text { text } => OpenAiStreamDelta {
                    content: Some(text.clone()),
                    ..OpenAiStreamDelta::default()
                },
                DeltaContent::InputJson { partial_json } => {
                    let item_id = event.item_id.as_deref().unwrap_or_default();
                    OpenAiStreamDelta {
                        tool_calls: Some(vec![OpenAiStreamToolCall {
                            index: state.tool_index(item_id),
                            id: None,
                            tool_type: None,
                            function: Some(OpenAiStreamFunctionCall {
                                name: None,
                                arguments: Some(partial_json.clone()),
                            }),
                        }]),
                        ..OpenAiStreamDelta::default()
                    }
                }
                _ => return Ok(None),
            }
        }
        StreamEventType::MessageDelta => {
            let message_delta = event
                .message_delta()
                .ok_or_else(|| TranscodeError::invalid("message_delta without payload"))?;
            let finish = finish_reason_to_wire(
                message_delta.finish_reason,
                message_delta.native_finish_reason.as_deref(),
                event.source,
            );
            let usage = message_delta.usage.as_ref().map(usage_from_canonical);
            if finish.is_none() && usage.is_none() {
                return Ok(None);
            }
            return Ok(Some(ChunkFrame::Chunk(chunk(event, state, finish, usage))));
        }
        StreamEventType::MessageStop => return Ok(Some(ChunkFrame::Done)),
        StreamEventType::Error => {
            let error = event
                .error()
                .ok_or_else(|| TranscodeError::invalid("error event without detail"))?;
            return Ok(Some(ChunkFrame::Error(OpenAiErrorResponse {
                error: error_from_canonical(error),
            })));
        }
        StreamEventType::ContentBlockStop | StreamEventType::Ping => return Ok(None),
    };

    let mut chunk = chunk(event, state, None, None);
    chunk.choices = vec![OpenAiStreamChoice {
        index: choice_index(event),
        delta,
        finish_reason: None,
    }];
    Ok(Some(ChunkFrame::Chunk(chunk)))
}

/// A chunk with a finish reason carries a choice; a usage-only chunk does not
fn chunk(
    event: &StreamEvent,
    state: &EncodeState,
    finish_reason: Option<String>,
    usage: Option<OpenAiUsage>,
) -> OpenAiStreamChunk {
    let choices = finish_reason
        .map(|reason| {
            vec![OpenAiStreamChoice {
                index: choice_index(event),
                delta: OpenAiStreamDelta::default(),
                finish_reason: Some(reason),
            }]
        })
        .unwrap_or_default();

    OpenAiStreamChunk {
        id: event
            .response_id
            .clone()
            .or_else(|| event.message_id.clone())
            .unwrap_or_default(),
        object: "chat.completion.chunk".to_owned(),
        created: state.created.unwrap_or_else(unix_now),
        model: state.model.clone().unwrap_or_default(),
        choices,
        usage,
    }
}

fn choice_index(event: &StreamEvent) -> u32 {
    u32::try_from(event.output_index).unwrap_or(0)
}
