//! Chat messages, content parts and tool calls

use serde_json::{Value, json};
use synapse_config::TranscodeConfig;

use crate::protocol::openai::{
    OpenAiContent, OpenAiContentPart, OpenAiFunctionCall, OpenAiImageUrl, OpenAiMessage, OpenAiToolCall,
};
use crate::types::{
    ContentPart, Extras, MediaPart, MediaSource, Message, Opaque, OtherPart, Role, ToolCall, ToolOutput,
    ToolResult, ToolResultPart, ToolUsePart, Vendor, VendorRaw,
};

/// Message extra holding a role name the canonical enum folds away
const ROLE: &str = "role";
const DETAIL: &str = "detail";

// -- Inbound: OpenAI -> canonical --

pub fn message_to_canonical(message: OpenAiMessage, config: &TranscodeConfig) -> Message {
    let role = match message.role.as_str() {
        "system" | "developer" => Role::System,
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        "user" => Role::User,
        other => {
            tracing::debug!(role = other, "unrecognized chat role, treating as user");
            Role::User
        }
    };

    let mut canonical = match role {
        Role::Assistant => assistant_to_canonical(message.content, message.tool_calls.unwrap_or_default(), config),
        Role::Tool => {
            let text = message.content.map(|content| content_text(&content)).unwrap_or_default();
            let tool_call_id = message.tool_call_id.clone().unwrap_or_default();
            Message {
                content: Some(text.clone()),
                parts: vec![ContentPart::ToolResult(ToolResultPart {
                    tool_use_id: tool_call_id.clone(),
                    output: Some(ToolOutput::Text(text.clone())),
                    is_error: None,
                    extras: Extras::new(),
                })],
                tool_results: vec![ToolResult {
                    tool_call_id,
                    content: text,
                    is_error: None,
                }],
                ..Message::empty(Role::Tool)
            }
        }
        Role::System | Role::User => match message.content {
            Some(OpenAiContent::Text(text)) => Message::text(role, text),
            Some(OpenAiContent::Parts(parts)) => Message::from_parts(role, parts_to_canonical(parts, config)),
            None => Message::empty(role),
        },
    };

    if role_name(role) != message.role {
        canonical.extras.insert_value(ROLE, &message.role);
    }
    canonical.name = message.name;
    canonical
}

/// Assistant turn; `tool_calls` keeps the argument strings byte-exact
pub fn assistant_to_canonical(
    content: Option<OpenAiContent>,
    tool_calls: Vec<OpenAiToolCall>,
    config: &TranscodeConfig,
) -> Message {
    if tool_calls.is_empty() {
        return match content {
            Some(OpenAiContent::Text(text)) => Message::text(Role::Assistant, text),
            Some(OpenAiContent::Parts(parts)) => Message::from_parts(Role::Assistant, parts_to_canonical(parts, config)),
            None => Message::empty(Role::Assistant),
        };
    }

    let text = content.as_ref().map(content_text);
    let mut parts = Vec::new();
    if let Some(text) = text.as_deref().filter(|text| !text.is_empty()) {
        parts.push(ContentPart::text(text));
    }
    parts.extend(tool_calls.iter().map(|call| {
        ContentPart::ToolUse(ToolUsePart {
            id: call.id.clone(),
            name: call.function.name.clone(),
            input: arguments_to_input(&call.id, &call.function.arguments),
            extras: Extras::new(),
        })
    }));

    Message {
        content: text,
        parts,
        tool_calls: tool_calls
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect(),
        ..Message::empty(Role::Assistant)
    }
}

/// Parse tool arguments; an unparseable string becomes `{}`
fn arguments_to_input(call_id: &str, arguments: &str) -> Opaque {
    if arguments.trim().is_empty() {
        return Opaque::from_value(&json!({}));
    }
    match serde_json::from_str::<Value>(arguments) {
        Ok(value) => Opaque::from_value(&value),
        Err(error) => {
            tracing::warn!(tool_call_id = call_id, %error, "tool arguments are not valid JSON, using empty object");
            Opaque::from_value(&json!({}))
        }
    }
}

fn parts_to_canonical(parts: Vec<OpenAiContentPart>, config: &TranscodeConfig) -> Vec<ContentPart> {
    parts
        .into_iter()
        .filter_map(|part| match part {
            OpenAiContentPart::Text { text } => Some(ContentPart::text(text)),
            OpenAiContentPart::ImageUrl { image_url } => {
                let mut extras = Extras::new();
                extras.insert_opt(DETAIL, image_url.detail.as_ref());
                Some(ContentPart::Image(MediaPart {
                    source: MediaSource::from_url(&image_url.url),
                    extras,
                }))
            }
            OpenAiContentPart::Other(value) => {
                let kind = value.get("type").and_then(Value::as_str).unwrap_or("unknown").to_owned();
                if !config.preserve_unknown() {
                    tracing::debug!(kind = %kind, "dropping unknown content part");
                    return None;
                }
                Some(ContentPart::Other(OtherPart {
                    kind,
                    raw: VendorRaw {
                        vendor: Vendor::OpenAi,
                        data: Opaque::from_value(&value),
                    },
                }))
            }
        })
        .collect()
}

fn content_text(content: &OpenAiContent) -> String {
    match content {
        OpenAiContent::Text(text) => text.clone(),
        OpenAiContent::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                OpenAiContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect(),
    }
}

const fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

// -- Outbound: canonical -> OpenAI --

/// One canonical message may become several chat messages: tool results
/// travel as separate `tool` turns ahead of what remains of the user turn
pub fn message_to_wire(message: &Message) -> Vec<OpenAiMessage> {
    let role = message
        .extras
        .get_value::<String>(ROLE)
        .unwrap_or_else(|| role_name(message.role).to_owned());

    match message.role {
        Role::Assistant => vec![OpenAiMessage {
            role,
            content: assistant_text(message).map(OpenAiContent::Text),
            name: message.name.clone(),
            tool_calls: wire_tool_calls(message),
            tool_call_id: None,
        }],
        Role::Tool => tool_results(message)
            .into_iter()
            .map(|result| tool_message(&result))
            .collect(),
        Role::System => vec![OpenAiMessage {
            role,
            content: Some(OpenAiContent::Text(message.text_content())),
            name: message.name.clone(),
            tool_calls: None,
            tool_call_id: None,
        }],
        Role::User => {
            let mut out: Vec<OpenAiMessage> = tool_results(message).iter().map(tool_message).collect();
            let had_results = !out.is_empty();

            let content = if message.parts.is_empty() {
                message.content.clone().map(OpenAiContent::Text)
            } else {
                let parts: Vec<OpenAiContentPart> = message.parts.iter().filter_map(part_to_wire).collect();
                (!parts.is_empty()).then_some(OpenAiContent::Parts(parts))
            };
            if content.is_some() || !had_results {
                out.push(OpenAiMessage {
                    role,
                    content,
                    name: message.name.clone(),
                    tool_calls: None,
                    tool_call_id: None,
                });
            }
            out
        }
    }
}

fn tool_results(message: &Message) -> Vec<ToolResult> {
    if message.tool_results.is_empty() {
        message.parts.iter().filter_map(ContentPart::as_tool_result).collect()
    } else {
        message.tool_results.clone()
    }
}

fn tool_message(result: &ToolResult) -> OpenAiMessage {
    OpenAiMessage {
        role: "tool".to_owned(),
        content: Some(OpenAiContent::Text(result.content.clone())),
        name: None,
        tool_calls: None,
        tool_call_id: Some(result.tool_call_id.clone()),
    }
}

fn assistant_text(message: &Message) -> Option<String> {
    if message.content.is_some() || message.parts.is_empty() {
        return message.content.clone();
    }
    let text = message.text_content();
    (!text.is_empty()).then_some(text)
}

fn wire_tool_calls(message: &Message) -> Option<Vec<OpenAiToolCall>> {
    let calls: Vec<ToolCall> = if message.tool_calls.is_empty() {
        message.parts.iter().filter_map(ContentPart::as_tool_call).collect()
    } else {
        message.tool_calls.clone()
    };
    if calls.is_empty() {
        return None;
    }
    Some(
        calls
            .into_iter()
            .map(|call| OpenAiToolCall {
                id: call.id,
                tool_type: "function".to_owned(),
                function: OpenAiFunctionCall {
                    name: call.function.name,
                    arguments: call.function.arguments,
                },
            })
            .collect(),
    )
}

fn part_to_wire(part: &ContentPart) -> Option<OpenAiContentPart> {
    match part {
        ContentPart::Text(text) => Some(OpenAiContentPart::Text { text: text.text.clone() }),
        ContentPart::Image(image) => {
            let Some(url) = image.source.to_url() else {
                tracing::debug!("image source has no URL form, dropping it");
                return None;
            };
            Some(OpenAiContentPart::ImageUrl {
                image_url: OpenAiImageUrl {
                    url,
                    detail: image.extras.get_value(DETAIL),
                },
            })
        }
        ContentPart::Other(other) => VendorRaw::replay(Some(&other.raw), Vendor::OpenAi).map(OpenAiContentPart::Other),
        ContentPart::ToolResult(_) => None,
        _ => {
            tracing::debug!("content part has no chat equivalent, dropping it");
            None
        }
    }
}
