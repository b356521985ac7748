//! Messages API response conversion

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use synapse_config::TranscodeConfig;

use super::content::{blocks_to_parts, parts_to_blocks};
use super::finish::{finish_reason, stop_reason};
use super::request::message_to_input;
use crate::protocol::anthropic::{
    ApiError, ContentBlock, ErrorResponse, MessageContent, MessagesResponse, Usage as WireUsage,
};
use crate::types::{Choice, ErrorDetail, Extras, Message, Opaque, ResponseContract, Role, Usage, Vendor, VendorRaw};

const STOP_SEQUENCE: &str = "stop_sequence";
const CONTAINER: &str = "container";
const REQUEST_ID: &str = "request_id";

/// `extras` keys with a dedicated wire field
const RESERVED: [&str; 3] = [STOP_SEQUENCE, CONTAINER, REQUEST_ID];

/// Either a message or an error body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message(MessagesResponse),
    Error(ErrorResponse),
}

// -- Inbound: Anthropic -> canonical --

/// Convert a decoded body; `original` is the JSON it was decoded from
pub fn response_to_contract(
    response: MessagesResponse,
    original: &Value,
    config: &TranscodeConfig,
) -> ResponseContract {
    let mut extras = Extras::new();
    extras.insert_opt(STOP_SEQUENCE, response.stop_sequence.as_ref());
    extras.insert_opt(CONTAINER, response.container.as_ref());
    for (key, value) in &response.extra {
        extras.insert(key.clone(), Opaque::from_value(value));
    }

    let message = Message::from_parts(Role::Assistant, blocks_to_parts(response.content, config));
    let choice = Choice {
        index: 0,
        message,
        finish_reason: response.stop_reason.as_deref().map(finish_reason),
        native_finish_reason: response.stop_reason,
    };

    ResponseContract {
        source: Vendor::Anthropic,
        id: response.id,
        model: response.model,
        created: None,
        choices: vec![choice],
        usage: Some(usage_to_canonical(&response.usage, original.get("usage"), config)),
        error: None,
        extras,
    }
}

pub fn error_to_contract(response: ErrorResponse, original: &Value, config: &TranscodeConfig) -> ResponseContract {
    let error = error_to_canonical(&response.error, original.get("error"), config);
    let mut contract = ResponseContract::failure(Vendor::Anthropic, error);
    contract.extras.insert_opt(REQUEST_ID, response.request_id.as_ref());
    contract
}

pub fn error_to_canonical(error: &ApiError, original: Option<&Value>, config: &TranscodeConfig) -> ErrorDetail {
    ErrorDetail {
        raw: original.and_then(|original| capture(config, original)),
        ..ErrorDetail::new(error.error_type.clone(), error.message.clone())
    }
}

/// Usage with totals filled in; `input_tokens` counts only uncached prompt tokens
///
/// The raw capture keeps `original`, the usage object as it arrived, so
/// fields outside [`WireUsage`] replay too.
pub fn usage_to_canonical(usage: &WireUsage, original: Option<&Value>, config: &TranscodeConfig) -> Usage {
    let prompt_tokens = usage.input_tokens.unwrap_or(0);
    Usage {
        cache_creation_tokens: usage.cache_creation_input_tokens,
        cache_read_tokens: usage.cache_read_input_tokens,
        raw: original.and_then(|original| capture(config, original)),
        ..Usage::new(prompt_tokens, usage.output_tokens)
    }
}

pub(super) fn capture<T: Serialize>(config: &TranscodeConfig, value: &T) -> Option<VendorRaw> {
    if config.capture_raw {
        VendorRaw::capture(Vendor::Anthropic, value)
    } else {
        None
    }
}

// -- Outbound: canonical -> Anthropic --

pub fn response_from_contract(contract: &ResponseContract) -> ResponseBody {
    if let Some(error) = &contract.error {
        return ResponseBody::Error(ErrorResponse {
            response_type: "error".to_owned(),
            error: error_from_canonical(error),
            request_id: contract.extras.get_value(REQUEST_ID),
        });
    }

    let choice = contract.choices.first();
    let content = choice.map(|choice| message_blocks(&choice.message)).unwrap_or_default();
    let stop_reason = choice.and_then(|choice| {
        stop_reason(choice.finish_reason, choice.native_finish_reason.as_deref(), contract.source)
    });
    if contract.choices.len() > 1 {
        tracing::debug!(choices = contract.choices.len(), "anthropic returns one message, keeping the first choice");
    }

    ResponseBody::Message(MessagesResponse {
        id: contract.id.clone(),
        message_type: "message".to_owned(),
        role: "assistant".to_owned(),
        content,
        model: contract.model.clone(),
        stop_reason,
        stop_sequence: contract.extras.get_value(STOP_SEQUENCE),
        usage: contract.usage.as_ref().map(usage_from_canonical).unwrap_or_default(),
        container: contract.extras.get_value(CONTAINER),
        extra: unmodeled_fields(contract),
    })
}

/// Top-level fields an Anthropic response carried beyond the modeled ones
fn unmodeled_fields(contract: &ResponseContract) -> BTreeMap<String, Value> {
    if contract.source != Vendor::Anthropic {
        return BTreeMap::new();
    }
    let mut extra = BTreeMap::new();
    for (key, value) in contract.extras.iter().filter(|(key, _)| !RESERVED.contains(key)) {
        match value.to_value() {
            Ok(value) => {
                extra.insert(key.to_owned(), value);
            }
            Err(error) => tracing::warn!(field = key, %error, "dropping response field that failed to decode"),
        }
    }
    extra
}

fn message_blocks(message: &Message) -> Vec<ContentBlock> {
    if !message.parts.is_empty() {
        return parts_to_blocks(&message.parts);
    }
    match message_to_input(message).content {
        MessageContent::Blocks(blocks) => blocks,
        MessageContent::Text(text) if text.is_empty() => Vec::new(),
        MessageContent::Text(text) => vec![ContentBlock::text(text)],
    }
}

pub fn error_from_canonical(error: &ErrorDetail) -> ApiError {
    VendorRaw::replay(error.raw.as_ref(), Vendor::Anthropic).unwrap_or_else(|| ApiError {
        error_type: error.error_type.clone(),
        message: error.message.clone(),
        extra: BTreeMap::new(),
    })
}

pub fn usage_from_canonical(usage: &Usage) -> WireUsage {
    VendorRaw::replay(usage.raw.as_ref(), Vendor::Anthropic).unwrap_or_else(|| WireUsage {
        input_tokens: Some(usage.prompt_tokens),
        output_tokens: usage.completion_tokens,
        cache_creation_input_tokens: usage.cache_creation_tokens,
        cache_read_input_tokens: usage.cache_read_tokens,
        ..WireUsage::default()
    })
}
