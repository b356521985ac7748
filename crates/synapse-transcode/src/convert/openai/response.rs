//! Chat completion response conversion

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use synapse_config::TranscodeConfig;

use super::message::{assistant_to_canonical, message_to_wire};
use crate::protocol::openai::{
    OpenAiChoice, OpenAiChoiceMessage, OpenAiCompletionTokensDetails, OpenAiContent, OpenAiErrorDetail,
    OpenAiErrorResponse, OpenAiPromptTokensDetails, OpenAiResponse, OpenAiUsage,
};
use crate::types::{
    Choice, ErrorDetail, Extras, FinishReason, ResponseContract, Usage, Vendor, VendorRaw,
};

const SYSTEM_FINGERPRINT: &str = "system_fingerprint";
const SERVICE_TIER: &str = "service_tier";
const REFUSAL: &str = "refusal";

/// Either a completion or an error body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Completion(OpenAiResponse),
    Error(OpenAiErrorResponse),
}

pub fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

/// Rebuild a chat `finish_reason`, replaying the native string when it came
/// from a chat completion
pub fn finish_reason_to_wire(finish: Option<FinishReason>, native: Option<&str>, source: Vendor) -> Option<String> {
    if source == Vendor::OpenAi
        && let Some(native) = native
    {
        return Some(native.to_owned());
    }
    let reason = match finish? {
        FinishReason::Stop | FinishReason::Unknown => "stop",
        FinishReason::Length => "length",
        FinishReason::ToolCalls => "tool_calls",
        FinishReason::ContentFilter => "content_filter",
    };
    Some(reason.to_owned())
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

// -- Inbound: OpenAI -> canonical --

pub fn response_to_contract(response: OpenAiResponse, config: &TranscodeConfig) -> ResponseContract {
    let mut extras = Extras::new();
    extras.insert_opt(SYSTEM_FINGERPRINT, response.system_fingerprint.as_ref());
    extras.insert_opt(SERVICE_TIER, response.service_tier.as_ref());

    let choices = response
        .choices
        .into_iter()
        .map(|choice| {
            let mut message = assistant_to_canonical(
                choice.message.content.map(OpenAiContent::Text),
                choice.message.tool_calls.unwrap_or_default(),
                config,
            );
            message.extras.insert_opt(REFUSAL, choice.message.refusal.as_ref());
            Choice {
                index: choice.index,
                message,
                finish_reason: choice.finish_reason.as_deref().map(finish_reason),
                native_finish_reason: choice.finish_reason,
            }
        })
        .collect();

    ResponseContract {
        source: Vendor::OpenAi,
        id: response.id,
        model: response.model,
        created: Some(response.created),
        choices,
        usage: response.usage.as_ref().map(|usage| usage_to_canonical(usage, config)),
        error: None,
        extras,
    }
}

pub fn usage_to_canonical(usage: &OpenAiUsage, config: &TranscodeConfig) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        cache_creation_tokens: None,
        cache_read_tokens: usage.prompt_tokens_details.as_ref().and_then(|details| details.cached_tokens),
        reasoning_tokens: usage
            .completion_tokens_details
            .as_ref()
            .and_then(|details| details.reasoning_tokens),
        raw: capture(config, usage),
    }
}

pub fn error_to_contract(response: OpenAiErrorResponse, config: &TranscodeConfig) -> ResponseContract {
    ResponseContract::failure(Vendor::OpenAi, error_to_canonical(&response.error, config))
}

pub fn error_to_canonical(error: &OpenAiErrorDetail, config: &TranscodeConfig) -> ErrorDetail {
    ErrorDetail {
        code: error.code.clone(),
        raw: capture(config, error),
        ..ErrorDetail::new(error.error_type.clone(), error.message.clone())
    }
}

pub(super) fn capture<T: Serialize>(config: &TranscodeConfig, value: &T) -> Option<VendorRaw> {
    if config.capture_raw {
        VendorRaw::capture(Vendor::OpenAi, value)
    } else {
        None
    }
}

// -- Outbound: canonical -> OpenAI --

pub fn response_from_contract(contract: &ResponseContract) -> ResponseBody {
    if let Some(error) = &contract.error {
        return ResponseBody::Error(OpenAiErrorResponse {
            error: error_from_canonical(error),
        });
    }

    let choices = contract
        .choices
        .iter()
        .map(|choice| {
            let message = message_to_wire(&choice.message).into_iter().next();
            let (content, tool_calls) = message
                .map(|message| {
                    let content = message.content.map(|content| match content {
                        OpenAiContent::Text(text) => text,
                        OpenAiContent::Parts(_) => choice.message.text_content(),
                    });
                    (content, message.tool_calls)
                })
                .unwrap_or_default();
            OpenAiChoice {
                index: choice.index,
                message: OpenAiChoiceMessage {
                    role: "assistant".to_owned(),
                    content,
                    refusal: choice.message.extras.get_value(REFUSAL),
                    tool_calls,
                },
                finish_reason: finish_reason_to_wire(
                    choice.finish_reason,
                    choice.native_finish_reason.as_deref(),
                    contract.source,
                ),
            }
        })
        .collect();

    ResponseBody::Completion(OpenAiResponse {
        id: contract.id.clone(),
        object: "chat.completion".to_owned(),
        created: contract.created.unwrap_or_else(unix_now),
        model: contract.model.clone(),
        choices,
        usage: contract.usage.as_ref().map(usage_from_canonical),
        system_fingerprint: contract.extras.get_value(SYSTEM_FINGERPRINT),
        service_tier: contract.extras.get_value(SERVICE_TIER),
    })
}

pub fn usage_from_canonical(usage: &Usage) -> OpenAiUsage {
    VendorRaw::replay(usage.raw.as_ref(), Vendor::OpenAi).unwrap_or_else(|| OpenAiUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        prompt_tokens_details: usage.cache_read_tokens.map(|cached_tokens| OpenAiPromptTokensDetails {
            cached_tokens: Some(cached_tokens),
        }),
        completion_tokens_details: usage.reasoning_tokens.map(|reasoning_tokens| OpenAiCompletionTokensDetails {
            reasoning_tokens: Some(reasoning_tokens),
        }),
    })
}

pub fn error_from_canonical(error: &ErrorDetail) -> OpenAiErrorDetail {
    VendorRaw::replay(error.raw.as_ref(), Vendor::OpenAi).unwrap_or_else(|| OpenAiErrorDetail {
        message: error.message.clone(),
        error_type: error.error_type.clone(),
        param: None,
        code: error.code.clone(),
    })
}
