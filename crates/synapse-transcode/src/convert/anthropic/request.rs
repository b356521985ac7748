//! Messages API request conversion

use std::collections::BTreeMap;

use serde_json::Value;
use synapse_config::TranscodeConfig;

use super::content::{CACHE_CONTROL, CITATIONS, blocks_to_parts, part_to_block, parts_to_blocks};
use super::tool::{TOOLS_EXTRAS, merge_tools, split_tools, tool_choice_to_canonical, tool_choice_to_wire};
use crate::protocol::anthropic::{
    ContentBlock, InputMessage, MessageContent, MessageRole, MessagesRequest, SystemPrompt as WireSystemPrompt,
    TextBlock, ThinkingConfig, ToolResultBlock, ToolResultContent, ToolUseBlock,
};
use crate::types::{
    ContentPart, Extras, Message, Opaque, PassthroughTool, ReasoningConfig, RequestContract, RequestInput, Role,
    SamplingParams, SystemPrompt, TextPart, ToolCall, ToolChoice, ToolChoiceMode, ToolResult, Vendor, VendorExtras,
};

const THINKING: &str = "thinking";
const SERVICE_TIER: &str = "service_tier";
const STREAM: &str = "stream";

/// `vendor_extras` keys with a dedicated wire field
const RESERVED: [&str; 4] = [TOOLS_EXTRAS, THINKING, SERVICE_TIER, STREAM];

// -- Inbound: Anthropic -> canonical --

pub fn request_to_contract(request: MessagesRequest, config: &TranscodeConfig) -> RequestContract {
    let mut extras = Extras::new();

    let messages = request
        .messages
        .into_iter()
        .map(|message| input_message_to_canonical(message, config))
        .collect();

    let (tools, builtins) = split_tools(request.tools.unwrap_or_default());
    if !builtins.is_empty() {
        extras.insert_value(TOOLS_EXTRAS, &builtins);
    }

    let (tool_choice, parallel_tool_calls) = match &request.tool_choice {
        Some(choice) => {
            let (choice, parallel) = tool_choice_to_canonical(choice);
            (Some(choice), parallel)
        }
        None => (None, None),
    };

    let reasoning = request.thinking.and_then(|thinking| match thinking.thinking_type.as_str() {
        "enabled" => Some(ReasoningConfig {
            enabled: true,
            budget_tokens: thinking.budget_tokens,
            effort: None,
        }),
        "disabled" => Some(ReasoningConfig::default()),
        _ => {
            extras.insert_value(THINKING, &thinking);
            None
        }
    });

    extras.insert_opt(SERVICE_TIER, request.service_tier.as_ref());
    if request.stream == Some(false) {
        extras.insert_value(STREAM, &false);
    }
    for (key, value) in &request.extra {
        extras.insert(key.clone(), Opaque::from_value(value));
    }

    let metadata = request
        .metadata
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), Opaque::from_value(value)))
        .collect();

    RequestContract {
        source: Vendor::Anthropic,
        model: request.model,
        input: RequestInput::Messages(messages),
        system: request.system.map(system_to_canonical),
        params: SamplingParams {
            temperature: request.temperature,
            top_p: request.top_p,
            top_k: request.top_k,
            max_tokens: Some(request.max_tokens),
            stop: request.stop_sequences,
            parallel_tool_calls,
            ..SamplingParams::default()
        },
        stream: request.stream.unwrap_or(false),
        tools,
        tool_choice,
        response_format: None,
        reasoning,
        metadata,
        vendor_extras: VendorExtras::new(Vendor::Anthropic, extras),
    }
}

fn input_message_to_canonical(message: InputMessage, config: &TranscodeConfig) -> Message {
    let role = match message.role {
        MessageRole::User => Role::User,
        MessageRole::Assistant => Role::Assistant,
    };
    match message.content {
        MessageContent::Text(text) => Message::text(role, text),
        MessageContent::Blocks(blocks) => Message::from_parts(role, blocks_to_parts(blocks, config)),
    }
}

fn system_to_canonical(system: WireSystemPrompt) -> SystemPrompt {
    match system {
        WireSystemPrompt::Text(text) => SystemPrompt::Text(text),
        WireSystemPrompt::Blocks(blocks) => SystemPrompt::Parts(
            blocks
                .into_iter()
                .map(|block| {
                    let mut extras = Extras::new();
                    extras.insert_opt(CACHE_CONTROL, block.cache_control.as_ref());
                    extras.insert_opt(CITATIONS, block.citations.as_ref());
                    ContentPart::Text(TextPart {
                        text: block.text,
                        extras,
                    })
                })
                .collect(),
        ),
    }
}

// -- Outbound: canonical -> Anthropic --

pub fn request_from_contract(contract: &RequestContract, config: &TranscodeConfig) -> MessagesRequest {
    let extras = contract.extras_for(Vendor::Anthropic);

    let mut system_texts = Vec::new();
    let mut messages = Vec::new();
    for message in contract.input.clone().into_messages() {
        if message.role == Role::System {
            system_texts.push(message.text_content());
        } else {
            messages.push(message_to_input(&message));
        }
    }
    let system = system_to_wire(contract.system.as_ref(), system_texts);

    let builtins: Vec<PassthroughTool> = extras
        .and_then(|extras| extras.get_value(TOOLS_EXTRAS))
        .unwrap_or_default();
    let tools = merge_tools(&contract.tools, &builtins);

    let parallel = contract.params.parallel_tool_calls;
    let tool_choice = match &contract.tool_choice {
        Some(choice) => Some(tool_choice_to_wire(choice, parallel)),
        None if parallel == Some(false) && !tools.is_empty() => {
            Some(tool_choice_to_wire(&ToolChoice::Mode(ToolChoiceMode::Auto), parallel))
        }
        None => None,
    };

    let thinking = extras
        .and_then(|extras| extras.get_value::<ThinkingConfig>(THINKING))
        .or_else(|| contract.reasoning.as_ref().map(thinking_from_reasoning));

    let stream = if contract.stream {
        Some(true)
    } else {
        extras.and_then(|extras| extras.get_value(STREAM))
    };

    if contract.response_format.is_some() {
        tracing::debug!("anthropic has no response_format, dropping it");
    }

    let mut extra = BTreeMap::new();
    if let Some(extras) = extras {
        for (key, value) in extras.iter().filter(|(key, _)| !RESERVED.contains(key)) {
            match value.to_value() {
                Ok(value) => {
                    extra.insert(key.to_owned(), value);
                }
                Err(error) => tracing::warn!(field = key, %error, "dropping vendor extra that failed to decode"),
            }
        }
    }

    let mut metadata = BTreeMap::new();
    for (key, value) in contract.metadata.iter() {
        match value.to_value() {
            Ok(value) => {
                metadata.insert(key.to_owned(), value);
            }
            Err(error) => tracing::warn!(field = key, %error, "dropping metadata entry that failed to decode"),
        }
    }

    MessagesRequest {
        model: contract.model.clone(),
        max_tokens: contract.params.max_tokens.unwrap_or(config.default_max_tokens),
        messages,
        system,
        metadata: (!metadata.is_empty()).then_some(metadata),
        stop_sequences: contract.params.stop.clone(),
        stream,
        temperature: contract.params.temperature,
        top_p: contract.params.top_p,
        top_k: contract.params.top_k,
        tools: (!tools.is_empty()).then_some(tools),
        tool_choice,
        thinking,
        service_tier: extras.and_then(|extras| extras.get_value(SERVICE_TIER)),
        extra,
    }
}

/// Canonical message to wire message; parts win over the flat views
pub fn message_to_input(message: &Message) -> InputMessage {
    let role = match message.role {
        Role::Assistant => MessageRole::Assistant,
        Role::System | Role::User | Role::Tool => MessageRole::User,
    };

    if !message.parts.is_empty() {
        return InputMessage {
            role,
            content: MessageContent::Blocks(parts_to_blocks(&message.parts)),
        };
    }
    if message.tool_calls.is_empty() && message.tool_results.is_empty() {
        return InputMessage {
            role,
            content: MessageContent::Text(message.content.clone().unwrap_or_default()),
        };
    }

    let mut blocks = Vec::new();
    if let Some(text) = message.content.as_deref().filter(|text| !text.is_empty()) {
        blocks.push(ContentBlock::text(text));
    }
    blocks.extend(message.tool_calls.iter().map(tool_call_block));
    blocks.extend(message.tool_results.iter().map(tool_result_block));
    InputMessage {
        role,
        content: MessageContent::Blocks(blocks),
    }
}

fn tool_call_block(call: &ToolCall) -> ContentBlock {
    let input = serde_json::from_str::<Value>(&call.function.arguments).unwrap_or_else(|error| {
        tracing::warn!(tool_call_id = %call.id, %error, "tool arguments are not valid JSON, sending empty object");
        Value::Object(serde_json::Map::new())
    });
    ContentBlock::ToolUse(ToolUseBlock {
        id: call.id.clone(),
        name: call.function.name.clone(),
        input,
        cache_control: None,
    })
}

fn tool_result_block(result: &ToolResult) -> ContentBlock {
    ContentBlock::ToolResult(ToolResultBlock {
        tool_use_id: result.tool_call_id.clone(),
        content: Some(ToolResultContent::Text(result.content.clone())),
        is_error: result.is_error,
        cache_control: None,
    })
}

fn system_to_wire(system: Option<&SystemPrompt>, extra_texts: Vec<String>) -> Option<WireSystemPrompt> {
    match system {
        Some(SystemPrompt::Parts(parts)) => {
            let mut blocks: Vec<TextBlock> = parts
                .iter()
                .filter_map(|part| match part_to_block(part) {
                    Some(ContentBlock::Text(block)) => Some(block),
                    _ => None,
                })
                .collect();
            blocks.extend(extra_texts.into_iter().map(|text| TextBlock {
                text,
                citations: None,
                cache_control: None,
            }));
            Some(WireSystemPrompt::Blocks(blocks))
        }
        Some(SystemPrompt::Text(text)) => {
            let mut texts = vec![text.clone()];
            texts.extend(extra_texts);
            Some(WireSystemPrompt::Text(texts.join("\n")))
        }
        None if extra_texts.is_empty() => None,
        None => Some(WireSystemPrompt::Text(extra_texts.join("\n"))),
    }
}

fn thinking_from_reasoning(reasoning: &ReasoningConfig) -> ThinkingConfig {
    if !reasoning.enabled {
        return ThinkingConfig {
            thinking_type: "disabled".to_owned(),
            budget_tokens: None,
        };
    }
    let budget = reasoning
        .budget_tokens
        .unwrap_or_else(|| effort_budget(reasoning.effort.as_deref()));
    ThinkingConfig {
        thinking_type: "enabled".to_owned(),
        budget_tokens: Some(budget),
    }
}

/// Thinking budget for an OpenAI-style effort level
fn effort_budget(effort: Option<&str>) -> u32 {
    match effort {
        Some("minimal" | "low") => 1024,
        Some("high") => 16_384,
        _ => 4096,
    }
}
