//! Chat completion request conversion

use std::collections::BTreeMap;

use serde_json::Value;
use synapse_config::TranscodeConfig;

use super::message::{message_to_canonical, message_to_wire};
use crate::protocol::openai::{
    OpenAiContent, OpenAiFunction, OpenAiFunctionName, OpenAiMessage, OpenAiNamedToolChoice, OpenAiRequest,
    OpenAiStop, OpenAiTool, OpenAiToolChoice,
};
use crate::types::{
    Extras, FunctionDefinition, Opaque, ReasoningConfig, RequestContract, RequestInput, SamplingParams, ToolChoice,
    ToolChoiceMode, ToolDefinition, Vendor, VendorExtras,
};

/// Set when the request used `max_completion_tokens` rather than `max_tokens`
const MAX_COMPLETION_TOKENS: &str = "max_completion_tokens";
/// Set when `stop` was a bare string
const STOP_SCALAR: &str = "stop_scalar";
/// Metadata key shared with Anthropic's `metadata.user_id`
const USER_ID: &str = "user_id";

const RESERVED: [&str; 2] = [MAX_COMPLETION_TOKENS, STOP_SCALAR];

// -- Inbound: OpenAI -> canonical --

pub fn request_to_contract(request: OpenAiRequest, config: &TranscodeConfig) -> RequestContract {
    let mut extras = Extras::new();

    let max_tokens = match (request.max_completion_tokens, request.max_tokens) {
        (Some(max), _) => {
            extras.insert_value(MAX_COMPLETION_TOKENS, &true);
            Some(max)
        }
        (None, max) => max,
    };
    let stop = request.stop.map(|stop| {
        if matches!(stop, OpenAiStop::One(_)) {
            extras.insert_value(STOP_SCALAR, &true);
        }
        stop.into_vec()
    });

    let tool_choice = request.tool_choice.and_then(|choice| match choice {
        OpenAiToolChoice::Mode(mode) => match mode.as_str() {
            "none" => Some(ToolChoice::Mode(ToolChoiceMode::None)),
            "auto" => Some(ToolChoice::Mode(ToolChoiceMode::Auto)),
            "required" => Some(ToolChoice::Mode(ToolChoiceMode::Required)),
            other => {
                tracing::warn!(tool_choice = other, "unrecognized tool_choice mode, ignoring it");
                None
            }
        },
        OpenAiToolChoice::Named(named) => Some(ToolChoice::named(named.function.name)),
    });

    let reasoning = request.reasoning_effort.map(|effort| ReasoningConfig {
        enabled: effort != "none",
        budget_tokens: None,
        effort: Some(effort),
    });

    let mut metadata = Extras::new();
    metadata.insert_opt(USER_ID, request.user.as_ref());

    for (key, value) in &request.extra {
        extras.insert(key.clone(), Opaque::from_value(value));
    }

    RequestContract {
        source: Vendor::OpenAi,
        model: request.model,
        input: RequestInput::Messages(
            request
                .messages
                .into_iter()
                .map(|message| message_to_canonical(message, config))
                .collect(),
        ),
        system: None,
        params: SamplingParams {
            temperature: request.temperature,
            top_p: request.top_p,
            top_k: None,
            max_tokens,
            stop,
            seed: request.seed,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
            parallel_tool_calls: request.parallel_tool_calls,
        },
        stream: request.stream.unwrap_or(false),
        tools: request
            .tools
            .unwrap_or_default()
            .into_iter()
            .map(tool_to_definition)
            .collect(),
        tool_choice,
        response_format: request.response_format.as_ref().map(Opaque::from_value),
        reasoning,
        metadata,
        vendor_extras: VendorExtras::new(Vendor::OpenAi, extras),
    }
}

fn tool_to_definition(tool: OpenAiTool) -> ToolDefinition {
    ToolDefinition {
        tool_type: tool.tool_type,
        function: FunctionDefinition {
            name: tool.function.name,
            description: tool.function.description,
            parameters: tool.function.parameters.as_ref().map(Opaque::from_value),
            strict: tool.function.strict,
        },
        extras: Extras::new(),
    }
}

// -- Outbound: canonical -> OpenAI --

pub fn request_from_contract(contract: &RequestContract) -> OpenAiRequest {
    let extras = contract.extras_for(Vendor::OpenAi);
    let flag = |key: &str| extras.and_then(|extras| extras.get_value::<bool>(key)).unwrap_or(false);

    let mut messages = Vec::new();
    if let Some(system) = &contract.system {
        messages.push(OpenAiMessage {
            role: "system".to_owned(),
            content: Some(OpenAiContent::Text(system.as_text())),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        });
    }
    for message in contract.input.clone().into_messages() {
        messages.extend(message_to_wire(&message));
    }

    let (max_tokens, max_completion_tokens) = if flag(MAX_COMPLETION_TOKENS) {
        (None, contract.params.max_tokens)
    } else {
        (contract.params.max_tokens, None)
    };
    let stop = contract.params.stop.clone().map(|mut stops| {
        if flag(STOP_SCALAR) && stops.len() == 1 {
            OpenAiStop::One(stops.remove(0))
        } else {
            OpenAiStop::Many(stops)
        }
    });

    let tools: Vec<OpenAiTool> = contract.tools.iter().map(definition_to_tool).collect();

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
    if contract.params.top_k.is_some() {
        tracing::debug!("chat completions has no top_k, dropping it");
    }

    OpenAiRequest {
        model: contract.model.clone(),
        messages,
        temperature: contract.params.temperature,
        top_p: contract.params.top_p,
        max_tokens,
        max_completion_tokens,
        stop,
        frequency_penalty: contract.params.frequency_penalty,
        presence_penalty: contract.params.presence_penalty,
        seed: contract.params.seed,
        stream: contract.stream.then_some(true),
        tools: (!tools.is_empty()).then_some(tools),
        tool_choice: contract.tool_choice.as_ref().map(tool_choice_to_wire),
        parallel_tool_calls: contract.params.parallel_tool_calls,
        response_format: contract.response_format.as_ref().and_then(|format| format.to_value().ok()),
        reasoning_effort: contract.reasoning.as_ref().and_then(reasoning_effort),
        user: contract.metadata.get_value(USER_ID),
        extra,
    }
}

fn definition_to_tool(tool: &ToolDefinition) -> OpenAiTool {
    OpenAiTool {
        tool_type: "function".to_owned(),
        function: OpenAiFunction {
            name: tool.function.name.clone(),
            description: tool.function.description.clone(),
            parameters: tool.function.parameters.as_ref().and_then(|schema| schema.to_value().ok()),
            strict: tool.function.strict,
        },
    }
}

fn tool_choice_to_wire(choice: &ToolChoice) -> OpenAiToolChoice {
    match choice {
        ToolChoice::Mode(mode) => OpenAiToolChoice::Mode(
            match mode {
                ToolChoiceMode::None => "none",
                ToolChoiceMode::Auto => "auto",
                ToolChoiceMode::Required => "required",
            }
            .to_owned(),
        ),
        ToolChoice::Function(function) => OpenAiToolChoice::Named(OpenAiNamedToolChoice {
            tool_type: "function".to_owned(),
            function: OpenAiFunctionName {
                name: function.function.name.clone(),
            },
        }),
    }
}

/// Effort level, derived from the thinking budget when none was given
fn reasoning_effort(reasoning: &ReasoningConfig) -> Option<String> {
    if let Some(effort) = &reasoning.effort {
        return Some(effort.clone());
    }
    if !reasoning.enabled {
        return None;
    }
    let effort = match reasoning.budget_tokens {
        Some(budget) if budget <= 2048 => "low",
        Some(budget) if budget > 8192 => "high",
        _ => "medium",
    };
    Some(effort.to_owned())
}
