use serde::{Deserialize, Serialize};

use super::extras::{Extras, Opaque, VendorExtras};
use super::message::{ContentPart, Message, Role};
use super::tool::{ToolChoice, ToolDefinition};
use super::vendor::Vendor;

/// Parameters controlling text generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Random seed for deterministic generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Frequency penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Presence penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Whether the model may issue several tool calls in one turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
}

/// What the model is asked to continue
///
/// Exactly one of the two drives message construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestInput {
    /// Conversation messages
    Messages(Vec<Message>),
    /// Single bare prompt, treated as one user turn
    Prompt(String),
}

impl RequestInput {
    /// Messages the input expands to
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Self::Messages(messages) => messages,
            Self::Prompt(prompt) => vec![Message::text(Role::User, prompt)],
        }
    }
}

impl Default for RequestInput {
    fn default() -> Self {
        Self::Messages(Vec::new())
    }
}

/// System instruction, plain or as fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Plain text
    Text(String),
    /// Fragments carrying their own vendor fields
    Parts(Vec<ContentPart>),
}

impl SystemPrompt {
    /// Flatten to text
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Extended reasoning configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Whether reasoning is requested
    pub enabled: bool,
    /// Token budget for reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tokens: Option<u32>,
    /// Qualitative effort level (e.g. "low", "high")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
}

/// Vendor-agnostic completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContract {
    /// Vendor the request was received in
    pub source: Vendor,
    /// Model identifier
    pub model: String,
    /// Conversation or prompt
    #[serde(flatten)]
    pub input: RequestInput,
    /// System instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,
    /// Generation parameters
    #[serde(default)]
    pub params: SamplingParams,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
    /// Function tools available to the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// How the model should select tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Structured output format, as the source vendor expressed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Opaque>,
    /// Reasoning configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
    /// Free-form request metadata
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub metadata: Extras,
    /// Fields with no canonical equivalent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_extras: Option<VendorExtras>,
}

impl RequestContract {
    /// Minimal request with a message list
    pub fn new(source: Vendor, model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            source,
            model: model.into(),
            input: RequestInput::Messages(messages),
            system: None,
            params: SamplingParams::default(),
            stream: false,
            tools: Vec::new(),
            tool_choice: None,
            response_format: None,
            reasoning: None,
            metadata: Extras::new(),
            vendor_extras: None,
        }
    }

    /// Extras captured from `vendor`, if the request came from there
    pub fn extras_for(&self, vendor: Vendor) -> Option<&Extras> {
        self.vendor_extras.as_ref().and_then(|extras| extras.values_for(vendor))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prompt_becomes_user_turn() {
        let messages = RequestInput::Prompt("hello".to_owned()).into_messages();
        assert_eq!(messages, vec![Message::text(Role::User, "hello")]);
    }

    #[test]
    fn input_is_flattened() {
        let mut request = RequestContract::new(Vendor::Anthropic, "claude", Vec::new());
        request.input = RequestInput::Prompt("hi".to_owned());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompt"], json!("hi"));
        assert!(value.get("messages").is_none());

        let back: RequestContract = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn system_parts_join_with_newlines() {
        let system = SystemPrompt::Parts(vec![ContentPart::text("a"), ContentPart::text("b")]);
        assert_eq!(system.as_text(), "a\nb");
    }
}
