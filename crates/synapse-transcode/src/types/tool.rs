use serde::{Deserialize, Serialize};

use super::extras::{Extras, Opaque};

/// Definition of a tool the model can call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool type (currently always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDefinition,
    /// Vendor fields (cache control, declared type)
    #[serde(default, skip_serializing_if = "Extras::is_empty")]
    pub extras: Extras,
}

impl ToolDefinition {
    /// Function tool with no vendor fields
    pub fn function(function: FunctionDefinition) -> Self {
        Self {
            tool_type: "function".to_owned(),
            function,
            extras: Extras::new(),
        }
    }
}

/// Specification of a callable function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the function parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Opaque>,
    /// Whether the vendor should enforce the schema strictly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// A vendor built-in tool (bash, text editor, web search, ...) carried verbatim
///
/// Stored as a list under the `tools_extras` vendor-extras key. `position` is
/// the tool's index in the original tool list so interleaving with function
/// tools survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassthroughTool {
    /// Vendor tool type tag (e.g. `bash_20250124`)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The tool definition exactly as received
    pub tool: Opaque,
    /// Index in the original tool list
    pub position: usize,
}

/// How the model should select tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    /// Simple mode: "none", "auto", or "required"
    Mode(ToolChoiceMode),
    /// Force a specific function
    Function(ToolChoiceFunction),
}

impl ToolChoice {
    /// Force the named function
    pub fn named(name: impl Into<String>) -> Self {
        Self::Function(ToolChoiceFunction {
            tool_type: "function".to_owned(),
            function: ToolChoiceFunctionName { name: name.into() },
        })
    }
}

/// Tool selection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoiceMode {
    /// Model will not call any tools
    None,
    /// Model decides whether to call tools
    Auto,
    /// Model must call at least one tool
    Required,
}

/// Force the model to call a specific function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolChoiceFunction {
    /// Must be "function"
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function to call
    pub function: ToolChoiceFunctionName,
}

/// Function name reference within a forced tool choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolChoiceFunctionName {
    /// Name of the function to call
    pub name: String,
}
