//! Tool definitions and tool choice

use serde_json::{Value, json};

use super::content::CACHE_CONTROL;
use crate::protocol::anthropic::{CustomTool, Tool, ToolChoice as AnthropicToolChoice};
use crate::types::{
    Extras, FunctionDefinition, Opaque, PassthroughTool, ToolChoice, ToolChoiceMode, ToolDefinition,
};

/// `vendor_extras` key holding built-in tools
pub const TOOLS_EXTRAS: &str = "tools_extras";

const TOOL_TYPE: &str = "type";

// -- Inbound --

/// Split wire tools into canonical function tools and verbatim built-ins
pub fn split_tools(tools: Vec<Tool>) -> (Vec<ToolDefinition>, Vec<PassthroughTool>) {
    let mut functions = Vec::new();
    let mut builtins = Vec::new();
    for (position, tool) in tools.into_iter().enumerate() {
        match tool {
            Tool::Custom(custom) => functions.push(custom_to_definition(custom)),
            Tool::Builtin(value) => builtins.push(PassthroughTool {
                tool_type: value.get("type").and_then(Value::as_str).unwrap_or_default().to_owned(),
                tool: Opaque::from_value(&value),
                position,
            }),
        }
    }
    (functions, builtins)
}

fn custom_to_definition(tool: CustomTool) -> ToolDefinition {
    let mut extras = Extras::new();
    extras.insert_opt(CACHE_CONTROL, tool.cache_control.as_ref());
    extras.insert_opt(TOOL_TYPE, tool.tool_type.as_ref());

    ToolDefinition {
        tool_type: "function".to_owned(),
        function: FunctionDefinition {
            name: tool.name,
            description: tool.description,
            parameters: Some(Opaque::from_value(&tool.input_schema)),
            strict: None,
        },
        extras,
    }
}

/// Tool choice plus the parallel tool use flag it carries
pub fn tool_choice_to_canonical(choice: &AnthropicToolChoice) -> (ToolChoice, Option<bool>) {
    let canonical = match choice {
        AnthropicToolChoice::Auto { .. } => ToolChoice::Mode(ToolChoiceMode::Auto),
        AnthropicToolChoice::Any { .. } => ToolChoice::Mode(ToolChoiceMode::Required),
        AnthropicToolChoice::Tool { name, .. } => ToolChoice::named(name.clone()),
        AnthropicToolChoice::None => ToolChoice::Mode(ToolChoiceMode::None),
    };
    let parallel = choice.disable_parallel_tool_use().map(|disabled| !disabled);
    (canonical, parallel)
}

// -- Outbound --

/// Rebuild the wire tool list, putting built-ins back at their positions
pub fn merge_tools(functions: &[ToolDefinition], builtins: &[PassthroughTool]) -> Vec<Tool> {
    let mut tools: Vec<Tool> = functions.iter().map(|tool| Tool::Custom(definition_to_custom(tool))).collect();

    let mut builtins: Vec<&PassthroughTool> = builtins.iter().collect();
    builtins.sort_by_key(|tool| tool.position);
    for builtin in builtins {
        let value = match builtin.tool.to_value() {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(tool_type = %builtin.tool_type, %error, "dropping built-in tool that failed to decode");
                continue;
            }
        };
        let position = builtin.position.min(tools.len());
        tools.insert(position, Tool::Builtin(value));
    }
    tools
}

fn definition_to_custom(tool: &ToolDefinition) -> CustomTool {
    let input_schema = tool
        .function
        .parameters
        .as_ref()
        .and_then(|parameters| parameters.to_value().ok())
        .unwrap_or_else(|| json!({"type": "object"}));

    CustomTool {
        tool_type: tool.extras.get_value(TOOL_TYPE),
        name: tool.function.name.clone(),
        description: tool.function.description.clone(),
        input_schema,
        cache_control: tool.extras.get_value(CACHE_CONTROL),
    }
}

pub fn tool_choice_to_wire(choice: &ToolChoice, parallel: Option<bool>) -> AnthropicToolChoice {
    let disable_parallel_tool_use = parallel.map(|parallel| !parallel);
    match choice {
        ToolChoice::Mode(ToolChoiceMode::None) => AnthropicToolChoice::None,
        ToolChoice::Mode(ToolChoiceMode::Auto) => AnthropicToolChoice::Auto {
            disable_parallel_tool_use,
        },
        ToolChoice::Mode(ToolChoiceMode::Required) => AnthropicToolChoice::Any {
            disable_parallel_tool_use,
        },
        ToolChoice::Function(function) => AnthropicToolChoice::Tool {
            name: function.function.name.clone(),
            disable_parallel_tool_use,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools(value: Value) -> Vec<Tool> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn builtins_return_to_their_positions() {
        let raw = json!([
            {"type": "bash_20250124", "name": "bash"},
            {"name": "get_weather", "description": "Weather", "input_schema": {"type": "object"}},
            {"type": "web_search_20250305", "name": "web_search", "max_uses": 3},
            {"type": "custom", "name": "lookup", "input_schema": {"type": "object"},
             "cache_control": {"type": "ephemeral"}}
        ]);
        let (functions, builtins) = split_tools(tools(raw.clone()));
        assert_eq!(functions.len(), 2);
        assert_eq!(builtins.len(), 2);
        assert_eq!(builtins[0].tool_type, "bash_20250124");
        assert_eq!(builtins[1].position, 2);

        let merged = merge_tools(&functions, &builtins);
        assert_eq!(serde_json::to_value(&merged).unwrap(), raw);
    }

    #[test]
    fn missing_schema_defaults_to_object() {
        let tool = ToolDefinition::function(FunctionDefinition {
            name: "noop".to_owned(),
            description: None,
            parameters: None,
            strict: None,
        });
        let merged = merge_tools(&[tool], &[]);
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!([{"name": "noop", "input_schema": {"type": "object"}}])
        );
    }

    #[test]
    fn tool_choice_carries_parallel_flag() {
        let wire = AnthropicToolChoice::Any {
            disable_parallel_tool_use: Some(true),
        };
        let (choice, parallel) = tool_choice_to_canonical(&wire);
        assert_eq!(choice, ToolChoice::Mode(ToolChoiceMode::Required));
        assert_eq!(parallel, Some(false));
        assert_eq!(tool_choice_to_wire(&choice, parallel), wire);

        let named = ToolChoice::named("get_weather");
        assert_eq!(
            tool_choice_to_wire(&named, None),
            AnthropicToolChoice::Tool {
                name: "get_weather".to_owned(),
                disable_parallel_tool_use: None,
            }
        );
    }
}
