//! Vendor transcripts and bodies shaped like real traffic

#![allow(dead_code)]

use indoc::indoc;

/// Thinking, text with a citation, then a tool call
pub const ANTHROPIC_TOOL_STREAM: &str = indoc! {r#"
    event: message_start
    data: {"type":"message_start","message":{"id":"msg_01","type":"message","role":"assistant","content":[],"model":"claude-sonnet-4-5","stop_reason":null,"stop_sequence":null,"usage":{"input_tokens":472,"output_tokens":2,"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}

    event: content_block_start
    data: {"type":"content_block_start","index":0,"content_block":{"type":"thinking","thinking":""}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"The user wants the weather."}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":0,"delta":{"type":"signature_delta","signature":"EqQBCgIYAhIM"}}

    event: content_block_stop
    data: {"type":"content_block_stop","index":0}

    event: content_block_start
    data: {"type":"content_block_start","index":1,"content_block":{"type":"text","text":""}}

    event: ping
    data: {"type":"ping"}

    event: content_block_delta
    data: {"type":"content_block_delta","index":1,"delta":{"type":"text_delta","text":"Checking Paris"}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":1,"delta":{"type":"citations_delta","citation":{"type":"char_location","cited_text":"Paris","document_index":0,"start_char_index":0,"end_char_index":5}}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":1,"delta":{"type":"citations_delta","citation":{"type":"char_location","cited_text":"weather","document_index":0,"start_char_index":6,"end_char_index":13}}}

    event: content_block_stop
    data: {"type":"content_block_stop","index":1}

    event: content_block_start
    data: {"type":"content_block_start","index":2,"content_block":{"type":"tool_use","id":"toolu_01","name":"get_weather","input":{}}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":2,"delta":{"type":"input_json_delta","partial_json":""}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":2,"delta":{"type":"input_json_delta","partial_json":"{\"city\": \"Pa"}}

    event: content_block_delta
    data: {"type":"content_block_delta","index":2,"delta":{"type":"input_json_delta","partial_json":"ris\"}"}}

    event: content_block_stop
    data: {"type":"content_block_stop","index":2}

    event: message_delta
    data: {"type":"message_delta","delta":{"stop_reason":"tool_use","stop_sequence":null},"usage":{"output_tokens":89}}

    event: message_stop
    data: {"type":"message_stop"}

"#};

/// Text, then two parallel tool calls, then a usage-only chunk
pub const OPENAI_TOOL_STREAM: &str = indoc! {r#"
    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Let me check."},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_a","type":"function","function":{"name":"get_weather","arguments":""}}]},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"city\":\"Paris\"}"}}]},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":1,"id":"call_b","type":"function","function":{"name":"get_time","arguments":""}}]},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":1,"function":{"arguments":"{\"tz\":\"CET\"}"}}]},"finish_reason":null}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}

    data: {"id":"chatcmpl-9","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[],"usage":{"prompt_tokens":82,"completion_tokens":40,"total_tokens":122,"prompt_tokens_details":{"cached_tokens":0},"completion_tokens_details":{"reasoning_tokens":0}}}

    data: [DONE]

"#};

pub const ANTHROPIC_REQUEST: &str = indoc! {r#"
    {
      "model": "claude-sonnet-4-5",
      "max_tokens": 2048,
      "system": [{"type": "text", "text": "You are a weather bot.", "cache_control": {"type": "ephemeral"}}],
      "messages": [
        {"role": "user", "content": "Weather in Paris?"},
        {"role": "assistant", "content": [
          {"type": "text", "text": "Checking."},
          {"type": "tool_use", "id": "toolu_01", "name": "get_weather", "input": {"city": "Paris"}}
        ]},
        {"role": "user", "content": [
          {"type": "tool_result", "tool_use_id": "toolu_01", "content": "15C and sunny"}
        ]}
      ],
      "tools": [
        {"type": "web_search_20250305", "name": "web_search", "max_uses": 2},
        {"name": "get_weather", "description": "Current weather", "input_schema": {"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}}
      ],
      "tool_choice": {"type": "tool", "name": "get_weather"},
      "temperature": 0.3,
      "stop_sequences": ["\n\nHuman:"],
      "metadata": {"user_id": "user-42"},
      "mcp_servers": [{"type": "url", "url": "https://mcp.example.com/sse", "name": "example"}]
    }
"#};

pub const OPENAI_REQUEST: &str = indoc! {r#"
    {
      "model": "gpt-4o",
      "messages": [
        {"role": "developer", "content": "You are a weather bot."},
        {"role": "user", "content": [
          {"type": "text", "text": "What is in this image?"},
          {"type": "image_url", "image_url": {"url": "https://example.com/cloud.png", "detail": "low"}}
        ]},
        {"role": "assistant", "tool_calls": [
          {"id": "call_a", "type": "function", "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}}
        ]},
        {"role": "tool", "tool_call_id": "call_a", "content": "15C"}
      ],
      "max_tokens": 300,
      "stop": ["END"],
      "presence_penalty": 0.5,
      "tools": [{"type": "function", "function": {"name": "get_weather", "description": "Current weather", "parameters": {"type": "object", "properties": {"city": {"type": "string"}}}}}],
      "tool_choice": "required",
      "logprobs": true,
      "top_logprobs": 2,
      "user": "user-42"
    }
"#};

pub const ANTHROPIC_RESPONSE: &str = indoc! {r#"
    {
      "id": "msg_01",
      "type": "message",
      "role": "assistant",
      "model": "claude-sonnet-4-5",
      "content": [
        {"type": "thinking", "thinking": "Need the tool.", "signature": "EqQB"},
        {"type": "text", "text": "Let me look that up."},
        {"type": "tool_use", "id": "toolu_01", "name": "get_weather", "input": {"city": "Paris"}}
      ],
      "stop_reason": "tool_use",
      "stop_sequence": null,
      "usage": {"input_tokens": 120, "output_tokens": 45, "cache_creation_input_tokens": 0, "cache_read_input_tokens": 100, "service_tier": "standard"}
    }
"#};

pub const OPENAI_RESPONSE: &str = indoc! {r#"
    {
      "id": "chatcmpl-9",
      "object": "chat.completion",
      "created": 1700000000,
      "model": "gpt-4o",
      "choices": [{
        "index": 0,
        "message": {"role": "assistant", "content": "It is 15C in Paris."},
        "finish_reason": "length"
      }],
      "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60},
      "system_fingerprint": "fp_abc"
    }
"#};
