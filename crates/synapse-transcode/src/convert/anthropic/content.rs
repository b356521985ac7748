//! Content block conversion

use serde_json::{Value, json};
use synapse_config::TranscodeConfig;

use crate::protocol::anthropic::{
    ContentBlock, DocumentBlock, ImageBlock, RedactedThinkingBlock, SearchResultBlock, Source, TextBlock,
    ThinkingBlock, ToolResultBlock, ToolResultContent, ToolUseBlock, WebSearchToolResultBlock,
};
use crate::types::{
    ContentPart, DocumentPart, Extras, MediaPart, MediaSource, Opaque, OtherPart, RedactedThinkingPart, SearchResultPart,
    TextPart, ThinkingPart, ToolOutput, ToolResultPart, ToolUsePart, Vendor, VendorRaw, WebSearchResultPart,
};

pub const CACHE_CONTROL: &str = "cache_control";
pub const CITATIONS: &str = "citations";

// -- Inbound: Anthropic -> canonical --

/// Convert one block, or `None` when it is unknown and the policy drops it
pub fn block_to_part(block: ContentBlock, config: &TranscodeConfig) -> Option<ContentPart> {
    let part = match block {
        ContentBlock::Text(text) => ContentPart::Text(TextPart {
            extras: wire_extras(text.cache_control.as_ref(), text.citations.as_ref()),
            text: text.text,
        }),
        ContentBlock::Image(image) => ContentPart::Image(MediaPart {
            extras: wire_extras(image.cache_control.as_ref(), None::<&Value>),
            source: source_to_canonical(image.source, config),
        }),
        ContentBlock::Document(document) => ContentPart::Document(DocumentPart {
            extras: wire_extras(document.cache_control.as_ref(), document.citations.as_ref()),
            source: source_to_canonical(document.source, config),
            title: document.title,
            context: document.context,
        }),
        ContentBlock::ToolUse(tool_use) => ContentPart::ToolUse(tool_use_part(tool_use)),
        ContentBlock::ServerToolUse(tool_use) => ContentPart::ServerToolUse(tool_use_part(tool_use)),
        ContentBlock::ToolResult(result) => ContentPart::ToolResult(ToolResultPart {
            extras: wire_extras(result.cache_control.as_ref(), None::<&Value>),
            tool_use_id: result.tool_use_id,
            output: result.content.map(|content| match content {
                ToolResultContent::Text(text) => ToolOutput::Text(text),
                ToolResultContent::Blocks(blocks) => ToolOutput::Parts(blocks_to_parts(blocks, config)),
            }),
            is_error: result.is_error,
        }),
        ContentBlock::Thinking(thinking) => ContentPart::Thinking(ThinkingPart {
            thinking: thinking.thinking,
            signature: thinking.signature,
            extras: Extras::new(),
        }),
        ContentBlock::RedactedThinking(redacted) => ContentPart::RedactedThinking(RedactedThinkingPart {
            data: redacted.data,
            extras: Extras::new(),
        }),
        ContentBlock::WebSearchToolResult(result) => ContentPart::WebSearchResult(WebSearchResultPart {
            extras: wire_extras(result.cache_control.as_ref(), None::<&Value>),
            tool_use_id: result.tool_use_id,
            content: Opaque::from_value(&result.content),
        }),
        ContentBlock::SearchResult(result) => ContentPart::SearchResult(SearchResultPart {
            extras: wire_extras(result.cache_control.as_ref(), result.citations.as_ref()),
            source: result.source,
            title: result.title,
            content: blocks_to_parts(result.content, config),
        }),
        ContentBlock::Unknown(value) => return unknown_part(value, config),
    };
    Some(part)
}

pub fn blocks_to_parts(blocks: Vec<ContentBlock>, config: &TranscodeConfig) -> Vec<ContentPart> {
    blocks
        .into_iter()
        .filter_map(|block| block_to_part(block, config))
        .collect()
}

fn unknown_part(value: Value, config: &TranscodeConfig) -> Option<ContentPart> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();
    if !config.preserve_unknown() {
        tracing::debug!(kind = %kind, "dropping unknown content block");
        return None;
    }
    Some(ContentPart::Other(OtherPart {
        kind,
        raw: VendorRaw {
            vendor: Vendor::Anthropic,
            data: Opaque::from_value(&value),
        },
    }))
}

fn tool_use_part(tool_use: ToolUseBlock) -> ToolUsePart {
    ToolUsePart {
        extras: wire_extras(tool_use.cache_control.as_ref(), None::<&Value>),
        id: tool_use.id,
        name: tool_use.name,
        input: Opaque::from_value(&tool_use.input),
    }
}

fn source_to_canonical(source: Source, config: &TranscodeConfig) -> MediaSource {
    match source {
        Source::Base64 { media_type, data } => MediaSource::Base64 { media_type, data },
        Source::Url { url } => MediaSource::Url { url },
        Source::Text { media_type, data } => MediaSource::Text { media_type, data },
        Source::File { file_id } => MediaSource::File { file_id },
        Source::Content { content } => MediaSource::Content {
            parts: blocks_to_parts(content, config),
        },
    }
}

fn wire_extras(cache_control: Option<&Value>, citations: Option<&impl serde::Serialize>) -> Extras {
    let mut extras = Extras::new();
    extras.insert_opt(CACHE_CONTROL, cache_control);
    extras.insert_opt(CITATIONS, citations);
    extras
}

// -- Outbound: canonical -> Anthropic --

/// Convert one part, or `None` when Anthropic has no block for it
pub fn part_to_block(part: &ContentPart) -> Option<ContentBlock> {
    let block = match part {
        ContentPart::Text(text) => ContentBlock::Text(TextBlock {
            text: text.text.clone(),
            citations: text.extras.get_value(CITATIONS),
            cache_control: text.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::Image(image) => ContentBlock::Image(ImageBlock {
            source: source_to_wire(&image.source),
            cache_control: image.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::Document(document) => ContentBlock::Document(DocumentBlock {
            source: source_to_wire(&document.source),
            title: document.title.clone(),
            context: document.context.clone(),
            citations: document.extras.get_value(CITATIONS),
            cache_control: document.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::ToolUse(tool_use) => ContentBlock::ToolUse(tool_use_block(tool_use)),
        ContentPart::ServerToolUse(tool_use) => ContentBlock::ServerToolUse(tool_use_block(tool_use)),
        ContentPart::ToolResult(result) => ContentBlock::ToolResult(ToolResultBlock {
            tool_use_id: result.tool_use_id.clone(),
            content: result.output.as_ref().map(|output| match output {
                ToolOutput::Text(text) => ToolResultContent::Text(text.clone()),
                ToolOutput::Parts(parts) => ToolResultContent::Blocks(parts_to_blocks(parts)),
            }),
            is_error: result.is_error,
            cache_control: result.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::Thinking(thinking) => ContentBlock::Thinking(ThinkingBlock {
            thinking: thinking.thinking.clone(),
            signature: thinking.signature.clone(),
        }),
        ContentPart::RedactedThinking(redacted) => ContentBlock::RedactedThinking(RedactedThinkingBlock {
            data: redacted.data.clone(),
        }),
        ContentPart::WebSearchResult(result) => ContentBlock::WebSearchToolResult(WebSearchToolResultBlock {
            tool_use_id: result.tool_use_id.clone(),
            content: opaque_or_null(&result.content),
            cache_control: result.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::SearchResult(result) => ContentBlock::SearchResult(SearchResultBlock {
            source: result.source.clone(),
            title: result.title.clone(),
            content: parts_to_blocks(&result.content),
            citations: result.extras.get_value(CITATIONS),
            cache_control: result.extras.get_value(CACHE_CONTROL),
        }),
        ContentPart::Other(other) => {
            let Some(raw) = VendorRaw::replay::<Value>(Some(&other.raw), Vendor::Anthropic) else {
                tracing::debug!(kind = %other.kind, vendor = %other.raw.vendor, "dropping foreign content part");
                return None;
            };
            ContentBlock::Unknown(raw)
        }
    };
    Some(block)
}

pub fn parts_to_blocks(parts: &[ContentPart]) -> Vec<ContentBlock> {
    parts.iter().filter_map(part_to_block).collect()
}

fn tool_use_block(tool_use: &ToolUsePart) -> ToolUseBlock {
    ToolUseBlock {
        id: tool_use.id.clone(),
        name: tool_use.name.clone(),
        input: tool_input(&tool_use.input),
        cache_control: tool_use.extras.get_value(CACHE_CONTROL),
    }
}

/// Tool input as a JSON object, `{}` when it does not parse
pub fn tool_input(input: &Opaque) -> Value {
    input.to_value().unwrap_or_else(|error| {
        tracing::warn!(%error, "tool input is not valid JSON, sending empty object");
        json!({})
    })
}

fn opaque_or_null(value: &Opaque) -> Value {
    value.to_value().unwrap_or_else(|error| {
        tracing::warn!(%error, "opaque content is not valid JSON");
        Value::Null
    })
}

fn source_to_wire(source: &MediaSource) -> Source {
    match source {
        MediaSource::Base64 { media_type, data } => Source::Base64 {
            media_type: media_type.clone(),
            data: data.clone(),
        },
        MediaSource::Url { url } => Source::Url { url: url.clone() },
        MediaSource::Text { media_type, data } => Source::Text {
            media_type: media_type.clone(),
            data: data.clone(),
        },
        MediaSource::File { file_id } => Source::File {
            file_id: file_id.clone(),
        },
        MediaSource::Content { parts } => Source::Content {
            content: parts_to_blocks(parts),
        },
    }
}
