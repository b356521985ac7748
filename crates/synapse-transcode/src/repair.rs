//! Stream index repair
//!
//! Vendor stream protocols do not address every event the same way: some
//! events carry an index, some an id, some neither. [`repair`] fills the gaps
//! from the stream's [`StreamIndexContext`] so every canonical event leaves the
//! converter with a complete and stable addressing tuple.

use crate::stream_context::StreamIndexContext;
use crate::types::{ContentPart, DeltaType, StreamEvent, StreamEventType, UNSET_INDEX};

/// Resolve the sequence number, output index, item id, content index and
/// annotation index of `event`
///
/// Values the vendor supplied (including 0) are kept. An `output_index`
/// already set by the converter counts as an explicit hint; otherwise the
/// message decides it. A supplied sequence number moves the context's
/// counter forward, and annotation indices count per item.
pub fn repair(event: &mut StreamEvent, ctx: &mut StreamIndexContext) {
    if event.sequence_number == 0 {
        event.sequence_number = ctx.next_sequence();
    } else {
        ctx.observe_sequence(event.sequence_number);
    }

    if event.event_type == StreamEventType::MessageStart
        && let Some(message_id) = &event.message_id
    {
        ctx.set_message_id(message_id.clone());
    }
    if event.message_id.is_none() {
        event.message_id = ctx.get_message_id().map(str::to_owned);
    }
    if event.response_id.is_none() {
        event.response_id.clone_from(&event.message_id);
    }

    if event.output_index == UNSET_INDEX {
        let key = event.message_id.as_deref().unwrap_or_default();
        event.output_index = ctx.ensure_output_index(key);
    }

    let item_id = resolve_item_id(event, ctx);
    if event.event_type == StreamEventType::ContentBlockStart {
        ctx.set_item_id(item_id.clone());
    }

    event.content_index = ctx.ensure_content_index(&item_id, event.content_index);

    if event.delta().is_some_and(|delta| delta.delta_type() == DeltaType::Citations) {
        let key = event.sequence_number.to_string();
        event.annotation_index = ctx.ensure_annotation_index(&item_id, &key, event.annotation_index);
    }

    event.item_id = Some(item_id);
}

/// Item id by priority: explicit tool id, message id for message-level
/// events, composite key for content-block events, then the current item
fn resolve_item_id(event: &StreamEvent, ctx: &mut StreamIndexContext) -> String {
    let explicit = event.item_id.clone().or_else(|| tool_id(event));
    let response_id = event.response_id.as_deref().unwrap_or_default();

    if !event.event_type.is_content_block() {
        if let Some(id) = explicit.or_else(|| event.message_id.clone()) {
            return id;
        }
        if let Some(current) = ctx.get_item_id() {
            return current.to_owned();
        }
        return ctx.ensure_item_id(&format!("{response_id}:{}", event.output_index));
    }

    if event.content_index == UNSET_INDEX {
        // Without a vendor index there is no stable composite key: a start
        // opens a fresh item, later events belong to the current one.
        if let Some(id) = explicit {
            return id;
        }
        if event.event_type != StreamEventType::ContentBlockStart
            && let Some(current) = ctx.get_item_id()
        {
            return current.to_owned();
        }
        let key = format!("{response_id}:{}:@{}", event.output_index, event.sequence_number);
        return ctx.ensure_item_id(&key);
    }

    let key = format!("{response_id}:{}:{}", event.output_index, event.content_index);
    match explicit {
        Some(id) => {
            ctx.bind_item_id(&key, &id);
            id
        }
        None => ctx.ensure_item_id(&key),
    }
}

fn tool_id(event: &StreamEvent) -> Option<String> {
    match event.content()?.part.as_ref()? {
        ContentPart::ToolUse(tool_use) | ContentPart::ServerToolUse(tool_use) => Some(tool_use.id.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BlockKind, ContentBlock, DeltaContent, Extras, Opaque, StreamDelta, StreamPayload, ToolUsePart, Vendor,
    };

    fn event(event_type: StreamEventType) -> StreamEvent {
        StreamEvent::new(event_type, Vendor::Anthropic)
    }

    fn block_event(event_type: StreamEventType, index: i64) -> StreamEvent {
        let mut e = event(event_type);
        e.content_index = index;
        e
    }

    fn tool_start(index: i64, id: &str) -> StreamEvent {
        block_event(StreamEventType::ContentBlockStart, index).with_payload(StreamPayload::Content(ContentBlock {
            kind: BlockKind::ToolUse,
            part: Some(ContentPart::ToolUse(ToolUsePart {
                id: id.to_owned(),
                name: "get_weather".to_owned(),
                input: Opaque::from_value(&serde_json::json!({})),
                extras: Extras::new(),
            })),
            raw: None,
        }))
    }

    fn text_delta(index: i64) -> StreamEvent {
        block_event(StreamEventType::ContentBlockDelta, index).with_payload(StreamPayload::Delta(StreamDelta {
            content: DeltaContent::Text { text: "hi".to_owned() },
            raw: None,
        }))
    }

    fn started(ctx: &mut StreamIndexContext) {
        let mut start = event(StreamEventType::MessageStart);
        start.message_id = Some("msg_1".to_owned());
        repair(&mut start, ctx);
    }

    #[test]
    fn tool_use_start_keeps_tool_id_and_index() {
        let mut ctx = StreamIndexContext::new();
        started(&mut ctx);

        let mut e = tool_start(2, "toolu_123");
        repair(&mut e, &mut ctx);

        assert_eq!(e.content_index, 2);
        assert_eq!(e.item_id.as_deref(), Some("toolu_123"));
        assert_eq!(ctx.get_item_id(), Some("toolu_123"));
    }

    #[test]
    fn tool_deltas_resolve_to_tool_id() {
        let mut ctx = StreamIndexContext::new();
        started(&mut ctx);
        let mut start = tool_start(1, "toolu_9");
        repair(&mut start, &mut ctx);

        let mut delta = block_event(StreamEventType::ContentBlockDelta, 1);
        repair(&mut delta, &mut ctx);
        let mut stop = block_event(StreamEventType::ContentBlockStop, 1);
        repair(&mut stop, &mut ctx);

        assert_eq!(delta.item_id.as_deref(), Some("toolu_9"));
        assert_eq!(stop.item_id.as_deref(), Some("toolu_9"));
        assert_eq!(stop.content_index, 1);
    }

    #[test]
    fn message_events_use_message_id() {
        let mut ctx = StreamIndexContext::new();
        let mut start = event(StreamEventType::MessageStart);
        start.message_id = Some("msg_1".to_owned());
        repair(&mut start, &mut ctx);

        let mut delta = event(StreamEventType::MessageDelta);
        repair(&mut delta, &mut ctx);

        assert_eq!(start.item_id.as_deref(), Some("msg_1"));
        assert_eq!(delta.item_id.as_deref(), Some("msg_1"));
        assert_eq!(delta.message_id.as_deref(), Some("msg_1"));
        assert_eq!(delta.response_id.as_deref(), Some("msg_1"));
        assert_eq!(delta.output_index, 0);
        assert_eq!(delta.content_index, start.content_index);
    }

    #[test]
    fn vendor_zero_is_never_overwritten() {
        let mut ctx = StreamIndexContext::new();
        started(&mut ctx);
        ctx.ensure_content_index("other", -1);

        let mut e = text_delta(0);
        e.output_index = 0;
        repair(&mut e, &mut ctx);
        assert_eq!(e.content_index, 0);
        assert_eq!(e.output_index, 0);
    }

    #[test]
    fn explicit_output_index_is_kept() {
        let mut ctx = StreamIndexContext::new();
        let mut e = text_delta(0);
        e.output_index = 3;
        repair(&mut e, &mut ctx);
        assert_eq!(e.output_index, 3);
    }

    #[test]
    fn sentinels_are_resolved() {
        let mut ctx = StreamIndexContext::new();
        for event_type in [
            StreamEventType::Ping,
            StreamEventType::ContentBlockStart,
            StreamEventType::ContentBlockDelta,
            StreamEventType::Error,
        ] {
            let mut e = event(event_type);
            repair(&mut e, &mut ctx);
            assert_ne!(e.output_index, UNSET_INDEX);
            assert_ne!(e.content_index, UNSET_INDEX);
            assert!(e.item_id.is_some());
        }
    }

    #[test]
    fn supplied_sequence_is_kept() {
        let mut ctx = StreamIndexContext::new();
        let mut e = event(StreamEventType::Ping);
        e.sequence_number = 42;
        repair(&mut e, &mut ctx);
        assert_eq!(e.sequence_number, 42);

        let mut next = event(StreamEventType::Ping);
        repair(&mut next, &mut ctx);
        assert_eq!(next.sequence_number, 43);
    }

    #[test]
    fn unindexed_deltas_follow_current_item() {
        let mut ctx = StreamIndexContext::new();
        started(&mut ctx);
        let mut start = event(StreamEventType::ContentBlockStart);
        repair(&mut start, &mut ctx);
        let mut delta = event(StreamEventType::ContentBlockDelta);
        repair(&mut delta, &mut ctx);

        assert_eq!(start.item_id, delta.item_id);
        assert_eq!(start.content_index, delta.content_index);
    }

    #[test]
    fn citation_deltas_get_annotation_indices() {
        let mut ctx = StreamIndexContext::new();
        started(&mut ctx);
        let citation = |ctx: &mut StreamIndexContext, index: i64| {
            let mut e = block_event(StreamEventType::ContentBlockDelta, index).with_payload(StreamPayload::Delta(
                StreamDelta {
                    content: DeltaContent::Citations {
                        citation: Opaque::from_value(&serde_json::json!({"type": "web_search_result_location"})),
                    },
                    raw: None,
                },
            ));
            repair(&mut e, ctx);
            e.annotation_index
        };
        let first = citation(&mut ctx, 0);
        let second = citation(&mut ctx, 0);
        assert_eq!(first, 0);
        assert_eq!(second, 1);

        let other_block = citation(&mut ctx, 1);
        assert_eq!(other_block, 0);
        assert_eq!(citation(&mut ctx, 1), 1);
        assert_eq!(citation(&mut ctx, 0), 2);

        let mut plain = text_delta(0);
        repair(&mut plain, &mut ctx);
        assert_eq!(plain.annotation_index, UNSET_INDEX);
    }
}
