//! Drive whole transcripts through the SSE adapters

use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt, stream};
use synapse_transcode::{
    Codecs, DeltaContent, StreamEvent, StreamEventType, UNSET_INDEX, Vendor, decode_sse, encode_sse,
};

/// Feed `transcript` in small uneven chunks, as a socket would
pub async fn decode(codecs: &Codecs, vendor: Vendor, transcript: &str) -> Vec<StreamEvent> {
    let chunks: Vec<Result<Bytes, Infallible>> = transcript
        .as_bytes()
        .chunks(23)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    decode_sse(codecs.get(vendor), stream::iter(chunks)).collect().await
}

pub async fn encode(codecs: &Codecs, vendor: Vendor, events: Vec<StreamEvent>) -> anyhow::Result<String> {
    let frames: Vec<String> = encode_sse(codecs.get(vendor), stream::iter(events))
        .try_collect()
        .await?;
    Ok(frames.concat())
}

/// `data:` payloads of a transcript, parsed as JSON where possible
#[allow(dead_code)]
pub fn data_payloads(transcript: &str) -> Vec<serde_json::Value> {
    transcript
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap_or_else(|_| serde_json::Value::String(data.to_owned())))
        .collect()
}

/// Assert the addressing guarantees every repaired stream must hold
pub fn assert_well_addressed(events: &[StreamEvent]) {
    assert!(!events.is_empty());
    assert_eq!(events[0].event_type, StreamEventType::MessageStart);

    let mut last_sequence = 0;
    let mut content_index_of: HashMap<&str, i64> = HashMap::new();
    for event in events {
        assert!(
            event.sequence_number > last_sequence,
            "sequence went from {last_sequence} to {}",
            event.sequence_number
        );
        last_sequence = event.sequence_number;

        assert_ne!(event.output_index, UNSET_INDEX, "{} has no output index", event.event_type);
        assert_ne!(event.content_index, UNSET_INDEX, "{} has no content index", event.event_type);
        let item_id = event.item_id.as_deref().expect("every event has an item id");

        if event.event_type.is_content_block() {
            let index = *content_index_of.entry(item_id).or_insert(event.content_index);
            assert_eq!(index, event.content_index, "item {item_id} changed content index");
        }

        let is_citation = event
            .delta()
            .is_some_and(|delta| matches!(delta.content, DeltaContent::Citations { .. }));
        if is_citation {
            assert_ne!(event.annotation_index, UNSET_INDEX);
        } else {
            assert_eq!(event.annotation_index, UNSET_INDEX);
        }
    }
}
