mod harness;

use harness::fixtures::ANTHROPIC_TOOL_STREAM;
use harness::sse::{decode, encode};
use indoc::indoc;
use serde_json::{Value, json};
use synapse_config::Config;
use synapse_transcode::{Codecs, Vendor};

fn codecs(toml: &str) -> Codecs {
    Codecs::new(Config::parse(toml).unwrap().transcode)
}

fn with_unknown_block() -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-5",
        "content": [
            {"type": "container_upload", "file_id": "file_01"},
            {"type": "text", "text": "Done."}
        ],
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": {"input_tokens": 10, "output_tokens": 2}
    })
}

#[test]
fn default_max_tokens_comes_from_config() {
    let codecs = codecs(indoc! {r"
        [transcode]
        default_max_tokens = 1000
    "});
    let contract = codecs
        .get(Vendor::OpenAi)
        .decode_request(json!({"model": "gpt-4o", "messages": [{"role": "user", "content": "Hi"}]}))
        .unwrap();
    let messages = codecs.get(Vendor::Anthropic).encode_request(&contract).unwrap();

    assert_eq!(messages["max_tokens"], 1000);
}

#[test]
fn unknown_content_is_preserved_by_default() {
    let codecs = codecs("");
    let contract = codecs.get(Vendor::Anthropic).decode_response(with_unknown_block()).unwrap();
    let back = codecs.get(Vendor::Anthropic).encode_response(&contract).unwrap();

    assert_eq!(back, with_unknown_block());
}

#[test]
fn unknown_content_can_be_dropped() {
    let codecs = codecs(indoc! {r#"
        [transcode]
        unknown_content = "drop"
    "#});
    let contract = codecs.get(Vendor::Anthropic).decode_response(with_unknown_block()).unwrap();
    assert_eq!(contract.choices[0].message.parts.len(), 1);

    let back = codecs.get(Vendor::Anthropic).encode_response(&contract).unwrap();
    assert_eq!(back["content"], json!([{"type": "text", "text": "Done."}]));
}

#[tokio::test]
async fn stream_events_carry_no_raw_without_capture() {
    let codecs = codecs(indoc! {r"
        [transcode]
        capture_raw = false
    "});
    let events = decode(&codecs, Vendor::Anthropic, ANTHROPIC_TOOL_STREAM).await;

    for event in &events {
        assert!(event.delta().is_none_or(|delta| delta.raw.is_none()));
        assert!(event.content().is_none_or(|content| content.raw.is_none()));
        assert!(event.message_delta().is_none_or(|delta| delta.raw.is_none()));
    }

    let transcript = encode(&codecs, Vendor::Anthropic, events).await.unwrap();
    let names: Vec<&str> = transcript
        .lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect();
    let expected: Vec<&str> = ANTHROPIC_TOOL_STREAM
        .lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect();
    assert_eq!(names, expected);
    assert!(transcript.contains(r#""partial_json":"ris\"}""#));
}

#[test]
fn invalid_config_is_rejected() {
    assert!(Config::parse("[transcode]\ndefault_max_tokens = 0").is_err());
    assert!(Config::parse("[transcode]\nunknown_content = \"shred\"").is_err());
}
