//! Offline conversions behind each subcommand

use std::convert::Infallible;
use std::fmt::Write as _;

use anyhow::Context as _;
use futures_util::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use serde_json::Value;
use synapse_transcode::{Codecs, StreamEvent, Vendor, decode_sse, encode_sse};

use crate::args::Target;

pub fn request(codecs: &Codecs, from: Vendor, to: Target, input: &str) -> anyhow::Result<String> {
    let body = parse_json(input)?;
    let contract = codecs.get(from).decode_request(body)?;
    match to {
        Target::Canonical => pretty(&contract),
        Target::Vendor(vendor) => pretty(&codecs.get(vendor).encode_request(&contract)?),
    }
}

pub fn response(codecs: &Codecs, from: Vendor, to: Target, input: &str) -> anyhow::Result<String> {
    let body = parse_json(input)?;
    let contract = codecs.get(from).decode_response(body)?;
    match to {
        Target::Canonical => pretty(&contract),
        Target::Vendor(vendor) => pretty(&codecs.get(vendor).encode_response(&contract)?),
    }
}

/// Canonical output is one JSON event per line; vendor output is SSE
pub async fn stream(codecs: &Codecs, from: Vendor, to: Target, input: String) -> anyhow::Result<String> {
    let bytes = stream::iter([Ok::<_, Infallible>(input.into_bytes())]);
    let events = decode_sse(codecs.get(from), bytes);

    match to {
        Target::Canonical => {
            let events: Vec<StreamEvent> = events.collect().await;
            let mut output = String::new();
            for event in &events {
                writeln!(output, "{}", serde_json::to_string(event)?)?;
            }
            Ok(output)
        }
        Target::Vendor(vendor) => {
            let frames: Vec<String> = encode_sse(codecs.get(vendor), events).try_collect().await?;
            Ok(frames.concat())
        }
    }
}

fn parse_json(input: &str) -> anyhow::Result<Value> {
    serde_json::from_str(input).context("input is not valid JSON")
}

fn pretty<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut output = serde_json::to_string_pretty(value)?;
    output.push('\n');
    Ok(output)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    const OPENAI_STREAM: &str = indoc! {r#"
        data: {"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}

        data: {"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]}

        data: {"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}

        data: [DONE]

    "#};

    #[test]
    fn request_to_canonical() {
        let output = request(
            &Codecs::default(),
            Vendor::OpenAi,
            Target::Canonical,
            r#"{"model": "gpt-4o", "messages": [{"role": "user", "content": "Hi"}]}"#,
        )
        .unwrap();
        let contract: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(contract["source"], json!("openai"));
        assert_eq!(contract["model"], json!("gpt-4o"));
    }

    #[test]
    fn response_between_vendors() {
        let output = response(
            &Codecs::default(),
            Vendor::Anthropic,
            Target::Vendor(Vendor::OpenAi),
            r#"{"id": "msg_1", "type": "message", "role": "assistant", "model": "claude-sonnet-4-5",
                "content": [{"type": "text", "text": "Hello"}], "stop_reason": "max_tokens",
                "stop_sequence": null, "usage": {"input_tokens": 4, "output_tokens": 16}}"#,
        )
        .unwrap();
        let body: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], json!("Hello"));
        assert_eq!(body["choices"][0]["finish_reason"], json!("length"));
        assert_eq!(body["usage"]["total_tokens"], json!(20));
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = request(&Codecs::default(), Vendor::OpenAi, Target::Canonical, "{").unwrap_err();
        assert_eq!(err.to_string(), "input is not valid JSON");
    }

    #[tokio::test]
    async fn stream_to_anthropic() {
        let output = stream(
            &Codecs::default(),
            Vendor::OpenAi,
            Target::Vendor(Vendor::Anthropic),
            OPENAI_STREAM.to_owned(),
        )
        .await
        .unwrap();

        let names: Vec<&str> = output
            .lines()
            .filter_map(|line| line.strip_prefix("event: "))
            .collect();
        assert_eq!(
            names,
            [
                "message_start",
                "content_block_start",
                "content_block_delta",
                "content_block_stop",
                "message_delta",
                "message_stop"
            ]
        );
        assert!(output.contains(r#""stop_reason":"end_turn""#));
    }

    #[tokio::test]
    async fn stream_to_canonical_lines() {
        let output = stream(&Codecs::default(), Vendor::OpenAi, Target::Canonical, OPENAI_STREAM.to_owned())
            .await
            .unwrap();
        let events: Vec<StreamEvent> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].sequence_number, 4);
    }
}
