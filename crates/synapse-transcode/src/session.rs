//! Per-stream conversion session

use std::fmt;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::TranscodeError;
use crate::repair::repair;
use crate::stream_context::SharedStreamIndexContext;
use crate::types::{ErrorDetail, StreamEvent, StreamEventType, StreamPayload};

/// Converts the SSE payloads of one vendor stream into canonical events
///
/// A conversion failure never ends the session. The failing payload turns
/// into a canonical `error` event addressed like any other, and the next
/// payload converts against the same context.
pub struct StreamSession {
    codec: Arc<dyn Codec>,
    context: SharedStreamIndexContext,
}

impl StreamSession {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            context: SharedStreamIndexContext::new(),
        }
    }

    /// Handle to the session's index context
    pub fn context(&self) -> SharedStreamIndexContext {
        self.context.clone()
    }

    /// Convert one `data:` payload
    pub fn convert(&self, data: &str) -> Vec<StreamEvent> {
        let mut ctx = self.context.lock();
        match self.codec.decode_stream_event(data, &mut ctx) {
            Ok(events) => events,
            Err(error) => {
                tracing::warn!(vendor = %self.codec.vendor(), %error, "stream event conversion failed");
                drop(ctx);
                vec![self.error_event(&error)]
            }
        }
    }

    /// Canonical `error` event for a failure outside the vendor payload
    pub fn error_event(&self, error: &TranscodeError) -> StreamEvent {
        let mut event = StreamEvent::new(StreamEventType::Error, self.codec.vendor())
            .with_payload(StreamPayload::Error(ErrorDetail::new(error.error_type(), error.to_string())));
        repair(&mut event, &mut self.context.lock());
        event
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("vendor", &self.codec.vendor())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codecs;
    use crate::types::Vendor;

    #[test]
    fn bad_payload_becomes_error_event_and_stream_continues() {
        let session = StreamSession::new(Codecs::default().get(Vendor::Anthropic));

        let start = session.convert(
            r#"{"type":"message_start","message":{"id":"msg_1","type":"message","role":"assistant","model":"claude","content":[],"stop_reason":null,"stop_sequence":null,"usage":{"input_tokens":3,"output_tokens":1}}}"#,
        );
        let failed = session.convert(r#"{"type":"content_block_wiggle","index":0}"#);
        let ping = session.convert(r#"{"type":"ping"}"#);

        assert_eq!(start[0].event_type, StreamEventType::MessageStart);
        let error = &failed[0];
        assert_eq!(error.event_type, StreamEventType::Error);
        assert_eq!(error.error().unwrap().error_type, "invalid_request_error");
        assert_eq!(error.message_id.as_deref(), Some("msg_1"));
        assert!(error.output_index >= 0 && error.content_index >= 0);
        assert!(error.item_id.is_some());

        assert_eq!(ping[0].event_type, StreamEventType::Ping);
        assert_eq!(
            [start[0].sequence_number, error.sequence_number, ping[0].sequence_number],
            [1, 2, 3]
        );
        assert_eq!(session.context().sequence(), 3);
    }

    #[test]
    fn blank_payloads_yield_nothing() {
        let session = StreamSession::new(Codecs::default().get(Vendor::OpenAi));
        assert!(session.convert("  ").is_empty());
        assert_eq!(session.context().sequence(), 0);
    }
}
