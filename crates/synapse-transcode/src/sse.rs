//! Server-sent event stream adapters

use std::fmt;
use std::sync::Arc;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, stream};

use crate::codec::{Codec, EncodeState};
use crate::error::TranscodeError;
use crate::session::StreamSession;
use crate::types::StreamEvent;

/// Canonical events from a vendor SSE byte stream
///
/// One [`StreamSession`] spans the whole stream. Payloads that fail to
/// convert, and transport errors, come out as canonical `error` events.
pub fn decode_sse<S, B, E>(codec: Arc<dyn Codec>, bytes: S) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    let session = StreamSession::new(codec);
    bytes.eventsource().flat_map(move |result| {
        let events = match result {
            Ok(event) => session.convert(&event.data),
            Err(error) => {
                tracing::warn!(%error, "event stream read failed");
                vec![session.error_event(&TranscodeError::Internal(format!("event stream read failed: {error}")))]
            }
        };
        stream::iter(events)
    })
}

/// Vendor SSE text frames for a stream of canonical events
pub fn encode_sse<S>(codec: Arc<dyn Codec>, events: S) -> impl Stream<Item = Result<String, TranscodeError>> + Send
where
    S: Stream<Item = StreamEvent> + Send,
{
    let mut state = EncodeState::new();
    events.flat_map(move |event| {
        let frames = match codec.encode_stream_event(&event, &mut state) {
            Ok(frames) => frames.into_iter().map(|frame| Ok(frame.to_string())).collect(),
            Err(error) => vec![Err(error)],
        };
        stream::iter(frames)
    })
}
