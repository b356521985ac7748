//! Translation layer between LLM vendor wire formats
//!
//! Requests, responses and streaming events convert from a vendor format into
//! a vendor-agnostic canonical contract and back out into any other vendor
//! format. Streaming events are addressed through a per-stream
//! [`StreamIndexContext`] so every canonical event carries a stable sequence
//! number, item id and output/content indices no matter how the vendor
//! addressed it.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod codec;
pub mod convert;
pub mod error;
pub mod protocol;
pub mod repair;
pub mod session;
pub mod sse;
pub mod stream_context;
pub mod types;

pub use codec::{AnthropicCodec, Codec, Codecs, EncodeState, OpenAiCodec, SseFrame};
pub use error::TranscodeError;
pub use repair::repair;
pub use session::StreamSession;
pub use sse::{decode_sse, encode_sse};
pub use stream_context::{SharedStreamIndexContext, StreamIndexContext};
pub use types::*;
