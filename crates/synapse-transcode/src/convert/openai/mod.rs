//! `OpenAI` Chat Completions API <-> canonical

pub mod message;
pub mod request;
pub mod response;
pub mod stream;
