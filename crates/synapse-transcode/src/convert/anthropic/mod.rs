//! Anthropic Messages API <-> canonical

pub mod content;
pub mod finish;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;
