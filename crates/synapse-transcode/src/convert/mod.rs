//! Conversions between vendor wire formats and the canonical contract
//!
//! Each vendor module converts requests, responses and stream events in both
//! directions. Inbound functions take the [`TranscodeConfig`] that decides
//! raw capture and unknown-content handling; outbound functions replay
//! captured raw structures when they came from the same vendor.
//!
//! [`TranscodeConfig`]: synapse_config::TranscodeConfig

pub mod anthropic;
pub mod openai;
