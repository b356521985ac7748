//! Stop reason mapping

use crate::types::{FinishReason, Vendor};

/// Map an Anthropic `stop_reason` onto the canonical enum
pub fn finish_reason(stop_reason: &str) -> FinishReason {
    match stop_reason {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

/// Rebuild an Anthropic `stop_reason`
///
/// The native string wins when it came from Anthropic, which is the only way
/// `pause_turn` and `stop_sequence` survive a round trip.
pub fn stop_reason(finish: Option<FinishReason>, native: Option<&str>, source: Vendor) -> Option<String> {
    if source == Vendor::Anthropic
        && let Some(native) = native
    {
        return Some(native.to_owned());
    }
    let reason = match finish? {
        FinishReason::Stop | FinishReason::Unknown => "end_turn",
        FinishReason::Length => "max_tokens",
        FinishReason::ToolCalls => "tool_use",
        FinishReason::ContentFilter => "refusal",
    };
    Some(reason.to_owned())
}
