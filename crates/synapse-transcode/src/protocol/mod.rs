//! Wire format types for vendor API protocols
//!
//! Pure serde types matching each vendor's JSON. They are only used at the
//! boundary; everything past it works on the canonical types.

pub mod anthropic;
pub mod openai;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TranscodeError;

/// Decode an inbound vendor payload
///
/// A payload that does not match the vendor schema is the caller's problem,
/// so failures surface as `InvalidArgument`.
pub fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T, TranscodeError> {
    serde_json::from_value(value).map_err(|e| TranscodeError::invalid(format!("malformed {what}: {e}")))
}
