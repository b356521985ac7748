use serde::{Deserialize, Serialize};

/// Wire protocol family a payload was produced by or is destined for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Vendor {
    /// Anthropic Messages API
    Anthropic,
    /// `OpenAI` Chat Completions API
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
}
