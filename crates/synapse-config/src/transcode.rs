use serde::Deserialize;

/// What converters do with a content block whose type they do not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownContentPolicy {
    /// Keep the block verbatim so it survives the round trip
    #[default]
    Preserve,
    /// Drop the block
    Drop,
}

/// Conversion behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscodeConfig {
    /// `max_tokens` sent to vendors that require one when the request has none
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    /// Handling of unrecognized content blocks
    #[serde(default)]
    pub unknown_content: UnknownContentPolicy,
    /// Whether to keep original vendor structures for lossless replay
    #[serde(default = "default_capture_raw")]
    pub capture_raw: bool,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: default_max_tokens(),
            unknown_content: UnknownContentPolicy::default(),
            capture_raw: default_capture_raw(),
        }
    }
}

impl TranscodeConfig {
    /// Whether unknown content blocks are kept
    pub const fn preserve_unknown(&self) -> bool {
        matches!(self.unknown_content, UnknownContentPolicy::Preserve)
    }
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_capture_raw() -> bool {
    true
}
