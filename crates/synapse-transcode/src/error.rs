use thiserror::Error;

/// Errors raised while translating between vendor and canonical shapes
///
/// Only structural problems surface here. Field-level problems (one bad
/// annotation, one malformed tool argument string) are logged and the field
/// is omitted instead.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Unrecognized event/content/tool-choice tag, or a required union
    /// discriminant is missing
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization or deserialization of an otherwise well-formed payload failed
    #[error("internal error: {0}")]
    Internal(String),
}

impl TranscodeError {
    /// Build an `InvalidArgument` error from anything displayable
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Machine-readable error type used when the error is surfaced as a
    /// canonical `error` stream event
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_request_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for TranscodeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Internal(error.to_string())
    }
}
