//! Error types for port operations.

/// Failure of a single LLM round trip.
///
/// Every variant is retryable; see `infrastructure::resilient_llm`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Network failure or non-2xx status.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    /// Body or payload could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Completion arrived without any content.
    #[error("Empty response")]
    EmptyResponse,
}

impl LlmError {
    pub fn request_failed(message: impl ToString) -> Self {
        Self::RequestFailed(message.to_string())
    }

    pub fn invalid_response(message: impl ToString) -> Self {
        Self::InvalidResponse(message.to_string())
    }
}
