//! Error types for the conversation engine.

use footprints_core::error::FootprintsError;

/// Errors from the chat engine.
///
/// Every backend variant ends up as the same fallback turn in the
/// transcript; the distinction only matters for logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("a message is already waiting for a reply")]
    RequestInFlight,
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<FootprintsError> for ChatError {
    fn from(err: FootprintsError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::InvalidResponse(err.to_string())
        } else {
            ChatError::Request(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::RequestInFlight.to_string(),
            "a message is already waiting for a reply"
        );
        assert_eq!(
            ChatError::Request("connection refused".to_string()).to_string(),
            "request failed: connection refused"
        );
        assert_eq!(ChatError::Status(502).to_string(), "backend returned status 502");
        assert_eq!(
            ChatError::InvalidResponse("missing field `response`".to_string()).to_string(),
            "invalid response: missing field `response`"
        );
    }

    #[test]
    fn test_chat_error_from_footprints_error() {
        let err: ChatError = FootprintsError::Storage("disk full".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
