//! Chat collaborator failures
//!
//! None of these reach the user as such: the router logs them and answers
//! with its fixed apology.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider asked us to back off
    #[error("Chat provider is throttling us, asked to wait {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Chat provider answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not reach the chat provider: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered but there is nothing to show the user
    #[error("Chat provider sent no usable reply: {0}")]
    Unusable(String),

    #[error("Chat collaborator misconfigured: {0}")]
    Config(String),

    #[error("Chat collaborator unavailable: {0}")]
    Unavailable(String),
}

impl LlmError {
    /// Wait the provider asked for, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether asking again might get a reply
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) => true,
            LlmError::Status { status, .. } => matches!(status, 408 | 429) || *status >= 500,
            LlmError::Unusable(_) | LlmError::Config(_) | LlmError::Unavailable(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> LlmError {
        LlmError::Status {
            status: code,
            message: String::new(),
        }
    }

    #[test]
    fn test_retry_after_only_when_throttled() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(3),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
        assert_eq!(status(503).retry_after(), None);
    }

    #[test]
    fn test_is_retryable() {
        assert!(status(503).is_retryable());
        assert!(status(408).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!LlmError::Unusable("empty reply".to_string()).is_retryable());
        assert!(!LlmError::Config("no key".to_string()).is_retryable());
        assert!(!LlmError::Unavailable("provider none".to_string()).is_retryable());
    }

    #[test]
    fn test_messages_name_the_collaborator() {
        assert_eq!(status(500).to_string(), "Chat provider answered 500: ");
        assert!(LlmError::Config("Unknown provider".to_string()).to_string().contains("misconfigured"));
    }
}
