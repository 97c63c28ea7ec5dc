//! Model provider integration
//!
//! The gateway talks to the upstream model through the [`ChatModel`] trait
//! so tests can swap in scripted implementations. [`GeminiProvider`] is the
//! production implementation.

mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Message;

pub use gemini::GeminiProvider;

/// Substrings in an upstream error that mark it as transient overload.
const OVERLOAD_MARKERS: &[&str] = &["503", "overloaded", "rate limit", "resource_exhausted"];

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient capacity failure; safe to retry with backoff.
    #[error("Model overloaded: {0}")]
    Overloaded(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Classify an upstream failure description into a typed error.
    ///
    /// No structured error code is available from every backend, so this
    /// falls back to marker substrings in the error text, case-insensitive.
    pub fn from_upstream(description: impl Into<String>) -> Self {
        let description = description.into();
        let lowered = description.to_lowercase();
        if OVERLOAD_MARKERS.iter().any(|m| lowered.contains(m)) {
            ProviderError::Overloaded(description)
        } else {
            ProviderError::InvalidResponse(description)
        }
    }

    pub fn is_overloaded(&self) -> bool {
        matches!(self, ProviderError::Overloaded(_))
    }
}

/// The result of one model call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The assistant's reply text.
    pub reply: String,

    /// The full updated conversation transcript (system message excluded).
    /// Callers replace their history with this rather than appending.
    pub transcript: Vec<Message>,
}

/// One conversational model call: full transcript in, reply plus updated
/// transcript out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn run(&self, messages: &[Message]) -> Result<ChatOutcome, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_classification() {
        assert!(ProviderError::from_upstream("HTTP 503 Service Unavailable").is_overloaded());
        assert!(ProviderError::from_upstream("the model is OVERLOADED right now").is_overloaded());
        assert!(ProviderError::from_upstream("Rate limit exceeded").is_overloaded());
        assert!(ProviderError::from_upstream("RESOURCE_EXHAUSTED: quota").is_overloaded());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!ProviderError::from_upstream("HTTP 401: API key not valid").is_overloaded());
        assert!(!ProviderError::from_upstream("malformed request body").is_overloaded());
    }
}
