//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("No results for query '{0}'")]
    NoResults(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Build a status error, keeping at most `max_chars` of the body.
    pub fn from_status(status: u16, body: &str, max_chars: usize) -> Self {
        Self::Provider {
            status,
            message: truncate_chars(body, max_chars),
        }
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_truncated() {
        let err = ProviderError::from_status(503, &"x".repeat(500), 10);
        match err {
            ProviderError::Provider { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "xxxxxxxxxx...");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }
}
