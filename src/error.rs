// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Crawl window could not be computed
    #[error("Window error: {0}")]
    Window(String),

    /// Transient failures exhausted the retry budget
    #[error("Request to {uri} failed after {attempts} attempts: {message}")]
    RetryExhausted {
        uri: String,
        attempts: u32,
        message: String,
    },

    /// Feed answered with a non-success HTTP status
    #[error("Feed request {uri} returned HTTP {status}")]
    Status { uri: String, status: u16 },

    /// Page body is not a well-formed feed document
    #[error("Malformed page from {uri}: {message}")]
    MalformedPage { uri: String, message: String },

    /// Feed reported a protocol-level error
    #[error("Feed error for {context}: {message}")]
    Feed { context: String, message: String },

    /// Summarization collaborator failed
    #[error("Summarize error: {0}")]
    Summarize(String),

    /// Notification collaborator failed
    #[error("Notify error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a window error.
    pub fn window(message: impl Into<String>) -> Self {
        Self::Window(message.into())
    }

    /// Create a malformed page error for the given request.
    pub fn malformed(uri: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedPage {
            uri: uri.into(),
            message: message.to_string(),
        }
    }

    /// Create a feed protocol error with context.
    pub fn feed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Feed {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error is a connect failure or a timeout.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhausted_message_names_uri_and_attempts() {
        let err = AppError::RetryExhausted {
            uri: "https://feed.example/oai?verb=ListRecords".into(),
            attempts: 3,
            message: "connection refused".into(),
        };
        let text = err.to_string();
        assert!(text.contains("https://feed.example/oai?verb=ListRecords"));
        assert!(text.contains("3 attempts"));
    }

    #[test]
    fn non_http_errors_are_not_transient() {
        assert!(!AppError::config("x").is_transient());
        assert!(!AppError::malformed("u", "bad").is_transient());
    }
}
