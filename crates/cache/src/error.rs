//! Error types for cache clients

use thiserror::Error;

/// Errors that can occur talking to the destination cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Client could not be constructed (bad endpoint, TLS setup, ...)
    #[error("failed to initialize cache client: {0}")]
    Init(String),

    /// Transport-level failure (connect, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the call
    #[error("backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// Credentials rejected
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Create a backend error.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
