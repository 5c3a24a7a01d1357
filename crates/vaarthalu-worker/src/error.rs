//! Worker errors.

use thiserror::Error;

/// Result type alias for worker operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Errors raised while handling a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The cache could not be opened or populated.
    #[error("Cache error ({cache}): {message}")]
    Cache { cache: String, message: String },

    /// A cache lookup failed.
    #[error("Cache lookup error: {0}")]
    Lookup(String),

    /// The network request failed outright.
    #[error("Network error: {0}")]
    Network(String),

    /// The notification could not be displayed.
    #[error("Notification error: {0}")]
    Notification(String),

    /// A client window could not be opened.
    #[error("Client window error: {0}")]
    OpenWindow(String),
}

impl WorkerError {
    pub fn cache(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            cache: cache.into(),
            message: message.into(),
        }
    }
}
