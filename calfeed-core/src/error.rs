//! Error types for calfeed.

use thiserror::Error;

/// Errors that can occur while syncing feeds.
#[derive(Error, Debug)]
pub enum CalFeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Skipped feed event: {0}")]
    Parse(String),

    #[error("Could not list stored events for '{category}': {reason}")]
    StoreRead { category: String, reason: String },

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalFeedError {
    /// Whether this error aborts a category run rather than a single record.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CalFeedError::Parse(_) | CalFeedError::StoreWrite(_))
    }
}

/// Result type alias for calfeed operations.
pub type CalFeedResult<T> = Result<T, CalFeedError>;
