//! Crawl error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error`. For I/O errors, we capture the kind
//! and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for crawl operations.
///
/// Designed to be serializable across process boundaries (events, CLI)
/// without depending on non-serializable types like `std::io::Error`.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrawlError {
    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "NotFound", "PermissionDenied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// WebDriver/browser error.
    #[error("Browser error: {message}")]
    Browser {
        /// Detailed error message.
        message: String,
    },

    /// Navigation to a URL failed.
    #[error("Navigation failed for {url}: {message}")]
    Navigation {
        /// The URL that could not be loaded.
        url: String,
        /// Detailed error message.
        message: String,
    },

    /// Timed out waiting for page content to appear.
    #[error("Timed out waiting for content on {url}")]
    PageTimeout {
        /// The URL that never became ready.
        url: String,
    },

    /// Session file could not be read or written.
    #[error("Session error: {message}")]
    Session {
        /// Detailed error message.
        message: String,
    },

    /// Queue is full, cannot add more articles.
    #[error("Queue full: maximum {max_size} articles allowed")]
    QueueFull {
        /// Maximum queue capacity.
        max_size: u32,
    },

    /// Article is already queued.
    #[error("Already queued: {id}")]
    AlreadyQueued {
        /// The article URL that's already in the queue.
        id: String,
    },

    /// Article not found in queue.
    #[error("Not in queue: {id}")]
    NotInQueue {
        /// The article URL that wasn't found.
        id: String,
    },

    /// Crawl was cancelled by user.
    #[error("Crawl cancelled")]
    Cancelled,

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl CrawlError {
    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a browser error.
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Create a navigation error.
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a page timeout error.
    pub fn page_timeout(url: impl Into<String>) -> Self {
        Self::PageTimeout { url: url.into() }
    }

    /// Create a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a queue full error.
    #[must_use]
    pub const fn queue_full(max_size: u32) -> Self {
        Self::QueueFull { max_size }
    }

    /// Create an already queued error.
    pub fn already_queued(id: impl Into<String>) -> Self {
        Self::AlreadyQueued { id: id.into() }
    }

    /// Create a not in queue error.
    pub fn not_in_queue(id: impl Into<String>) -> Self {
        Self::NotInQueue { id: id.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (retrying the page may help).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Navigation { .. } | Self::PageTimeout { .. } | Self::Io { .. }
        )
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { message, .. } => format!("File operation failed: {message}"),
            Self::Browser { message } => format!("Browser error: {message}"),
            Self::Navigation { url, message } => {
                format!("Could not load {url}: {message}")
            }
            Self::PageTimeout { url } => {
                format!("Page {url} did not finish loading. It will be retried on the next run.")
            }
            Self::Session { message } => format!("Session file problem: {message}"),
            Self::QueueFull { max_size } => {
                format!("Article queue is full (max {max_size} items).")
            }
            Self::AlreadyQueued { id } => format!("Article '{id}' is already queued."),
            Self::NotInQueue { id } => format!("Article '{id}' is not in the queue."),
            Self::Cancelled => "Crawl was cancelled.".to_string(),
            Self::InvalidConfig { message } => format!("Invalid configuration: {message}"),
            Self::Other { message } => message.clone(),
        }
    }
}

/// Convenience result type for crawl operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CrawlError::from_io_error(&io_err);

        match err {
            CrawlError::Io { kind, message } => {
                assert_eq!(kind, "NotFound");
                assert!(message.contains("file not found"));
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = CrawlError::navigation("https://example.com", "connection refused");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("example.com"));
        assert!(json.contains("connection refused"));

        let parsed: CrawlError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(CrawlError::page_timeout("https://x").is_recoverable());
        assert!(CrawlError::navigation("https://x", "reset").is_recoverable());
        assert!(!CrawlError::Cancelled.is_recoverable());
        assert!(!CrawlError::browser("session died").is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = CrawlError::queue_full(64);
        assert!(err.user_message().contains("64"));
        assert!(err.user_message().contains("full"));
    }
}
