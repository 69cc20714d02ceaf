//! Core domain types for the crawl.
//!
//! Pure data types with no I/O dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for an article: its URL.
///
/// This is the single identifier format used throughout the system.
/// The session file, the queue, and every event key off this value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Create a new article ID from a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the article URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }

    /// Derive a filesystem-safe slug from the URL path.
    ///
    /// Used as the filename fallback when an article has no usable title.
    #[must_use]
    pub fn slug(&self) -> String {
        crate::paths::slug_from_url(&self.0)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Phase of an article job as it moves through the worker pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticlePhase {
    /// Waiting for a worker slot.
    #[default]
    Pending,
    /// Navigating and waiting for the article to load.
    Fetching,
    /// Printing the loaded page to PDF.
    Rendering,
    /// Writing the PDF to disk.
    Writing,
    /// Finished (success or failure is reported separately).
    Done,
}

impl ArticlePhase {
    /// Human-readable label for progress displays.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Rendering => "rendering",
            Self::Writing => "writing",
            Self::Done => "done",
        }
    }

    /// Whether the phase ends the pipeline.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Progress update sent through the watch channel.
///
/// The sequence number lets the event bridge detect changes without
/// comparing phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleProgress {
    /// Current pipeline phase.
    pub phase: ArticlePhase,
    /// Monotonically increasing sequence number for change detection.
    pub seq: u64,
}

impl ArticleProgress {
    /// Create a new progress update with a sequence number.
    pub const fn new(phase: ArticlePhase, seq: u64) -> Self {
        Self { phase, seq }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_display_is_url() {
        let id = ArticleId::new("https://www.speedhunters.com/2024/01/some-article/");
        assert_eq!(id.to_string(), "https://www.speedhunters.com/2024/01/some-article/");
        assert_eq!(id.url(), "https://www.speedhunters.com/2024/01/some-article/");
    }

    #[test]
    fn article_id_slug_from_path() {
        let id = ArticleId::new("https://www.speedhunters.com/2024/01/some-article/");
        assert_eq!(id.slug(), "2024_01_some-article");
    }

    #[test]
    fn progress_seq_comparison() {
        let p1 = ArticleProgress::new(ArticlePhase::Fetching, 1);
        let p2 = ArticleProgress::new(ArticlePhase::Writing, 2);
        assert!(p2.seq > p1.seq);
    }

    #[test]
    fn default_phase_is_pending() {
        assert_eq!(ArticleProgress::default().phase, ArticlePhase::Pending);
    }

    #[test]
    fn only_done_is_terminal() {
        assert!(ArticlePhase::Done.is_terminal());
        assert!(!ArticlePhase::Fetching.is_terminal());
        assert!(!ArticlePhase::Rendering.is_terminal());
        assert!(!ArticlePhase::Writing.is_terminal());
    }
}
