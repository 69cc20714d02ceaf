//! Run accounting: per-article completion records and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::CrawlError;
use super::types::ArticleId;

/// How an article finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// PDF written to disk.
    Saved,
    /// Already visited, not downloaded again.
    Skipped,
    /// Download or render failed.
    Failed,
    /// Stopped before finishing.
    Cancelled,
}

impl CompletionKind {
    /// Whether this outcome counts as done for page-completion purposes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Saved | Self::Skipped)
    }
}

/// Completion record for a single article in a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionDetail {
    /// The article URL.
    pub id: ArticleId,
    /// Outcome.
    pub kind: CompletionKind,
    /// Index page the article was collected from.
    pub page: u32,
    /// Output filename, present when saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Failure detail, present when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CrawlError>,
    /// When the article finished.
    pub finished_at: DateTime<Utc>,
}

impl CompletionDetail {
    /// Record a saved article.
    pub fn saved(id: ArticleId, page: u32, filename: impl Into<String>) -> Self {
        Self {
            id,
            kind: CompletionKind::Saved,
            page,
            filename: Some(filename.into()),
            error: None,
            finished_at: Utc::now(),
        }
    }

    /// Record a skipped article.
    #[must_use]
    pub fn skipped(id: ArticleId, page: u32) -> Self {
        Self {
            id,
            kind: CompletionKind::Skipped,
            page,
            filename: None,
            error: None,
            finished_at: Utc::now(),
        }
    }

    /// Record a failed article.
    #[must_use]
    pub fn failed(id: ArticleId, page: u32, error: CrawlError) -> Self {
        let kind = if error.is_cancelled() {
            CompletionKind::Cancelled
        } else {
            CompletionKind::Failed
        };
        Self {
            id,
            kind,
            page,
            filename: None,
            error: Some(error),
            finished_at: Utc::now(),
        }
    }
}

/// Tallies of article outcomes for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounts {
    /// Articles saved.
    pub saved: u32,
    /// Articles skipped because already visited.
    pub skipped: u32,
    /// Articles failed.
    pub failed: u32,
    /// Articles cancelled mid-flight.
    pub cancelled: u32,
}

impl AttemptCounts {
    /// Fold one completion into the counts.
    pub fn record(&mut self, kind: CompletionKind) {
        match kind {
            CompletionKind::Saved => self.saved += 1,
            CompletionKind::Skipped => self.skipped += 1,
            CompletionKind::Failed => self.failed += 1,
            CompletionKind::Cancelled => self.cancelled += 1,
        }
    }

    /// Total articles attempted.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.saved + self.skipped + self.failed + self.cancelled
    }
}

/// Summary of a finished crawl run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// First index page visited.
    pub start_page: u32,
    /// Index pages fully completed in this run.
    pub pages_completed: u32,
    /// Outcome tallies.
    pub counts: AttemptCounts,
    /// Per-article records in completion order.
    pub details: Vec<CompletionDetail>,
    /// Whether the run was cancelled.
    pub cancelled: bool,
}

impl RunSummary {
    /// Whether every attempted article succeeded.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.counts.failed == 0 && self.counts.cancelled == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_record_and_total() {
        let mut counts = AttemptCounts::default();
        counts.record(CompletionKind::Saved);
        counts.record(CompletionKind::Saved);
        counts.record(CompletionKind::Skipped);
        counts.record(CompletionKind::Failed);
        assert_eq!(counts.saved, 2);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn cancelled_error_records_as_cancelled() {
        let detail = CompletionDetail::failed(
            ArticleId::new("https://www.speedhunters.com/2024/01/a/"),
            1,
            CrawlError::Cancelled,
        );
        assert_eq!(detail.kind, CompletionKind::Cancelled);
    }

    #[test]
    fn success_kinds() {
        assert!(CompletionKind::Saved.is_success());
        assert!(CompletionKind::Skipped.is_success());
        assert!(!CompletionKind::Failed.is_success());
        assert!(!CompletionKind::Cancelled.is_success());
    }
}
