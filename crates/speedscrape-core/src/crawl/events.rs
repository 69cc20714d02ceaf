//! Crawl progress events.
//!
//! Events are emitted by the crawler and consumed by frontends (CLI progress
//! display, logs). They are serializable so a frontend in another process
//! could subscribe to the same stream.

use serde::{Deserialize, Serialize};

use super::errors::CrawlError;
use super::types::{ArticleId, ArticlePhase};

/// Terminal status of an article within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// PDF written to disk.
    Saved,
    /// Already in the session's visited set, not downloaded again.
    Skipped,
    /// Download or render failed.
    Failed,
}

/// Per-article outcome reported in queue snapshots and run summaries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArticleSummary {
    /// The article URL.
    pub id: ArticleId,
    /// Final status of the article.
    pub status: ArticleStatus,
    /// Output filename, present when `status` is `Saved`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Error detail, present when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CrawlError>,
}

impl ArticleSummary {
    /// Summary for a saved article.
    pub fn saved(id: ArticleId, filename: impl Into<String>) -> Self {
        Self {
            id,
            status: ArticleStatus::Saved,
            filename: Some(filename.into()),
            error: None,
        }
    }

    /// Summary for an article skipped because it was already visited.
    #[must_use]
    pub const fn skipped(id: ArticleId) -> Self {
        Self {
            id,
            status: ArticleStatus::Skipped,
            filename: None,
            error: None,
        }
    }

    /// Summary for a failed article.
    #[must_use]
    pub const fn failed(id: ArticleId, error: CrawlError) -> Self {
        Self {
            id,
            status: ArticleStatus::Failed,
            filename: None,
            error: Some(error),
        }
    }
}

/// Where one article sits in the queue right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEntryStatus {
    /// A worker is on it.
    Running,
    /// Waiting for a worker slot.
    Queued,
}

/// One article's place in the queue, 1-based.
///
/// Running articles occupy the leading positions; queued ones follow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueEntry {
    /// 1-based queue position.
    pub position: u32,
    /// The article URL.
    pub id: ArticleId,
    /// Index page the article was collected from.
    pub page: u32,
    /// Running or queued.
    pub status: QueueEntryStatus,
}

/// Point-in-time view of the article queue for a single index page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Index page number the queue belongs to.
    pub page: u32,
    /// Articles waiting for a worker slot.
    pub pending: u32,
    /// Articles currently being processed.
    pub active: u32,
    /// Articles finished in this page, saved or skipped.
    pub completed: u32,
    /// Articles that failed in this page.
    pub failed: u32,
    /// Per-article positions, running first.
    pub entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    /// Total articles tracked for the page.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.pending + self.active + self.completed + self.failed
    }
}

/// Events emitted during a crawl.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// A crawl run started.
    RunStarted {
        /// First index page this run will visit.
        start_page: u32,
        /// Number of URLs already in the visited set.
        visited_count: u32,
    },

    /// An index page is being fetched.
    PageStarted {
        /// Index page number (1-based).
        page: u32,
        /// The page URL.
        url: String,
    },

    /// Article links were collected from an index page.
    PageCollected {
        /// Index page number.
        page: u32,
        /// Links found on the page.
        found: u32,
        /// Links remaining after filtering already-visited URLs.
        new: u32,
    },

    /// An index page finished with every article saved or skipped.
    PageCompleted {
        /// Index page number.
        page: u32,
    },

    /// An index page had at least one failed article and will be retried
    /// on the next run.
    PageFailed {
        /// Index page number.
        page: u32,
        /// Number of failed articles.
        failed: u32,
    },

    /// An article entered a new pipeline phase.
    ArticleProgress {
        /// The article URL.
        id: ArticleId,
        /// Current phase.
        phase: ArticlePhase,
    },

    /// An article finished.
    ArticleCompleted {
        /// Outcome for the article.
        summary: ArticleSummary,
    },

    /// Queue state changed.
    QueueUpdated {
        /// Current queue snapshot.
        snapshot: QueueSnapshot,
    },

    /// The whole crawl finished.
    RunFinished {
        /// Articles saved in this run.
        saved: u32,
        /// Articles skipped in this run.
        skipped: u32,
        /// Articles failed in this run.
        failed: u32,
        /// Whether the run was cancelled before completing.
        cancelled: bool,
    },
}

impl CrawlEvent {
    /// Name of the event variant, for logging and routing.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::PageStarted { .. } => "page_started",
            Self::PageCollected { .. } => "page_collected",
            Self::PageCompleted { .. } => "page_completed",
            Self::PageFailed { .. } => "page_failed",
            Self::ArticleProgress { .. } => "article_progress",
            Self::ArticleCompleted { .. } => "article_completed",
            Self::QueueUpdated { .. } => "queue_updated",
            Self::RunFinished { .. } => "run_finished",
        }
    }

    /// The article this event concerns, when it concerns one.
    #[must_use]
    pub const fn article_id(&self) -> Option<&ArticleId> {
        match self {
            Self::ArticleProgress { id, .. } => Some(id),
            Self::ArticleCompleted { summary } => Some(&summary.id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_uses_type_tag() {
        let event = CrawlEvent::PageStarted {
            page: 3,
            url: "https://www.speedhunters.com/category/content/page/3/".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "page_started");
        assert_eq!(json["page"], 3);
    }

    #[test]
    fn article_events_expose_id() {
        let id = ArticleId::new("https://www.speedhunters.com/2024/01/a/");
        let event = CrawlEvent::ArticleProgress {
            id: id.clone(),
            phase: ArticlePhase::Fetching,
        };
        assert_eq!(event.article_id(), Some(&id));
        assert_eq!(event.event_name(), "article_progress");

        let finished = CrawlEvent::RunFinished {
            saved: 1,
            skipped: 0,
            failed: 0,
            cancelled: false,
        };
        assert_eq!(finished.article_id(), None);
    }

    #[test]
    fn summary_constructors() {
        let id = ArticleId::new("https://www.speedhunters.com/2024/01/a/");
        let saved = ArticleSummary::saved(id.clone(), "Some Article.pdf");
        assert_eq!(saved.status, ArticleStatus::Saved);
        assert_eq!(saved.filename.as_deref(), Some("Some Article.pdf"));

        let failed = ArticleSummary::failed(id, CrawlError::page_timeout("https://x"));
        assert_eq!(failed.status, ArticleStatus::Failed);
        assert!(failed.error.is_some());
    }

    #[test]
    fn snapshot_total() {
        let snapshot = QueueSnapshot {
            page: 1,
            pending: 2,
            active: 1,
            completed: 3,
            failed: 1,
            ..QueueSnapshot::default()
        };
        assert_eq!(snapshot.total(), 7);
    }
}
