//! Queue item types.

use chrono::{DateTime, Utc};

use speedscrape_core::{ArticleId, CrawlError};

/// An article waiting for a worker slot.
#[derive(Clone, Debug)]
pub struct QueuedArticle {
    /// The article URL.
    pub id: ArticleId,
    /// Index page the article was collected from.
    pub page: u32,
    /// When the article entered the queue.
    pub queued_at: DateTime<Utc>,
}

impl QueuedArticle {
    /// Create a queue item for an article found on an index page.
    #[must_use]
    pub fn new(id: ArticleId, page: u32) -> Self {
        Self {
            id,
            page,
            queued_at: Utc::now(),
        }
    }
}

/// An article whose download failed.
#[derive(Clone, Debug)]
pub struct FailedArticle {
    /// The original queue item.
    pub item: QueuedArticle,
    /// Why it failed.
    pub error: CrawlError,
    /// When it failed.
    pub failed_at: DateTime<Utc>,
}

impl FailedArticle {
    /// Record a failure for a queue item.
    #[must_use]
    pub fn new(item: QueuedArticle, error: CrawlError) -> Self {
        Self {
            item,
            error,
            failed_at: Utc::now(),
        }
    }
}
