//! Article queue management.
//!
//! A pure state machine for the per-page article queue. No I/O happens
//! here; the orchestrator (`Crawler`) handles persistence and events.
//!
//! Deterministic: same inputs always produce same outputs, which keeps
//! the queue trivially testable.

// Queue positions are always well under u32::MAX in practice
#![allow(clippy::cast_possible_truncation)]

mod types;

use std::collections::VecDeque;

use speedscrape_core::{ArticleId, CrawlError, CrawlResult, QueueEntry, QueueEntryStatus};

pub use types::{FailedArticle, QueuedArticle};

/// Manages the article queue state.
///
/// This is a sync type with no internal locking. The caller is
/// responsible for synchronization.
pub struct ArticleQueue {
    pending: VecDeque<QueuedArticle>,
    failed: Vec<FailedArticle>,
    max_size: u32,
}

impl ArticleQueue {
    /// Create a queue with the given capacity.
    #[must_use]
    pub const fn new(max_size: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            failed: Vec::new(),
            max_size,
        }
    }

    /// Maximum queue size.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Number of pending articles.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of failed articles.
    #[must_use]
    pub const fn failed_len(&self) -> usize {
        self.failed.len()
    }

    /// Whether an article is waiting in the queue.
    #[must_use]
    pub fn is_queued(&self, id: &ArticleId) -> bool {
        self.pending.iter().any(|item| &item.id == id)
    }

    /// Whether an article is in the failed list.
    #[must_use]
    pub fn is_failed(&self, id: &ArticleId) -> bool {
        self.failed.iter().any(|item| &item.item.id == id)
    }

    /// The failed articles, oldest first.
    #[must_use]
    pub fn failed_items(&self) -> &[FailedArticle] {
        &self.failed
    }

    /// Queue an article collected from an index page.
    ///
    /// Returns the 1-based queue position on success. A previously failed
    /// article re-enters the pending queue and leaves the failed list.
    pub fn enqueue(&mut self, id: ArticleId, page: u32) -> CrawlResult<u32> {
        if self.is_queued(&id) {
            return Err(CrawlError::already_queued(id.url()));
        }
        if self.pending.len() as u32 >= self.max_size {
            return Err(CrawlError::queue_full(self.max_size));
        }
        self.remove_from_failed(&id);

        self.pending.push_back(QueuedArticle::new(id, page));
        Ok(self.pending.len() as u32)
    }

    /// Pop the next article from the front of the queue.
    pub fn dequeue(&mut self) -> Option<QueuedArticle> {
        self.pending.pop_front()
    }

    /// Drop everything, pending and failed.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.failed.clear();
    }

    /// Remove an article from the pending queue or failed list.
    pub fn remove(&mut self, id: &ArticleId) -> CrawlResult<()> {
        let initial_pending = self.pending.len();
        self.pending.retain(|item| &item.id != id);
        if self.pending.len() < initial_pending {
            return Ok(());
        }

        let initial_failed = self.failed.len();
        self.failed.retain(|item| &item.item.id != id);
        if self.failed.len() < initial_failed {
            Ok(())
        } else {
            Err(CrawlError::not_in_queue(id.url()))
        }
    }

    /// Record an article as failed.
    pub fn mark_failed(&mut self, item: QueuedArticle, error: CrawlError) {
        // Replace any earlier failure for the same article
        self.failed.retain(|failed| failed.item.id != item.id);
        self.failed.push(FailedArticle::new(item, error));
    }

    /// Move a failed article back into the pending queue.
    ///
    /// Returns the new 1-based queue position.
    pub fn retry_failed(&mut self, id: &ArticleId) -> CrawlResult<u32> {
        let index = self
            .failed
            .iter()
            .position(|item| &item.item.id == id)
            .ok_or_else(|| CrawlError::not_in_queue(id.url()))?;

        if self.pending.len() as u32 >= self.max_size {
            return Err(CrawlError::queue_full(self.max_size));
        }

        let failed = self.failed.remove(index);
        self.pending.push_back(failed.item);
        Ok(self.pending.len() as u32)
    }

    /// Drop all failed articles.
    pub fn clear_failed(&mut self) {
        self.failed.clear();
    }

    /// Positioned view of the queue, running articles first.
    ///
    /// Running articles take positions 1..=N; pending articles continue
    /// after them in FIFO order.
    #[must_use]
    pub fn snapshot(&self, running: &[ArticleId], page: u32) -> Vec<QueueEntry> {
        let mut entries = Vec::with_capacity(running.len() + self.pending.len());
        for (idx, id) in running.iter().enumerate() {
            entries.push(QueueEntry {
                position: idx as u32 + 1,
                id: id.clone(),
                page,
                status: QueueEntryStatus::Running,
            });
        }

        let base = running.len() as u32;
        for (idx, item) in self.pending.iter().enumerate() {
            entries.push(QueueEntry {
                position: base + idx as u32 + 1,
                id: item.id.clone(),
                page: item.page,
                status: QueueEntryStatus::Queued,
            });
        }
        entries
    }

    fn remove_from_failed(&mut self, id: &ArticleId) {
        self.failed.retain(|item| &item.item.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ArticleId {
        ArticleId::new(format!("https://www.speedhunters.com/2024/01/article-{n}/"))
    }

    #[test]
    fn enqueue_returns_positions() {
        let mut queue = ArticleQueue::new(10);
        assert_eq!(queue.enqueue(id(1), 1).unwrap(), 1);
        assert_eq!(queue.enqueue(id(2), 1).unwrap(), 2);
        assert_eq!(queue.pending_len(), 2);
    }

    #[test]
    fn rejects_duplicate() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        let err = queue.enqueue(id(1), 1).unwrap_err();
        assert!(matches!(err, CrawlError::AlreadyQueued { .. }));
    }

    #[test]
    fn rejects_when_full() {
        let mut queue = ArticleQueue::new(2);
        queue.enqueue(id(1), 1).unwrap();
        queue.enqueue(id(2), 1).unwrap();
        let err = queue.enqueue(id(3), 1).unwrap_err();
        assert!(matches!(err, CrawlError::QueueFull { max_size: 2 }));
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        queue.enqueue(id(2), 1).unwrap();
        assert_eq!(queue.dequeue().unwrap().id, id(1));
        assert_eq!(queue.dequeue().unwrap().id, id(2));
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn mark_failed_and_retry() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        let item = queue.dequeue().unwrap();
        queue.mark_failed(item, CrawlError::page_timeout(id(1).url()));

        assert!(queue.is_failed(&id(1)));
        assert_eq!(queue.failed_len(), 1);

        let position = queue.retry_failed(&id(1)).unwrap();
        assert_eq!(position, 1);
        assert!(!queue.is_failed(&id(1)));
        assert!(queue.is_queued(&id(1)));
    }

    #[test]
    fn retry_unknown_fails() {
        let mut queue = ArticleQueue::new(10);
        let err = queue.retry_failed(&id(1)).unwrap_err();
        assert!(matches!(err, CrawlError::NotInQueue { .. }));
    }

    #[test]
    fn enqueue_clears_earlier_failure() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        let item = queue.dequeue().unwrap();
        queue.mark_failed(item, CrawlError::page_timeout(id(1).url()));

        queue.enqueue(id(1), 2).unwrap();
        assert!(!queue.is_failed(&id(1)));
        assert!(queue.is_queued(&id(1)));
    }

    #[test]
    fn remove_from_pending_or_failed() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        queue.remove(&id(1)).unwrap();
        assert_eq!(queue.pending_len(), 0);

        let err = queue.remove(&id(1)).unwrap_err();
        assert!(matches!(err, CrawlError::NotInQueue { .. }));
    }

    #[test]
    fn snapshot_positions_running_first() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        queue.enqueue(id(2), 1).unwrap();
        queue.enqueue(id(3), 1).unwrap();
        let running = vec![queue.dequeue().unwrap().id];

        let entries = queue.snapshot(&running, 1);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].id, id(1));
        assert_eq!(entries[0].status, QueueEntryStatus::Running);

        assert_eq!(entries[1].position, 2);
        assert_eq!(entries[1].id, id(2));
        assert_eq!(entries[1].status, QueueEntryStatus::Queued);

        assert_eq!(entries[2].position, 3);
        assert_eq!(entries[2].id, id(3));
    }

    #[test]
    fn snapshot_without_running_starts_at_one() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 2).unwrap();

        let entries = queue.snapshot(&[], 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].status, QueueEntryStatus::Queued);
    }

    #[test]
    fn clear_empties_everything() {
        let mut queue = ArticleQueue::new(10);
        queue.enqueue(id(1), 1).unwrap();
        queue.enqueue(id(2), 1).unwrap();
        let item = queue.dequeue().unwrap();
        queue.mark_failed(item, CrawlError::Cancelled);

        queue.clear();
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.failed_len(), 0);
    }
}
