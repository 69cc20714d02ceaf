//! Crawler implementation.
//!
//! # Architecture
//!
//! - **Crawler**: walks index pages, owns queue, leases, and the session
//! - **Worker**: renders one article, writes only to its `watch::Sender`
//! - **Bridge tasks**: subscribe to watch channels, emit rate-limited events
//!
//! # Concurrency Model
//!
//! - Index pages are processed strictly in order
//! - Articles within a page drain through a semaphore-bounded `JoinSet`
//! - Lease tokens prevent stale finalize commits
//! - Per-article cancel tokens are children of the run token, so `stop`
//!   cancels everything at once
//!
//! A page only counts as completed when every article on it was saved or
//! skipped. A failed article stops the crawl after the page drains, so the
//! next run retries the same page.

// Queue and page counts are always well under u32::MAX in practice
#![allow(clippy::cast_possible_truncation)]

mod worker;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::{Mutex, RwLock, Semaphore, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use speedscrape_core::{
    ArticleId, ArticleProgress, ArticleSummary, AttemptCounts, BrowserPort, CompletionDetail,
    CrawlConfig, CrawlError, CrawlEvent, CrawlEventEmitterPort, CrawlResult, CrawlSession,
    QueueSnapshot, RunSummary, SessionStorePort,
};

use crate::progress::ProgressThrottle;
use crate::queue::{ArticleQueue, QueuedArticle};

pub use worker::{ArticleJob, SavedArticle};

/// Lease ID for active renders.
///
/// Prevents stale finalize commits when a job is cancelled while an old
/// task is still unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LeaseId(u64);

/// Accounting for one crawl run.
struct RunState {
    started_at: DateTime<Utc>,
    start_page: u32,
    pages_completed: u32,
    /// Completions keyed by article, insertion order preserved.
    completions: IndexMap<ArticleId, CompletionDetail>,
    cancelled: bool,
}

impl RunState {
    fn new(start_page: u32) -> Self {
        Self {
            started_at: Utc::now(),
            start_page,
            pages_completed: 0,
            completions: IndexMap::new(),
            cancelled: false,
        }
    }

    fn record(&mut self, detail: CompletionDetail) {
        self.completions.insert(detail.id.clone(), detail);
    }

    fn into_summary(self) -> RunSummary {
        let mut counts = AttemptCounts::default();
        for detail in self.completions.values() {
            counts.record(detail.kind);
        }

        RunSummary {
            started_at: self.started_at,
            finished_at: Utc::now(),
            start_page: self.start_page,
            pages_completed: self.pages_completed,
            counts,
            details: self.completions.into_values().collect(),
            cancelled: self.cancelled,
        }
    }
}

/// What happened to one index page's queue.
struct PageOutcome {
    failed: u32,
    cancelled: bool,
}

/// Dependencies for creating a crawler.
pub struct CrawlerDeps<B, S, E>
where
    B: BrowserPort + 'static,
    S: SessionStorePort + 'static,
    E: CrawlEventEmitterPort + 'static,
{
    /// Browser automation port.
    pub browser: Arc<B>,
    /// Session persistence port.
    pub store: Arc<S>,
    /// Event sink.
    pub emitter: Arc<E>,
    /// Crawl settings.
    pub config: CrawlConfig,
}

/// Build a crawler from its dependencies.
pub fn build_crawler<B, S, E>(deps: CrawlerDeps<B, S, E>) -> Crawler
where
    B: BrowserPort + 'static,
    S: SessionStorePort + 'static,
    E: CrawlEventEmitterPort + 'static,
{
    Crawler {
        browser: deps.browser,
        store: deps.store,
        emitter: deps.emitter,
        queue: RwLock::new(ArticleQueue::new(deps.config.max_queue_size)),
        config: deps.config,
        active: Mutex::new(HashMap::new()),
        lease_counter: AtomicU64::new(0),
        cancel: CancellationToken::new(),
    }
}

/// The crawl orchestrator.
pub struct Crawler {
    browser: Arc<dyn BrowserPort>,
    store: Arc<dyn SessionStorePort>,
    emitter: Arc<dyn CrawlEventEmitterPort>,
    config: CrawlConfig,
    /// Per-page article queue.
    queue: RwLock<ArticleQueue>,
    /// Leases of active renders, keyed by article.
    active: Mutex<HashMap<ArticleId, LeaseId>>,
    /// Counter for minting lease IDs.
    lease_counter: AtomicU64,
    /// Run-level cancellation.
    cancel: CancellationToken,
}

impl Crawler {
    /// The crawler's configuration.
    #[must_use]
    pub const fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Request the crawl to stop.
    ///
    /// Cancels every in-flight render and force-quits the browser sessions
    /// so no windows linger. The running [`crawl`](Self::crawl) call
    /// returns its partial summary.
    pub async fn stop(&self) {
        info!("stop requested");
        self.cancel.cancel();
        self.browser.shutdown().await;
    }

    /// Run the crawl to completion.
    ///
    /// Walks index pages starting where the session left off, downloading
    /// every unvisited article. Returns a summary of this run's work.
    pub async fn crawl(&self) -> CrawlResult<RunSummary> {
        self.config.validate()?;
        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| CrawlError::from_io_error(&e))?;

        let mut session = if self.config.resume {
            self.store.load().await?
        } else {
            CrawlSession::new()
        };

        let start_page = session.next_page();
        let mut run = RunState::new(start_page);
        info!(
            start_page,
            visited = session.visited_count(),
            concurrency = self.config.concurrency,
            "crawl started"
        );
        self.emitter
            .emit(CrawlEvent::RunStarted {
                start_page,
                visited_count: session.visited_count() as u32,
            })
            .await;

        let mut page = start_page;
        loop {
            if self.cancel.is_cancelled() {
                run.cancelled = true;
                break;
            }
            // max_pages is an absolute page-number cap, so a resumed run
            // that already passed it stops before fetching anything.
            if let Some(max) = self.config.max_pages {
                if page > max {
                    debug!(max, "page limit reached");
                    break;
                }
            }

            let page_url = self.config.index_url(page);
            self.emitter
                .emit(CrawlEvent::PageStarted {
                    page,
                    url: page_url.clone(),
                })
                .await;

            let collected = tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    run.cancelled = true;
                    break;
                }

                result = self.browser.collect_article_links(&page_url) => result,
            };
            let links = match collected {
                Ok(Some(links)) => links,
                Ok(None) => {
                    info!(page, "no article list, reached the end of the archive");
                    break;
                }
                Err(error) => {
                    warn!(page, %error, "failed to collect index page");
                    self.emitter
                        .emit(CrawlEvent::PageFailed { page, failed: 0 })
                        .await;
                    break;
                }
            };
            if links.is_empty() {
                // Only later pages signal the end; an empty first page
                // just means the newest posts moved on.
                if page == 1 {
                    debug!("first index page listed no articles, moving on");
                    page += 1;
                    continue;
                }
                info!(page, "index page has no articles, reached the end");
                break;
            }

            let found = links.len() as u32;
            let mut new_ids: Vec<ArticleId> = Vec::new();
            for link in links {
                let id = ArticleId::new(link);
                if session.is_visited(&id) {
                    self.emitter
                        .emit(CrawlEvent::ArticleCompleted {
                            summary: ArticleSummary::skipped(id.clone()),
                        })
                        .await;
                    run.record(CompletionDetail::skipped(id, page));
                } else if !new_ids.contains(&id) {
                    new_ids.push(id);
                }
            }

            let new = new_ids.len() as u32;
            debug!(page, found, new, "collected index page");
            self.emitter
                .emit(CrawlEvent::PageCollected { page, found, new })
                .await;

            {
                let mut queue = self.queue.write().await;
                for id in new_ids {
                    if let Err(error) = queue.enqueue(id.clone(), page) {
                        warn!(%id, %error, "could not queue article");
                    }
                }
            }

            let outcome = self.drain_page(page, &mut session, &mut run).await;

            if outcome.cancelled || self.cancel.is_cancelled() {
                run.cancelled = true;
                self.emitter
                    .emit(CrawlEvent::PageFailed {
                        page,
                        failed: outcome.failed,
                    })
                    .await;
                break;
            }

            if outcome.failed == 0 {
                session.complete_page(page);
                if let Err(error) = self.store.save(&session).await {
                    warn!(%error, "could not persist session");
                }
                run.pages_completed += 1;
                self.emitter.emit(CrawlEvent::PageCompleted { page }).await;
            } else {
                // Do not advance the session; the next run retries this page.
                warn!(page, failed = outcome.failed, "page had failures, stopping");
                self.emitter
                    .emit(CrawlEvent::PageFailed {
                        page,
                        failed: outcome.failed,
                    })
                    .await;
                break;
            }

            page += 1;
        }

        self.browser.shutdown().await;

        let summary = run.into_summary();
        info!(
            saved = summary.counts.saved,
            skipped = summary.counts.skipped,
            failed = summary.counts.failed,
            pages_completed = summary.pages_completed,
            cancelled = summary.cancelled,
            "crawl finished"
        );
        self.emitter
            .emit(CrawlEvent::RunFinished {
                saved: summary.counts.saved,
                skipped: summary.counts.skipped,
                failed: summary.counts.failed,
                cancelled: summary.cancelled,
            })
            .await;

        Ok(summary)
    }

    /// Drain the queued articles of one index page.
    async fn drain_page(
        &self,
        page: u32,
        session: &mut CrawlSession,
        run: &mut RunState,
    ) -> PageOutcome {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut join_set: JoinSet<(QueuedArticle, LeaseId, CrawlResult<SavedArticle>)> =
            JoinSet::new();
        let mut completed = 0u32;
        let mut failed = 0u32;
        let mut cancelled = false;

        loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(item) = self.queue.write().await.dequeue() else {
                break;
            };

            let permit = tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    // The dequeued item never ran; account for it.
                    self.record_cancelled(item, run).await;
                    cancelled = true;
                    break;
                }

                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (lease, job_cancel, progress_tx) = self.admit(&item).await;
            self.spawn_progress_bridge(item.id.clone(), progress_tx.subscribe(), job_cancel.clone());
            self.emit_queue_snapshot(page, completed, failed).await;

            let browser = Arc::clone(&self.browser);
            let job = ArticleJob {
                id: item.id.clone(),
                page,
                output_dir: self.config.output_dir.clone(),
                delay: self.config.delay,
                cancel: job_cancel,
                progress_tx,
            };
            join_set.spawn(async move {
                let result = worker::run_job(job, browser).await;
                drop(permit);
                (item, lease, result)
            });

            // Finalize anything that already finished before the next launch
            while let Some(joined) = join_set.try_join_next() {
                self.finalize(joined, session, run, page, &mut completed, &mut failed)
                    .await;
            }
        }

        while let Some(joined) = join_set.join_next().await {
            self.finalize(joined, session, run, page, &mut completed, &mut failed)
                .await;
        }

        if cancelled || self.cancel.is_cancelled() {
            cancelled = true;
            self.drain_cancelled(run).await;
        }

        PageOutcome { failed, cancelled }
    }

    /// Empty the pending queue after a cancel, recording each article.
    async fn drain_cancelled(&self, run: &mut RunState) {
        let pending = {
            let mut queue = self.queue.write().await;
            let mut items = Vec::with_capacity(queue.pending_len());
            while let Some(item) = queue.dequeue() {
                items.push(item);
            }
            items
        };

        for item in pending {
            self.record_cancelled(item, run).await;
        }
    }

    /// Record an article that was cancelled before its job finished.
    async fn record_cancelled(&self, item: QueuedArticle, run: &mut RunState) {
        self.emitter
            .emit(CrawlEvent::ArticleCompleted {
                summary: ArticleSummary::failed(item.id.clone(), CrawlError::Cancelled),
            })
            .await;
        run.record(CompletionDetail::failed(
            item.id,
            item.page,
            CrawlError::Cancelled,
        ));
    }

    /// Mint a lease and register the article as active.
    async fn admit(
        &self,
        item: &QueuedArticle,
    ) -> (LeaseId, CancellationToken, watch::Sender<ArticleProgress>) {
        let lease = LeaseId(self.lease_counter.fetch_add(1, Ordering::Relaxed));
        let cancel = self.cancel.child_token();
        let (progress_tx, _) = watch::channel(ArticleProgress::default());

        self.active.lock().await.insert(item.id.clone(), lease);

        (lease, cancel, progress_tx)
    }

    /// Commit the result of a finished article job.
    ///
    /// Verifies the lease to prevent stale commits.
    async fn finalize(
        &self,
        joined: Result<(QueuedArticle, LeaseId, CrawlResult<SavedArticle>), tokio::task::JoinError>,
        session: &mut CrawlSession,
        run: &mut RunState,
        page: u32,
        completed: &mut u32,
        failed: &mut u32,
    ) {
        let Ok((item, lease, result)) = joined else {
            warn!("article task panicked");
            *failed += 1;
            return;
        };

        if !self.verify_and_remove_lease(&item.id, lease).await {
            debug!(id = %item.id, "ignoring stale finalize (lease mismatch)");
            return;
        }

        match result {
            Ok(saved) => {
                session.mark_visited(item.id.clone());
                if let Err(error) = self.store.save(session).await {
                    warn!(%error, "could not persist session");
                }
                *completed += 1;
                info!(
                    id = %item.id,
                    filename = %saved.filename,
                    bytes = saved.bytes_written,
                    "article saved"
                );
                self.emitter
                    .emit(CrawlEvent::ArticleCompleted {
                        summary: ArticleSummary::saved(item.id.clone(), saved.filename.clone()),
                    })
                    .await;
                run.record(CompletionDetail::saved(item.id, item.page, saved.filename));
            }
            Err(error) => {
                *failed += 1;
                warn!(id = %item.id, %error, "article failed");
                self.emitter
                    .emit(CrawlEvent::ArticleCompleted {
                        summary: ArticleSummary::failed(item.id.clone(), error.clone()),
                    })
                    .await;
                run.record(CompletionDetail::failed(
                    item.id.clone(),
                    item.page,
                    error.clone(),
                ));
                self.queue.write().await.mark_failed(item, error);
            }
        }

        self.emit_queue_snapshot(page, *completed, *failed).await;
    }

    /// Verify lease matches and remove from the active map.
    async fn verify_and_remove_lease(&self, id: &ArticleId, lease: LeaseId) -> bool {
        let mut active = self.active.lock().await;
        active
            .get(id)
            .is_some_and(|held| *held == lease)
            .then(|| active.remove(id))
            .is_some()
    }

    /// Spawn a bridge task turning watch updates into rate-limited events.
    fn spawn_progress_bridge(
        &self,
        id: ArticleId,
        mut rx: watch::Receiver<ArticleProgress>,
        cancel: CancellationToken,
    ) {
        let emitter = Arc::clone(&self.emitter);

        tokio::spawn(async move {
            let mut throttle = ProgressThrottle::default_interval();
            let mut last_seq = 0u64;

            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => break,

                    result = rx.changed() => {
                        if result.is_err() {
                            // Sender dropped (job finished), emit final and exit
                            let current = rx.borrow().clone();
                            if current.seq > last_seq {
                                emitter
                                    .emit(CrawlEvent::ArticleProgress {
                                        id: id.clone(),
                                        phase: current.phase,
                                    })
                                    .await;
                            }
                            break;
                        }

                        let current = rx.borrow_and_update().clone();
                        if current.seq > last_seq && throttle.should_emit_phase(current.phase) {
                            last_seq = current.seq;
                            emitter
                                .emit(CrawlEvent::ArticleProgress {
                                    id: id.clone(),
                                    phase: current.phase,
                                })
                                .await;
                        }
                    }
                }
            }
        });
    }

    /// Emit the current queue state for one page.
    async fn emit_queue_snapshot(&self, page: u32, completed: u32, failed: u32) {
        let running: Vec<ArticleId> = self.active.lock().await.keys().cloned().collect();
        let entries = self.queue.read().await.snapshot(&running, page);

        let active = running.len() as u32;
        let pending = entries.len() as u32 - active;
        self.emitter
            .emit(CrawlEvent::QueueUpdated {
                snapshot: QueueSnapshot {
                    page,
                    pending,
                    active,
                    completed,
                    failed,
                    entries,
                },
            })
            .await;
    }
}
