//! Core domain types and port definitions for speedscrape.
//!
//! This crate holds the pure domain of the crawler: article identities,
//! crawl errors and events, the persisted session model, configuration,
//! and the port traits that adapters implement. No I/O happens here.

pub mod config;
pub mod crawl;
pub mod paths;
pub mod ports;
pub mod session;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use crawl::{
    ArticleId, ArticlePhase, ArticleProgress, ArticleSummary, ArticleStatus, AttemptCounts,
    CompletionDetail, CompletionKind, CrawlError, CrawlEvent, CrawlResult, QueueEntry,
    QueueEntryStatus, QueueSnapshot, RunSummary,
};
pub use paths::{pdf_filename, sanitize_filename, session_file_path, slug_from_url};
pub use ports::{
    BrowserPort, CrawlEventEmitterPort, NoopCrawlEmitter, PhaseSink, RenderedArticle,
    SessionStorePort,
};
pub use session::CrawlSession;
