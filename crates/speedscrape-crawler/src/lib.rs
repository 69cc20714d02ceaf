//! Crawl orchestration.
//!
//! Walks the category index page by page, queues the articles each page
//! links to, and drains the queue with a bounded pool of concurrent
//! renders. The session file is updated after every article so an
//! interrupted run resumes where it stopped.

pub mod manager;
pub mod progress;
pub mod queue;
pub mod store;

pub use manager::{Crawler, CrawlerDeps, build_crawler};
pub use progress::ProgressThrottle;
pub use queue::{ArticleQueue, FailedArticle, QueuedArticle};
pub use store::JsonSessionStore;
