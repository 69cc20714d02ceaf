//! Crawl domain: identities, errors, events, and run accounting.

mod completion;
mod errors;
mod events;
mod types;

pub use completion::{AttemptCounts, CompletionDetail, CompletionKind, RunSummary};
pub use errors::{CrawlError, CrawlResult};
pub use events::{
    ArticleStatus, ArticleSummary, CrawlEvent, QueueEntry, QueueEntryStatus, QueueSnapshot,
};
pub use types::{ArticleId, ArticlePhase, ArticleProgress};
