//! Session store port: persistence of the resumable crawl state.

use async_trait::async_trait;

use crate::crawl::CrawlResult;
use crate::session::CrawlSession;

/// Load and save the crawl session.
#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// Load the saved session.
    ///
    /// A missing file yields a fresh session. A corrupt file is treated the
    /// same way after logging a warning; the crawl must not be blocked by a
    /// damaged session file.
    async fn load(&self) -> CrawlResult<CrawlSession>;

    /// Persist the session.
    ///
    /// Saves happen after every article so an interrupted run loses at most
    /// the article in flight. The write must be atomic: a crash mid-save may
    /// not corrupt the existing file.
    async fn save(&self, session: &CrawlSession) -> CrawlResult<()>;
}
