//! Browser port: everything the crawler needs from a WebDriver session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::crawl::{ArticlePhase, CrawlResult};

/// An article rendered to PDF.
#[derive(Clone, Debug)]
pub struct RenderedArticle {
    /// Title taken from the page's first `h1`, or a slug of the URL.
    pub title: String,
    /// The PDF document bytes.
    pub pdf: Vec<u8>,
}

impl RenderedArticle {
    /// Size of the rendered PDF in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.pdf.len()
    }
}

/// Callback an adapter uses to surface phase transitions mid-render.
pub type PhaseSink = Arc<dyn Fn(ArticlePhase) + Send + Sync>;

/// Abstraction over the browser automation layer.
#[async_trait]
pub trait BrowserPort: Send + Sync {
    /// Collect article links from an index page.
    ///
    /// Returns `Ok(None)` when the page has no article list, which means the
    /// crawl walked past the last index page. Returns `Ok(Some(vec![]))` for
    /// a page whose list exists but is empty.
    async fn collect_article_links(&self, page_url: &str) -> CrawlResult<Option<Vec<String>>>;

    /// Navigate to an article and render it to PDF.
    ///
    /// `delay` is how long to pause once the article has loaded, letting
    /// lazy images settle before printing. The adapter reports the switch
    /// from navigation to printing through `on_phase`. Each call uses its
    /// own browser session so articles can be rendered concurrently.
    async fn save_article(
        &self,
        article_url: &str,
        delay: Duration,
        on_phase: PhaseSink,
    ) -> CrawlResult<RenderedArticle>;

    /// Tear down any live browser sessions.
    ///
    /// Called on cancellation so windows do not linger.
    async fn shutdown(&self);
}
