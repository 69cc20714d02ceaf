//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - WebDriver browser adapter (via speedscrape-browser)
//! - JSON session store (via speedscrape-crawler)
//! - The crawler itself, with its event emitter injected
//!
//! Command handlers receive the fully-composed `CliContext` and delegate
//! work to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use speedscrape_browser::{BrowserConfig, WebDriverBrowser};
use speedscrape_core::{CrawlConfig, CrawlEventEmitterPort};
use speedscrape_crawler::{Crawler, CrawlerDeps, JsonSessionStore, build_crawler};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Crawl settings (output directory, pagination, concurrency).
    pub crawl: CrawlConfig,
    /// Browser session settings.
    pub browser: BrowserConfig,
}

impl CliConfig {
    /// Config writing into the given output directory, everything else at
    /// its default.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            crawl: CrawlConfig::new(output_dir),
            browser: BrowserConfig::new(),
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    crawler: Arc<Crawler>,
    store: Arc<JsonSessionStore>,
    output_dir: PathBuf,
}

impl CliContext {
    /// Access the crawler.
    pub fn crawler(&self) -> &Arc<Crawler> {
        &self.crawler
    }

    /// Access the session store.
    pub fn store(&self) -> &Arc<JsonSessionStore> {
        &self.store
    }

    /// Directory PDFs are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Bootstrap the CLI application.
///
/// This is the composition root. It validates the configuration, creates
/// the WebDriver adapter and the session store, and assembles the crawler
/// with the given event emitter.
pub fn bootstrap<E>(config: CliConfig, emitter: Arc<E>) -> Result<CliContext>
where
    E: CrawlEventEmitterPort + 'static,
{
    config.crawl.validate()?;

    let output_dir = config.crawl.output_dir.clone();
    let store = Arc::new(JsonSessionStore::new(&output_dir));
    let browser = Arc::new(WebDriverBrowser::new(config.browser));

    let crawler = Arc::new(build_crawler(CrawlerDeps {
        browser,
        store: Arc::clone(&store),
        emitter,
        config: config.crawl,
    }));

    Ok(CliContext {
        crawler,
        store,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedscrape_core::NoopCrawlEmitter;

    #[test]
    fn bootstrap_composes_a_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::new(dir.path());

        let ctx = bootstrap(config, Arc::new(NoopCrawlEmitter)).unwrap();
        assert_eq!(ctx.output_dir(), dir.path());
        assert!(ctx.store().path().starts_with(dir.path()));
    }

    #[test]
    fn bootstrap_rejects_invalid_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::new(dir.path());
        config.crawl = config.crawl.with_concurrency(0);

        assert!(bootstrap(config, Arc::new(NoopCrawlEmitter)).is_err());
    }
}
