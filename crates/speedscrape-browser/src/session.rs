//! WebDriver sessions implementing the browser port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thirtyfour::common::print::PrintParameters;
use thirtyfour::prelude::*;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use speedscrape_core::{
    ArticlePhase, BrowserPort, CrawlError, CrawlResult, PhaseSink, RenderedArticle, slug_from_url,
};

use crate::config::{BrowserConfig, BrowserKind};
use crate::selectors;

/// Polling interval for element waits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser adapter backed by a WebDriver server.
///
/// One lazily started session walks the index pages for the whole crawl.
/// Every article render opens its own session, so articles can be processed
/// concurrently without window juggling. Live article sessions are tracked
/// so [`shutdown`](BrowserPort::shutdown) can force-quit them mid-render.
pub struct WebDriverBrowser {
    config: BrowserConfig,
    index_driver: RwLock<Option<WebDriver>>,
    article_drivers: Mutex<HashMap<u64, WebDriver>>,
    next_driver_id: AtomicU64,
}

impl WebDriverBrowser {
    /// Create an adapter. No browser starts until the first request.
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            index_driver: RwLock::new(None),
            article_drivers: Mutex::new(HashMap::new()),
            next_driver_id: AtomicU64::new(0),
        }
    }

    /// The adapter's configuration.
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Start a fresh WebDriver session.
    async fn new_session(&self) -> CrawlResult<WebDriver> {
        let caps = build_capabilities(&self.config)?;
        let driver = WebDriver::new(&self.config.webdriver_url, caps)
            .await
            .map_err(|e| {
                CrawlError::session(format!(
                    "could not start browser via {}: {e}",
                    self.config.webdriver_url
                ))
            })?;

        driver
            .set_page_load_timeout(Duration::from_secs(self.config.page_load_timeout_secs))
            .await
            .map_err(wd_err)?;

        Ok(driver)
    }

    /// Get the long-lived index session, starting it on first use.
    async fn index_session(&self) -> CrawlResult<WebDriver> {
        {
            let guard = self.index_driver.read().await;
            if let Some(driver) = guard.as_ref() {
                return Ok(driver.clone());
            }
        }

        let mut guard = self.index_driver.write().await;
        if let Some(driver) = guard.as_ref() {
            return Ok(driver.clone());
        }

        debug!("starting index browser session");
        let driver = self.new_session().await?;
        *guard = Some(driver.clone());
        Ok(driver)
    }

    async fn register(&self, driver: WebDriver) -> u64 {
        let id = self.next_driver_id.fetch_add(1, Ordering::Relaxed);
        self.article_drivers.lock().await.insert(id, driver);
        id
    }

    async fn deregister(&self, id: u64) {
        self.article_drivers.lock().await.remove(&id);
    }

    /// Navigate to an article and render it to PDF in the given session.
    async fn render(
        &self,
        driver: &WebDriver,
        article_url: &str,
        delay: Duration,
        on_phase: &PhaseSink,
    ) -> CrawlResult<RenderedArticle> {
        driver
            .goto(article_url)
            .await
            .map_err(|e| CrawlError::navigation(article_url, e.to_string()))?;

        let wait = Duration::from_secs(self.config.wait_timeout_secs);
        driver
            .query(By::XPath(selectors::ARTICLE_ROOT))
            .wait(wait, POLL_INTERVAL)
            .first()
            .await
            .map_err(|_| CrawlError::page_timeout(article_url))?;

        // Let lazy-loaded images settle before printing.
        tokio::time::sleep(delay).await;
        on_phase(ArticlePhase::Rendering);

        let title = article_title(driver)
            .await
            .unwrap_or_else(|| slug_from_url(article_url));

        let params = PrintParameters {
            background: true,
            ..Default::default()
        };
        let encoded = driver.print_page_base64(params).await.map_err(wd_err)?;
        let pdf = STANDARD
            .decode(encoded)
            .map_err(|e| CrawlError::browser(format!("invalid PDF payload: {e}")))?;

        Ok(RenderedArticle { title, pdf })
    }
}

#[async_trait]
impl BrowserPort for WebDriverBrowser {
    async fn collect_article_links(&self, page_url: &str) -> CrawlResult<Option<Vec<String>>> {
        let driver = self.index_session().await?;

        driver
            .goto(page_url)
            .await
            .map_err(|e| CrawlError::navigation(page_url, e.to_string()))?;

        let wait = Duration::from_secs(self.config.wait_timeout_secs);
        let list = driver
            .query(By::XPath(selectors::ARTICLE_LIST))
            .wait(wait, POLL_INTERVAL)
            .first()
            .await;
        if list.is_err() {
            // No article list means we walked past the last index page.
            debug!(page_url, "no article list found");
            return Ok(None);
        }

        let anchors = driver
            .find_all(By::XPath(selectors::ARTICLE_LINKS))
            .await
            .map_err(wd_err)?;

        let mut links = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            if let Some(href) = anchor.attr("href").await.map_err(wd_err)? {
                links.push(href);
            }
        }

        debug!(page_url, count = links.len(), "collected article links");
        Ok(Some(links))
    }

    async fn save_article(
        &self,
        article_url: &str,
        delay: Duration,
        on_phase: PhaseSink,
    ) -> CrawlResult<RenderedArticle> {
        let driver = self.new_session().await?;
        let id = self.register(driver.clone()).await;

        let result = self.render(&driver, article_url, delay, &on_phase).await;

        self.deregister(id).await;
        if let Err(error) = driver.quit().await {
            // Session may already be gone if shutdown raced us.
            debug!(%error, article_url, "article session was already closed");
        }

        result
    }

    async fn shutdown(&self) {
        if let Some(driver) = self.index_driver.write().await.take() {
            if let Err(error) = driver.quit().await {
                warn!(%error, "failed to quit index session");
            }
        }

        let drivers: Vec<WebDriver> = {
            let mut guard = self.article_drivers.lock().await;
            guard.drain().map(|(_, driver)| driver).collect()
        };
        for driver in drivers {
            if let Err(error) = driver.quit().await {
                debug!(%error, "failed to quit article session");
            }
        }
    }
}

/// First `h1` text of the current page, if it has one.
async fn article_title(driver: &WebDriver) -> Option<String> {
    let heading = driver.find(By::Tag("h1")).await.ok()?;
    let text = heading.text().await.ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn wd_err(error: WebDriverError) -> CrawlError {
    CrawlError::browser(error.to_string())
}

/// Build WebDriver capabilities for the configured browser.
fn build_capabilities(config: &BrowserConfig) -> CrawlResult<Capabilities> {
    let window_size = format!("--window-size={},{}", config.window_width, config.window_height);

    let caps = match config.kind {
        BrowserKind::Edge => {
            let mut caps = DesiredCapabilities::edge();
            if config.headless {
                caps.add_arg("--headless=new").map_err(wd_err)?;
            }
            caps.add_arg("--disable-gpu").map_err(wd_err)?;
            caps.add_arg("--no-sandbox").map_err(wd_err)?;
            caps.add_arg(&window_size).map_err(wd_err)?;
            for arg in &config.extra_args {
                caps.add_arg(arg).map_err(wd_err)?;
            }
            caps.into()
        }
        BrowserKind::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            if config.headless {
                caps.add_arg("--headless=new").map_err(wd_err)?;
            }
            caps.add_arg("--disable-gpu").map_err(wd_err)?;
            caps.add_arg("--no-sandbox").map_err(wd_err)?;
            caps.add_arg(&window_size).map_err(wd_err)?;
            for arg in &config.extra_args {
                caps.add_arg(arg).map_err(wd_err)?;
            }
            caps.into()
        }
        BrowserKind::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            if config.headless {
                caps.add_arg("-headless").map_err(wd_err)?;
            }
            for arg in &config.extra_args {
                caps.add_arg(arg).map_err(wd_err)?;
            }
            caps.into()
        }
    };

    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps_json(config: &BrowserConfig) -> String {
        let caps = build_capabilities(config).unwrap();
        serde_json::to_string(&caps).unwrap()
    }

    #[test]
    fn headless_flag_applied() {
        let config = BrowserConfig::default();
        assert!(caps_json(&config).contains("--headless=new"));

        let headful = BrowserConfig::default().with_headless(false);
        assert!(!caps_json(&headful).contains("--headless"));
    }

    #[test]
    fn window_size_applied() {
        let config = BrowserConfig::default();
        assert!(caps_json(&config).contains("--window-size=1920,1080"));
    }

    #[test]
    fn extra_args_forwarded() {
        let config = BrowserConfig::default().with_arg("--disable-extensions");
        assert!(caps_json(&config).contains("--disable-extensions"));
    }

    #[test]
    fn firefox_uses_single_dash_headless() {
        let config = BrowserConfig::default().with_kind(BrowserKind::Firefox);
        assert!(caps_json(&config).contains("-headless"));
    }
}
