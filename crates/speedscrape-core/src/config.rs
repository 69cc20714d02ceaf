//! Crawl configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crawl::{CrawlError, CrawlResult};

/// Minimum number of concurrent article downloads.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum number of concurrent article downloads.
pub const MAX_CONCURRENCY: usize = 32;

/// Default number of concurrent article downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default pause after an article loads, letting lazy images settle.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Default cap on articles queued from a single index page.
pub const DEFAULT_MAX_QUEUE_SIZE: u32 = 128;

/// Index of all content articles, oldest pages last.
pub const DEFAULT_CATEGORY_URL: &str = "https://www.speedhunters.com/category/content/";

/// Settings for a crawl run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Directory PDFs are written to. The session file lives here too.
    pub output_dir: PathBuf,
    /// Category index the crawl walks through.
    pub base_url: String,
    /// Stop after this many index pages. `None` crawls to the last page.
    pub max_pages: Option<u32>,
    /// Concurrent article downloads.
    pub concurrency: usize,
    /// Pause after an article loads before printing it.
    #[serde(with = "duration_millis")]
    pub delay: Duration,
    /// Cap on articles queued from one index page.
    pub max_queue_size: u32,
    /// Load the session file and continue where the last run stopped.
    pub resume: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("speedhunters_pdfs"),
            base_url: DEFAULT_CATEGORY_URL.to_string(),
            max_pages: None,
            concurrency: DEFAULT_CONCURRENCY,
            delay: DEFAULT_DELAY,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            resume: true,
        }
    }
}

impl CrawlConfig {
    /// Config writing into the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Set the number of concurrent downloads.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the pause after an article loads.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Limit the run to a number of index pages.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Start from scratch instead of resuming the saved session.
    #[must_use]
    pub const fn without_resume(mut self) -> Self {
        self.resume = false;
        self
    }

    /// URL of an index page, 1-based.
    ///
    /// The first page is the bare category URL; `page/{N}/` only exists
    /// for later pages.
    #[must_use]
    pub fn index_url(&self, page: u32) -> String {
        if page <= 1 {
            self.base_url.clone()
        } else {
            format!("{}page/{page}/", self.base_url)
        }
    }

    /// Check the configuration for out-of-range values.
    pub fn validate(&self) -> CrawlResult<()> {
        if self.concurrency < MIN_CONCURRENCY || self.concurrency > MAX_CONCURRENCY {
            return Err(CrawlError::invalid_config(format!(
                "concurrency must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        if self.max_pages == Some(0) {
            return Err(CrawlError::invalid_config("max_pages must be at least 1"));
        }
        if self.max_queue_size == 0 {
            return Err(CrawlError::invalid_config(
                "max_queue_size must be at least 1",
            ));
        }
        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.delay, Duration::from_millis(500));
        assert!(config.resume);
    }

    #[test]
    fn rejects_out_of_range_concurrency() {
        assert!(CrawlConfig::default().with_concurrency(0).validate().is_err());
        assert!(CrawlConfig::default().with_concurrency(33).validate().is_err());
        assert!(CrawlConfig::default().with_concurrency(32).validate().is_ok());
    }

    #[test]
    fn rejects_zero_max_pages() {
        let config = CrawlConfig::default().with_max_pages(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn index_urls_are_paginated() {
        let config = CrawlConfig::default();
        assert_eq!(
            config.index_url(7),
            "https://www.speedhunters.com/category/content/page/7/"
        );
    }

    #[test]
    fn first_index_url_is_the_bare_category() {
        let config = CrawlConfig::default();
        assert_eq!(
            config.index_url(1),
            "https://www.speedhunters.com/category/content/"
        );
    }

    #[test]
    fn delay_round_trips_as_millis() {
        let config = CrawlConfig::default().with_delay(Duration::from_millis(250));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["delay"], 250);
        let parsed: CrawlConfig = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.delay, Duration::from_millis(250));
    }
}
