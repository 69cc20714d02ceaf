//! Browser configuration.

use serde::{Deserialize, Serialize};

/// Default WebDriver endpoint (msedgedriver and chromedriver both listen here).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Which browser the WebDriver endpoint is driving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Microsoft Edge via msedgedriver.
    #[default]
    Edge,
    /// Chrome or Chromium via chromedriver.
    Chrome,
    /// Firefox via geckodriver.
    Firefox,
}

impl BrowserKind {
    /// Parse a browser name as given on the command line.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "edge" => Some(Self::Edge),
            "chrome" | "chromium" => Some(Self::Chrome),
            "firefox" => Some(Self::Firefox),
            _ => None,
        }
    }
}

/// Settings for browser sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver server URL.
    pub webdriver_url: String,
    /// Browser behind the WebDriver endpoint.
    pub kind: BrowserKind,
    /// Run without a visible window.
    pub headless: bool,
    /// Window width in pixels. Affects page layout in the rendered PDF.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Page load timeout in seconds.
    pub page_load_timeout_secs: u64,
    /// How long to wait for page content to appear, in seconds.
    pub wait_timeout_secs: u64,
    /// Extra arguments passed to the browser.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            kind: BrowserKind::Edge,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            page_load_timeout_secs: 60,
            wait_timeout_secs: 10,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the WebDriver URL.
    #[must_use]
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Set the browser kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: BrowserKind) -> Self {
        self.kind = kind;
        self
    }

    /// Enable or disable headless mode.
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Add an extra browser argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.kind, BrowserKind::Edge);
        assert!(config.headless);
    }

    #[test]
    fn parse_browser_names() {
        assert_eq!(BrowserKind::parse("edge"), Some(BrowserKind::Edge));
        assert_eq!(BrowserKind::parse("Chrome"), Some(BrowserKind::Chrome));
        assert_eq!(BrowserKind::parse("chromium"), Some(BrowserKind::Chrome));
        assert_eq!(BrowserKind::parse("safari"), None);
    }

    #[test]
    fn builder_chains() {
        let config = BrowserConfig::new()
            .with_kind(BrowserKind::Chrome)
            .with_headless(false)
            .with_arg("--disable-extensions");
        assert_eq!(config.kind, BrowserKind::Chrome);
        assert!(!config.headless);
        assert_eq!(config.extra_args, vec!["--disable-extensions"]);
    }
}
