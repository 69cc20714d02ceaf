//! WebDriver adapter: the browser side of the crawl.
//!
//! Implements [`speedscrape_core::BrowserPort`] with thirtyfour. One
//! long-lived session walks the index pages; each article gets its own
//! short-lived session so downloads can run concurrently.

pub mod config;
mod selectors;
pub mod session;

pub use config::{BrowserConfig, BrowserKind};
pub use session::WebDriverBrowser;
