//! Main commands enum and primary subcommands.
//!
//! This module defines the available commands for the CLI tool.

use clap::{Args, Subcommand};

use speedscrape_browser::config::DEFAULT_WEBDRIVER_URL;

/// Available commands for the Speedhunters archive crawler.
#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the category index and download every article as a PDF
    Crawl(CrawlArgs),

    /// Show the saved crawl session
    Status,

    /// Delete the saved crawl session so the next crawl starts from page 1
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show the resolved output paths
    Paths,
}

/// Arguments for the crawl command.
#[derive(Args)]
pub struct CrawlArgs {
    /// Stop after this many index pages (default: crawl to the last page)
    #[arg(long)]
    pub pages: Option<u32>,

    /// Concurrent article downloads (1-32)
    #[arg(short, long, default_value_t = 4)]
    pub concurrency: usize,

    /// Pause after each article loads before printing it, in seconds
    #[arg(long, default_value_t = 0.5)]
    pub delay: f64,

    /// Ignore the saved session and start from page 1
    #[arg(long)]
    pub no_resume: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,

    /// WebDriver server URL
    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Browser behind the WebDriver endpoint: edge, chrome, firefox
    #[arg(long, default_value = "edge")]
    pub browser: String,
}
