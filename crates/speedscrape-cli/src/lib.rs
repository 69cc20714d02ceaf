#![deny(unsafe_code)]

//! CLI adapter for speedscrape.
//!
//! The binary wires a `WebDriverBrowser`, a `JsonSessionStore` and a
//! terminal event emitter into the crawler. Everything here is adapter
//! code; crawl semantics live in `speedscrape-crawler`.

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, CrawlArgs};
pub use parser::Cli;
pub use presentation::CliCrawlEmitter;
