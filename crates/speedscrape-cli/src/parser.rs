//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface definition for the Speedhunters archive crawler.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "speedscrape")]
#[command(about = "Crawl speedhunters.com and save every article as a PDF")]
#[command(version)]
pub struct Cli {
    /// Directory PDFs and the session file are written to
    #[arg(long = "output-dir", global = true, default_value = "speedhunters_pdfs")]
    pub output_dir: String,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
