//! Terminal rendering of crawl events.
//!
//! Presentation-only module. A spinner tracks the live queue state while
//! per-article outcomes are printed above it. When stdout is not a
//! terminal the spinner is hidden and everything goes out as plain lines.

use std::io::{self, IsTerminal};
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use speedscrape_core::{ArticleStatus, CrawlEvent, CrawlEventEmitterPort};

/// Event emitter that renders crawl progress in the terminal.
pub struct CliCrawlEmitter {
    bar: ProgressBar,
}

impl CliCrawlEmitter {
    /// Create an emitter, auto-detecting terminal capability.
    pub fn new() -> Self {
        let bar = if io::stdout().is_terminal() {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Print a line without disturbing the spinner.
    fn line(&self, text: String) {
        if self.bar.is_hidden() {
            println!("{text}");
        } else {
            self.bar.println(text);
        }
    }

    fn status(&self, text: String) {
        if self.bar.is_hidden() {
            println!("{text}");
        } else {
            self.bar.set_message(text);
        }
    }
}

impl Default for CliCrawlEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrawlEventEmitterPort for CliCrawlEmitter {
    async fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::RunStarted {
                start_page,
                visited_count,
            } => {
                if visited_count > 0 {
                    self.line(format!(
                        "Resuming from page {start_page} ({visited_count} articles already saved)"
                    ));
                } else {
                    self.line(format!("Starting from page {start_page}"));
                }
            }
            CrawlEvent::PageStarted { page, url } => {
                self.status(format!("page {page}: loading {url}"));
            }
            CrawlEvent::PageCollected { page, found, new } => {
                self.line(format!("Page {page}: {found} articles listed, {new} new"));
            }
            CrawlEvent::PageCompleted { page } => {
                self.line(format!("Page {page} complete"));
            }
            CrawlEvent::PageFailed { page, failed } => {
                self.line(format!(
                    "Page {page} stopped with {failed} failed article(s); it will be retried on the next run"
                ));
            }
            CrawlEvent::ArticleProgress { id, phase } => {
                self.status(format!("{} {id}", phase.as_str()));
            }
            CrawlEvent::ArticleCompleted { summary } => match summary.status {
                ArticleStatus::Saved => {
                    let filename = summary.filename.unwrap_or_default();
                    self.line(format!("  saved   {filename}"));
                }
                ArticleStatus::Skipped => {
                    self.line(format!("  skipped {}", summary.id));
                }
                ArticleStatus::Failed => {
                    let reason = summary
                        .error
                        .map_or_else(|| "unknown error".to_string(), |e| e.user_message());
                    self.line(format!("  FAILED  {}: {reason}", summary.id));
                }
            },
            CrawlEvent::QueueUpdated { snapshot } => {
                self.status(format!(
                    "page {}: {} active, {} queued, {} done",
                    snapshot.page, snapshot.active, snapshot.pending, snapshot.completed
                ));
            }
            CrawlEvent::RunFinished {
                saved,
                skipped,
                failed,
                cancelled,
            } => {
                self.bar.finish_and_clear();
                let ending = if cancelled { " (cancelled)" } else { "" };
                println!("Done{ending}: {saved} saved, {skipped} skipped, {failed} failed");
            }
        }
    }
}
