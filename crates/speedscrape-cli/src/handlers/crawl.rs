//! Crawl command handler.

use std::sync::Arc;

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the crawl command.
///
/// Runs the crawler to completion. Ctrl-C stops it gracefully: in-flight
/// articles are cancelled and the session keeps everything that finished,
/// so the next run resumes where this one stopped.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let crawler = Arc::clone(ctx.crawler());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping crawl");
            println!("\nStopping, cancelling in-flight articles...");
            crawler.stop().await;
        }
    });

    let summary = ctx.crawler().crawl().await?;

    if summary.counts.failed > 0 {
        anyhow::bail!(
            "{} article(s) failed; run the same command again to retry them",
            summary.counts.failed
        );
    }
    Ok(())
}
