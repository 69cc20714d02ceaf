//! Status command handler.
//!
//! Shows the saved crawl session without touching the browser.

use anyhow::Result;

use speedscrape_core::SessionStorePort;

use crate::bootstrap::CliContext;

/// Execute the status command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let session = ctx.store().load().await?;

    println!("session file    = {}", ctx.store().path().display());
    println!("pages completed = {}", session.completed_pages);
    println!("articles saved  = {}", session.visited_count());
    println!("next page       = {}", session.next_page());
    if let Some(updated) = session.updated_at {
        println!("last updated    = {updated}");
    }
    Ok(())
}
