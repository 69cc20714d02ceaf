//! Reset command handler.
//!
//! Deletes the session file. Saved PDFs are never touched.

use std::io::{BufRead, Write};

use anyhow::Result;

use speedscrape_core::SessionStorePort;

use crate::bootstrap::CliContext;

/// Execute the reset command.
///
/// Prompts for confirmation unless `force` is set.
pub async fn execute(ctx: &CliContext, force: bool) -> Result<()> {
    let session = ctx.store().load().await?;
    if session.completed_pages == 0 && session.visited_count() == 0 {
        println!("No saved session at {}", ctx.store().path().display());
        return Ok(());
    }

    if !force {
        print!(
            "Delete the session covering {} page(s) and {} article(s)? [y/N] ",
            session.completed_pages,
            session.visited_count()
        );
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    ctx.store().delete().await?;
    println!("Session deleted. PDFs are kept; the next crawl starts from page 1.");
    Ok(())
}
