//! Paths command handler.
//!
//! Displays resolved paths in `key = value` format for diagnostics.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command.
pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("output_dir   = {}", ctx.output_dir().display());
    println!("session_file = {}", ctx.store().path().display());
    Ok(())
}
