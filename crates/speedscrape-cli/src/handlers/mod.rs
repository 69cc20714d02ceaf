//! Command handlers.
//!
//! Each handler receives the composed `CliContext` and delegates to the
//! crawler or the session store.

pub mod crawl;
pub mod paths;
pub mod reset;
pub mod status;
