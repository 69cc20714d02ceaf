//! Port traits implemented by adapters.
//!
//! The crawler drives these; the browser crate and the CLI provide the
//! implementations. Keeping them here lets the crawler be tested with mocks.

mod browser;
mod event_emitter;
mod session_store;

pub use browser::{BrowserPort, PhaseSink, RenderedArticle};
pub use event_emitter::{CrawlEventEmitterPort, NoopCrawlEmitter};
pub use session_store::SessionStorePort;
