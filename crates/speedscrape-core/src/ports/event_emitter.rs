//! Event emitter port: how crawl progress reaches a frontend.

use async_trait::async_trait;

use crate::crawl::CrawlEvent;

/// Sink for crawl events.
#[async_trait]
pub trait CrawlEventEmitterPort: Send + Sync {
    /// Deliver one event. Emitters must not block the crawl; drop or buffer
    /// instead of waiting.
    async fn emit(&self, event: CrawlEvent);
}

/// Emitter that discards everything. Useful in tests and for headless runs
/// that only want the final summary.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCrawlEmitter;

#[async_trait]
impl CrawlEventEmitterPort for NoopCrawlEmitter {
    async fn emit(&self, _event: CrawlEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_emitter_accepts_events() {
        let emitter = NoopCrawlEmitter;
        emitter
            .emit(CrawlEvent::RunStarted {
                start_page: 1,
                visited_count: 0,
            })
            .await;
    }
}
