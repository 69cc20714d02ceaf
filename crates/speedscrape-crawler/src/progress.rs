//! Phase-update throttling.
//!
//! Fast articles rattle through their phases quicker than a terminal can
//! usefully show; the throttle drops intermediate updates that arrive
//! within the minimum interval. Terminal phases always go out so a
//! frontend never misses the end of an article.

use std::time::{Duration, Instant};

use speedscrape_core::ArticlePhase;

/// Rate-limiter for article phase updates.
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a throttle with the given minimum interval.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Throttle with the default 250ms interval.
    #[must_use]
    pub const fn default_interval() -> Self {
        Self::new(Duration::from_millis(250))
    }

    /// Whether a transition to `phase` should be emitted now.
    ///
    /// Terminal phases are never suppressed.
    pub fn should_emit_phase(&mut self, phase: ArticlePhase) -> bool {
        if phase.is_terminal() {
            self.last_emit = Some(Instant::now());
            return true;
        }
        self.should_emit()
    }

    /// Check whether enough time has passed to emit another update.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Force the next check to return true.
    pub const fn reset(&mut self) {
        self.last_emit = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::default_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_emit_always_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.should_emit());
    }

    #[test]
    fn respects_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(50));
        assert!(throttle.should_emit());
        assert!(!throttle.should_emit());

        std::thread::sleep(Duration::from_millis(60));
        assert!(throttle.should_emit());
    }

    #[test]
    fn terminal_phase_is_never_suppressed() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(throttle.should_emit_phase(ArticlePhase::Fetching));
        assert!(!throttle.should_emit_phase(ArticlePhase::Rendering));
        assert!(!throttle.should_emit_phase(ArticlePhase::Writing));
        assert!(throttle.should_emit_phase(ArticlePhase::Done));
    }

    #[test]
    fn reset_allows_immediate_emit() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        throttle.should_emit();
        assert!(!throttle.should_emit());

        throttle.reset();
        assert!(throttle.should_emit());
    }
}
