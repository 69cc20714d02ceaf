//! Persisted crawl session model.
//!
//! The session is what makes runs resumable: it records the last index page
//! whose articles were all saved, plus every article URL already downloaded.
//! Older session files were a bare JSON array of visited URLs; those still
//! load, with the page counter starting over at zero.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawl::ArticleId;

/// Resumable crawl state, stored as JSON next to the output directory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "SessionFormat")]
pub struct CrawlSession {
    /// Highest index page whose articles were all saved or skipped.
    pub completed_pages: u32,
    /// Every article URL that has been downloaded.
    pub visited_urls: HashSet<ArticleId>,
    /// When the session was last written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CrawlSession {
    /// Fresh session with nothing visited.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The index page a resumed run should start from.
    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.completed_pages + 1
    }

    /// Whether an article has already been downloaded.
    #[must_use]
    pub fn is_visited(&self, id: &ArticleId) -> bool {
        self.visited_urls.contains(id)
    }

    /// Record an article as downloaded. Returns false if it was already there.
    pub fn mark_visited(&mut self, id: ArticleId) -> bool {
        self.visited_urls.insert(id)
    }

    /// Record an index page as fully completed.
    ///
    /// Pages only ever advance; a retried earlier page cannot move the
    /// counter backwards.
    pub fn complete_page(&mut self, page: u32) {
        if page > self.completed_pages {
            self.completed_pages = page;
        }
    }

    /// Stamp the session before persisting it.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Number of visited URLs.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited_urls.len()
    }
}

/// On-disk shapes the session file can take.
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionFormat {
    Current {
        #[serde(default)]
        completed_pages: u32,
        #[serde(default)]
        visited_urls: HashSet<ArticleId>,
        #[serde(default)]
        updated_at: Option<DateTime<Utc>>,
    },
    /// Bare array of visited URLs, written by early versions.
    Legacy(Vec<ArticleId>),
}

impl From<SessionFormat> for CrawlSession {
    fn from(format: SessionFormat) -> Self {
        match format {
            SessionFormat::Current {
                completed_pages,
                visited_urls,
                updated_at,
            } => Self {
                completed_pages,
                visited_urls,
                updated_at,
            },
            SessionFormat::Legacy(urls) => Self {
                completed_pages: 0,
                visited_urls: urls.into_iter().collect(),
                updated_at: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_starts_at_page_one() {
        let session = CrawlSession::new();
        assert_eq!(session.next_page(), 1);
        assert_eq!(session.visited_count(), 0);
    }

    #[test]
    fn complete_page_never_regresses() {
        let mut session = CrawlSession::new();
        session.complete_page(3);
        session.complete_page(2);
        assert_eq!(session.completed_pages, 3);
        assert_eq!(session.next_page(), 4);
    }

    #[test]
    fn mark_visited_dedupes() {
        let mut session = CrawlSession::new();
        let id = ArticleId::new("https://www.speedhunters.com/2024/01/a/");
        assert!(session.mark_visited(id.clone()));
        assert!(!session.mark_visited(id.clone()));
        assert!(session.is_visited(&id));
    }

    #[test]
    fn loads_current_format() {
        let json = r#"{
            "completed_pages": 5,
            "visited_urls": ["https://www.speedhunters.com/2024/01/a/"]
        }"#;
        let session: CrawlSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.completed_pages, 5);
        assert_eq!(session.visited_count(), 1);
        assert_eq!(session.next_page(), 6);
    }

    #[test]
    fn loads_legacy_bare_array() {
        let json = r#"["https://www.speedhunters.com/2024/01/a/",
                       "https://www.speedhunters.com/2024/01/b/"]"#;
        let session: CrawlSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.completed_pages, 0);
        assert_eq!(session.visited_count(), 2);
        assert!(session.is_visited(&ArticleId::new(
            "https://www.speedhunters.com/2024/01/a/"
        )));
    }

    #[test]
    fn round_trips_through_json() {
        let mut session = CrawlSession::new();
        session.complete_page(2);
        session.mark_visited(ArticleId::new("https://www.speedhunters.com/2024/01/a/"));
        session.touch();

        let json = serde_json::to_string(&session).unwrap();
        let parsed: CrawlSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.completed_pages, 2);
        assert_eq!(parsed.visited_count(), 1);
        assert!(parsed.updated_at.is_some());
    }
}
