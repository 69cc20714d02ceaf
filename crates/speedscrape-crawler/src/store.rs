//! JSON session store.
//!
//! Persists the crawl session to `progress.json` inside the output
//! directory. Saves are atomic: the session is written to a temp file in
//! the same directory and renamed over the old one, so a crash mid-save
//! cannot corrupt the existing file.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use speedscrape_core::{CrawlError, CrawlResult, CrawlSession, SessionStorePort, session_file_path};

/// Session store backed by a JSON file.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Store for the given output directory.
    #[must_use]
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: session_file_path(output_dir),
        }
    }

    /// Store reading and writing an explicit file path.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the session file if it exists.
    pub async fn delete(&self) -> CrawlResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CrawlError::from_io_error(&e)),
        }
    }
}

#[async_trait]
impl SessionStorePort for JsonSessionStore {
    async fn load(&self) -> CrawlResult<CrawlSession> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file, starting fresh");
                return Ok(CrawlSession::new());
            }
            Err(e) => return Err(CrawlError::from_io_error(&e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "session file is corrupt, starting fresh"
                );
                Ok(CrawlSession::new())
            }
        }
    }

    async fn save(&self, session: &CrawlSession) -> CrawlResult<()> {
        let mut stamped = session.clone();
        stamped.touch();
        let bytes = serde_json::to_vec_pretty(&stamped)
            .map_err(|e| CrawlError::session(format!("could not serialize session: {e}")))?;

        let parent = self
            .path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| CrawlError::from_io_error(&e))?;

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&parent)?;
            tmp.write_all(&bytes)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CrawlError::session(format!("session save task failed: {e}")))?;

        result.map_err(|e| CrawlError::from_io_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedscrape_core::ArticleId;

    #[tokio::test]
    async fn missing_file_loads_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());

        let session = store.load().await.unwrap();
        assert_eq!(session.completed_pages, 0);
        assert_eq!(session.visited_count(), 0);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());

        let mut session = CrawlSession::new();
        session.complete_page(4);
        session.mark_visited(ArticleId::new("https://www.speedhunters.com/2024/01/a/"));
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.completed_pages, 4);
        assert_eq!(loaded.visited_count(), 1);
        assert!(loaded.updated_at.is_some());
    }

    #[tokio::test]
    async fn corrupt_file_loads_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        tokio::fs::write(store.path(), b"{not json!").await.unwrap();

        let session = store.load().await.unwrap();
        assert_eq!(session.completed_pages, 0);
    }

    #[tokio::test]
    async fn legacy_array_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        tokio::fs::write(
            store.path(),
            br#"["https://www.speedhunters.com/2024/01/a/"]"#,
        )
        .await
        .unwrap();

        let session = store.load().await.unwrap();
        assert_eq!(session.completed_pages, 0);
        assert_eq!(session.visited_count(), 1);
    }

    #[tokio::test]
    async fn save_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        let store = JsonSessionStore::new(&nested);

        store.save(&CrawlSession::new()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());

        store.save(&CrawlSession::new()).await.unwrap();
        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert!(!store.path().exists());
    }
}
