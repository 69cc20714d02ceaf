//! Article worker pipeline.
//!
//! The worker renders one article and writes its PDF to disk. It operates
//! on a value type and a cloned browser handle, with no access to the
//! crawler's locks. Progress goes through the `watch::Sender` only; the
//! bridge task spawned by the crawler turns it into events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use speedscrape_core::{
    ArticleId, ArticlePhase, ArticleProgress, BrowserPort, CrawlError, CrawlResult, PhaseSink,
    pdf_filename,
};

/// A render job for one article.
///
/// Value type with everything the worker needs, no references back to the
/// crawler.
pub struct ArticleJob {
    /// The article URL.
    pub id: ArticleId,
    /// Index page the article was collected from.
    pub page: u32,
    /// Directory the PDF is written to.
    pub output_dir: PathBuf,
    /// Pause after the article loads, letting lazy images settle.
    pub delay: Duration,
    /// Cancellation token for this job.
    pub cancel: CancellationToken,
    /// Progress sender for this job.
    pub progress_tx: watch::Sender<ArticleProgress>,
}

/// Result of a successful render.
#[derive(Clone, Debug)]
pub struct SavedArticle {
    /// The article URL.
    pub id: ArticleId,
    /// Filename of the written PDF.
    pub filename: String,
    /// Size of the PDF in bytes.
    pub bytes_written: usize,
}

/// Run one article job to completion.
///
/// Navigates to the article, renders it to PDF, and writes the file.
/// An existing file with the same name is overwritten; titles are not
/// unique enough to be trusted as identity, the session's visited set is.
///
/// The browser adapter reports its switch from navigation to printing
/// through a phase sink wired to the job's progress sender.
///
/// # Cancellation
///
/// Returns `Err(CrawlError::Cancelled)` when `job.cancel` fires before
/// the render finishes.
pub async fn run_job(job: ArticleJob, browser: Arc<dyn BrowserPort>) -> CrawlResult<SavedArticle> {
    set_phase(&job.progress_tx, ArticlePhase::Fetching);

    let on_phase: PhaseSink = {
        let tx = job.progress_tx.clone();
        Arc::new(move |phase| set_phase(&tx, phase))
    };

    let rendered = tokio::select! {
        biased;

        () = job.cancel.cancelled() => {
            return Err(CrawlError::Cancelled);
        }

        result = browser.save_article(job.id.url(), job.delay, on_phase) => result?,
    };

    set_phase(&job.progress_tx, ArticlePhase::Writing);

    let filename = pdf_filename(&rendered.title);
    let path = job.output_dir.join(&filename);
    let bytes_written = rendered.pdf.len();
    tokio::fs::write(&path, &rendered.pdf)
        .await
        .map_err(|e| CrawlError::from_io_error(&e))?;

    set_phase(&job.progress_tx, ArticlePhase::Done);

    Ok(SavedArticle {
        id: job.id,
        filename,
        bytes_written,
    })
}

fn set_phase(tx: &watch::Sender<ArticleProgress>, phase: ArticlePhase) {
    tx.send_modify(|state| {
        state.phase = phase;
        state.seq += 1;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_phase_bumps_seq() {
        let (tx, rx) = watch::channel(ArticleProgress::default());
        set_phase(&tx, ArticlePhase::Fetching);
        set_phase(&tx, ArticlePhase::Writing);

        let current = rx.borrow();
        assert_eq!(current.phase, ArticlePhase::Writing);
        assert_eq!(current.seq, 2);
    }
}
