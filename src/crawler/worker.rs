//! Isolated crawl workers
//!
//! A traversal runs on its own tokio task so a hung or panicking fetch cannot
//! block or unwind the dispatcher. One worker is created per crawl and it is
//! always torn down: explicitly through [`CrawlWorker::terminate`], or by
//! `Drop` when the owning future is cancelled.

use crate::crawler::traversal::{panic_message, LinkSet};
use crate::CrawlerError;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to one spawned traversal task
pub struct CrawlWorker {
    id: u64,
    url: String,
    handle: Option<JoinHandle<LinkSet>>,
    joined: bool,
}

impl CrawlWorker {
    /// Spawns `task` on the current tokio runtime
    ///
    /// Fails with [`CrawlerError::WorkerSpawn`] when called outside a runtime.
    pub fn spawn<F>(url: &str, task: F) -> Result<Self, CrawlerError>
    where
        F: Future<Output = LinkSet> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| CrawlerError::WorkerSpawn {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        let handle = runtime.spawn(task);
        tracing::debug!("Spawned worker {} for {}", id, url);

        Ok(Self {
            id,
            url: url.to_string(),
            handle: Some(handle),
            joined: false,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the traversal to finish
    ///
    /// A panic inside the task becomes [`CrawlerError::WorkerFailed`]. A worker
    /// can only be joined once.
    pub async fn join(&mut self) -> Result<LinkSet, CrawlerError> {
        if self.joined {
            return Err(self.failure("worker was already joined".to_string()));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.failure("worker was terminated".to_string()));
        };

        let result = handle.await;
        self.joined = true;

        match result {
            Ok(links) => Ok(links),
            Err(e) if e.is_panic() => Err(self.failure(panic_message(&*e.into_panic()))),
            Err(e) => Err(self.failure(e.to_string())),
        }
    }

    /// Tears the worker down, aborting the task if it is still running
    pub fn terminate(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
                tracing::warn!("Aborted worker {} for {}", self.id, self.url);
            }
            tracing::debug!("Terminated worker {} for {}", self.id, self.url);
        }
    }

    fn failure(&self, message: String) -> CrawlerError {
        CrawlerError::WorkerFailed {
            url: self.url.clone(),
            message,
        }
    }
}

impl Drop for CrawlWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs `task` on a dedicated worker and returns its result
///
/// The worker is terminated before this returns, whatever the outcome.
pub async fn run_isolated<F>(url: &str, task: F) -> Result<LinkSet, CrawlerError>
where
    F: Future<Output = LinkSet> + Send + 'static,
{
    let mut worker = CrawlWorker::spawn(url, task)?;
    let result = worker.join().await;
    worker.terminate();
    result
}
