//! Bounded background task pool.
//!
//! Sync and mutation operations are fire-and-forget at their trigger
//! sites, but every spawn still hands back a join handle so tests can
//! await completion deterministically. A semaphore caps how many passes
//! run at once; excess spawns queue until a permit frees up. There is no
//! cancellation — once launched, a pass runs to completion or failure.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::error;

/// Completion handle for a background sync operation.
///
/// The operation reports nothing through the handle; failures are only
/// observable through the log. Dropping the handle detaches the task.
pub type SyncHandle = JoinHandle<()>;

/// Semaphore-bounded pool for the blocking reconciliation jobs.
#[derive(Clone)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
}

impl TaskPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run `job` on the blocking thread pool once a permit is free.
    pub fn spawn<F>(&self, job: F) -> SyncHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while the pool is alive.
                Err(_) => return,
            };
            if let Err(err) = tokio::task::spawn_blocking(job).await {
                error!(error = %err, "sync task panicked");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_spawn_runs_job_to_completion() {
        let pool = TaskPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.spawn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_poison_the_pool() {
        let pool = TaskPool::new(1);

        pool.spawn(|| panic!("boom")).await.unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        pool.spawn(move || {
            ran2.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
