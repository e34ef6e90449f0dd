//! In-memory job queue for tests and local development.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::orchestration::ports::{JobQueue, QueueError, QueuedJob};

/// FIFO in-memory job queue.
///
/// Jobs are drained by a caller-driven loop (see the job runner); there is
/// no automatic retry here, unlike the production queue this stands in for.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobQueue {
    jobs: Arc<Mutex<VecDeque<QueuedJob>>>,
}

impl InMemoryJobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the oldest queued job.
    #[must_use]
    pub fn pop(&self) -> Option<QueuedJob> {
        self.jobs.lock().ok()?.pop_front()
    }

    /// Returns a snapshot of the queued jobs in FIFO order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QueuedJob> {
        self.jobs
            .lock()
            .map(|jobs| jobs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or_default()
    }

    /// Returns `true` when no job is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        jobs.push_back(job);
        Ok(())
    }
}
