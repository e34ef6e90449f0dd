//! Asynchronous job-queue port.
//!
//! Dispatch and merge operations wait on external network calls, so they are
//! offloaded to a background queue rather than run inside the request path.
//! Delivery is at-least-once: a job may be attempted more than once, and
//! every pipeline step must be safely repeatable or fail cleanly on
//! repetition.

use crate::orchestration::domain::TaskId;
use async_trait::async_trait;
use thiserror::Error;

/// A unit of background work addressed to one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedJob {
    /// Launch an agent for the task via the dispatch pipeline.
    ExecuteTask(TaskId),
    /// Merge the task's finished pull request via the completion pipeline.
    MergeTask(TaskId),
}

impl QueuedJob {
    /// Returns the task the job operates on.
    #[must_use]
    pub const fn task_id(self) -> TaskId {
        match self {
            Self::ExecuteTask(task_id) | Self::MergeTask(task_id) => task_id,
        }
    }
}

/// Errors returned by queue implementations.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The queue refused or failed to accept the job.
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

/// Contract for enqueueing background jobs.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a job for asynchronous execution.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the job cannot be accepted.
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError>;
}
