//! Background job runner binding queued work to the pipelines.

use crate::orchestration::{
    ports::{
        AgentLauncher, ChangeNotifier, EpicRepository, QueuedJob, SourceControlService,
    },
    services::{
        AgentDispatchPipeline, DispatchError, MergeCompletionPipeline, MergeError,
    },
};
use mockable::Clock;
use thiserror::Error;

/// Errors returned by job execution.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// The dispatch pipeline failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The merge pipeline failed.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Executes queued jobs against the dispatch and merge pipelines.
///
/// The queue delivers at least once; a failed job is re-raised so the queue
/// can apply its retry policy, and both pipelines tolerate redelivery (a
/// re-dispatched task gets a fresh branch, a re-merged task fails the
/// `pr_open` precondition cleanly).
#[derive(Clone)]
pub struct JobRunner<R, N, L, G, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    L: AgentLauncher,
    G: SourceControlService,
    K: Clock + Send + Sync,
{
    dispatch: AgentDispatchPipeline<R, N, L, K>,
    merge: MergeCompletionPipeline<R, N, G, K>,
}

impl<R, N, L, G, K> JobRunner<R, N, L, G, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    L: AgentLauncher,
    G: SourceControlService,
    K: Clock + Send + Sync,
{
    /// Creates a new job runner.
    #[must_use]
    pub const fn new(
        dispatch: AgentDispatchPipeline<R, N, L, K>,
        merge: MergeCompletionPipeline<R, N, G, K>,
    ) -> Self {
        Self { dispatch, merge }
    }

    /// Executes one queued job to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`JobError`] wrapping the pipeline failure so the queue
    /// observes it and can retry.
    pub async fn run(&self, job: QueuedJob) -> Result<(), JobError> {
        match job {
            QueuedJob::ExecuteTask(task_id) => {
                tracing::info!(task_id = %task_id, "running dispatch job");
                self.dispatch.dispatch(task_id).await?;
            }
            QueuedJob::MergeTask(task_id) => {
                tracing::info!(task_id = %task_id, "running merge job");
                self.merge.complete(task_id).await?;
            }
        }
        Ok(())
    }
}
