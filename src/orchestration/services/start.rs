//! Epic start workflow: moves an epic to running and queues its first task.

use crate::orchestration::{
    domain::{DomainError, Epic, EpicId, TaskStatus, UserId},
    ports::{
        ChangeNotifier, EpicRepository, EpicRepositoryError, JobQueue, QueueError, QueuedJob,
        notify_epic_best_effort,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by the start workflow.
#[derive(Debug, Clone, Error)]
pub enum StartError {
    /// The epic does not exist.
    #[error("epic not found: {0}")]
    EpicNotFound(EpicId),

    /// The epic belongs to a different user.
    #[error("epic {epic_id} does not belong to user {user_id}")]
    NotOwnedByUser {
        /// Epic whose start was rejected.
        epic_id: EpicId,
        /// User who requested the start.
        user_id: UserId,
    },

    /// The epic has no tasks to run.
    #[error("epic {0} has no tasks")]
    NoTasks(EpicId),

    /// The epic is not in the pending status.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),

    /// The dispatch job could not be enqueued.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Result type for start operations.
pub type StartResult<T> = Result<T, StartError>;

/// Validates an epic is eligible to run and queues its first pending task.
///
/// Dispatch itself happens asynchronously on the job queue; at most one task
/// is ever enqueued per start call. Requiring `pending` status gates the
/// workflow so only one start can take effect per epic.
#[derive(Clone)]
pub struct EpicStartWorkflow<R, N, Q, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    Q: JobQueue,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    queue: Arc<Q>,
    clock: Arc<K>,
}

impl<R, N, Q, K> EpicStartWorkflow<R, N, Q, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    Q: JobQueue,
    K: Clock + Send + Sync,
{
    /// Creates a new start workflow.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        queue: Arc<Q>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            repository,
            notifier,
            queue,
            clock,
        }
    }

    /// Starts an epic on behalf of a user.
    ///
    /// The epic moves to `running` and the pending task with the lowest
    /// position is enqueued for dispatch. When no task is pending (for
    /// example, all already completed) the start still succeeds and simply
    /// dispatches nothing.
    ///
    /// An agent-launch credential is deliberately not required here; the
    /// dispatch pipeline enforces credential presence when the queued job
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns a [`StartError`] when the epic is missing, owned by another
    /// user, not `pending`, or has zero tasks.
    pub async fn start(&self, user_id: UserId, epic_id: EpicId) -> StartResult<Epic> {
        let mut epic = self
            .repository
            .find_epic(epic_id)
            .await?
            .ok_or(StartError::EpicNotFound(epic_id))?;

        if epic.user_id() != user_id {
            return Err(StartError::NotOwnedByUser { epic_id, user_id });
        }

        let tasks = self.repository.tasks_for_epic(epic_id).await?;
        if tasks.is_empty() {
            return Err(StartError::NoTasks(epic_id));
        }

        epic.begin_running(self.clock.as_ref())?;
        self.repository.update_epic(&epic).await?;
        tracing::info!(epic_id = %epic_id, "epic started");

        // tasks_for_epic returns ascending position order, so the first
        // pending task is the lowest-positioned one.
        let first_pending = tasks
            .iter()
            .find(|task| task.status() == TaskStatus::Pending);
        if let Some(task) = first_pending {
            self.queue.enqueue(QueuedJob::ExecuteTask(task.id())).await?;
            tracing::info!(
                epic_id = %epic_id,
                task_id = %task.id(),
                position = %task.position(),
                "first task queued for dispatch"
            );
            notify_epic_best_effort(self.notifier.as_ref(), &epic).await;
        }

        Ok(epic)
    }
}
