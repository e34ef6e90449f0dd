//! Status transition engine: the single authorized writer of task status.

use crate::orchestration::{
    domain::{ParseTaskStatusError, Task, TaskId, TaskStatus},
    ports::{ChangeNotifier, EpicRepository, EpicRepositoryError, notify_task_best_effort},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// A requested task status change with optional log and pull-request data.
///
/// The status arrives as an untrusted string and is validated against the
/// six-member enum before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    new_status: String,
    log_message: Option<String>,
    pr_url: Option<String>,
}

impl TransitionRequest {
    /// Creates a request targeting the given status value.
    #[must_use]
    pub fn to(new_status: impl Into<String>) -> Self {
        Self {
            new_status: new_status.into(),
            log_message: None,
            pr_url: None,
        }
    }

    /// Attaches a debug-log message to append with the transition.
    #[must_use]
    pub fn with_log_message(mut self, message: impl Into<String>) -> Self {
        self.log_message = Some(message.into());
        self
    }

    /// Attaches a pull-request URL to record with the transition.
    #[must_use]
    pub fn with_pr_url(mut self, pr_url: impl Into<String>) -> Self {
        self.pr_url = Some(pr_url.into());
        self
    }
}

/// Errors returned by the status transition engine.
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// The requested status is not one of the six known values.
    #[error(transparent)]
    UnknownStatus(#[from] ParseTaskStatusError),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),
}

/// Result type for transition operations.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Applies validated task status transitions.
///
/// All task status, pull-request URL, and debug-log mutation funnels through
/// [`StatusTransitionEngine::transition`]; the three field updates are
/// persisted as one atomic repository call, then live observers of the
/// owning epic are notified on a best-effort basis.
#[derive(Clone)]
pub struct StatusTransitionEngine<R, N, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<K>,
}

impl<R, N, K> StatusTransitionEngine<R, N, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    K: Clock + Send + Sync,
{
    /// Creates a new transition engine.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<K>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// Applies a status transition to a task and returns the updated task.
    ///
    /// Validates the requested status, then atomically persists the new
    /// status, the pull-request URL when the request carries a non-blank
    /// value (blank is "no update", never "clear"), and a timestamped
    /// debug-log line when the request carries a non-blank message. A
    /// notification failure is logged and never rolls back the transition.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::UnknownStatus`] for a status outside the
    /// six known values (nothing is mutated), [`TransitionError::TaskNotFound`]
    /// when the task does not exist, or [`TransitionError::Repository`] when
    /// persistence fails.
    pub async fn transition(
        &self,
        task_id: TaskId,
        request: TransitionRequest,
    ) -> TransitionResult<Task> {
        let status = TaskStatus::try_from(request.new_status.as_str())?;

        let mut task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(TransitionError::TaskNotFound(task_id))?;

        task.apply_transition(
            status,
            request.log_message.as_deref(),
            request.pr_url.as_deref(),
            self.clock.as_ref(),
        );
        self.repository.update_task(&task).await?;

        tracing::info!(task_id = %task_id, status = %status, "task transitioned");
        notify_task_best_effort(self.notifier.as_ref(), &task).await;

        Ok(task)
    }
}
