//! Merge completion pipeline: merges a finished task's pull request.

use crate::orchestration::{
    domain::{EpicId, Task, TaskId, TaskStatus},
    ports::{
        BranchMergeContext, ChangeNotifier, EpicRepository, EpicRepositoryError, MergeSha,
        SourceControlError, SourceControlService,
    },
    services::{StatusTransitionEngine, TransitionError, TransitionRequest},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Result of a completed merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReceipt {
    /// Task after the `merging` transition.
    pub task: Task,
    /// Merge commit recorded by the provider.
    pub merge_sha: MergeSha,
}

/// Errors returned by the merge completion pipeline.
#[derive(Debug, Clone, Error)]
pub enum MergeError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task has no work branch recorded.
    #[error("task {0} has no branch name")]
    MissingBranch(TaskId),

    /// The task's owning epic does not exist.
    #[error("epic not found: {0}")]
    EpicNotFound(EpicId),

    /// The epic's repository has no merge credential configured.
    #[error("repository for epic {0} has no merge credential configured")]
    MissingMergeCredential(EpicId),

    /// The task is not in the `pr_open` status.
    #[error("task {task_id} must be in pr_open status to merge (current: {current})")]
    InvalidStatus {
        /// Task whose merge was rejected.
        task_id: TaskId,
        /// Status the task held when the merge was attempted.
        current: TaskStatus,
    },

    /// The merge call failed; the task is left in `pr_open` for retry.
    #[error(transparent)]
    Merge(#[from] SourceControlError),

    /// The final status transition failed after a successful merge.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Merges an agent's pull request and deletes its work branch.
///
/// A merge failure leaves the task in `pr_open` rather than `failed`: the
/// agent's work still exists, so a retried job or a manual merge remains
/// possible. Branch deletion is best-effort cleanup once the merge has
/// landed.
#[derive(Clone)]
pub struct MergeCompletionPipeline<R, N, G, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    G: SourceControlService,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    engine: StatusTransitionEngine<R, N, K>,
    source_control: Arc<G>,
}

impl<R, N, G, K> MergeCompletionPipeline<R, N, G, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    G: SourceControlService,
    K: Clock + Send + Sync,
{
    /// Creates a new merge completion pipeline.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        engine: StatusTransitionEngine<R, N, K>,
        source_control: Arc<G>,
    ) -> Self {
        Self {
            repository,
            engine,
            source_control,
        }
    }

    /// Completes a finished task by merging its pull request.
    ///
    /// Preconditions fail without side effects: the task must carry a branch
    /// name, belong to an epic whose repository has a merge credential, and
    /// be exactly in `pr_open`.
    ///
    /// # Errors
    ///
    /// Returns a [`MergeError`] naming the failed precondition, the merge
    /// failure (task left in `pr_open`), or the final transition failure.
    pub async fn complete(&self, task_id: TaskId) -> MergeResult<MergeReceipt> {
        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(MergeError::TaskNotFound(task_id))?;
        let branch_name = task
            .branch_name()
            .ok_or(MergeError::MissingBranch(task_id))?
            .clone();
        let epic = self
            .repository
            .find_epic(task.epic_id())
            .await?
            .ok_or(MergeError::EpicNotFound(task.epic_id()))?;
        let credential = epic
            .repository()
            .github_credential()
            .ok_or(MergeError::MissingMergeCredential(epic.id()))?
            .clone();
        if task.status() != TaskStatus::PrOpen {
            return Err(MergeError::InvalidStatus {
                task_id,
                current: task.status(),
            });
        }

        tracing::info!(task_id = %task_id, branch = %branch_name, "starting merge process");
        let context = BranchMergeContext {
            repository: epic.repository().name().clone(),
            branch_name,
            credential,
        };

        let merge_sha = match self.source_control.merge_pull_request(&context).await {
            Ok(sha) => sha,
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to merge PR");
                return Err(MergeError::Merge(err));
            }
        };
        tracing::info!(task_id = %task_id, sha = %merge_sha, "merged PR");

        // The merge already landed, so a cleanup failure must not abort.
        match self.source_control.delete_branch(&context).await {
            Ok(_) => {
                tracing::info!(
                    task_id = %task_id,
                    branch = %context.branch_name,
                    "deleted branch"
                );
            }
            Err(err) => {
                tracing::warn!(task_id = %task_id, error = %err, "failed to delete branch");
            }
        }

        let request = TransitionRequest::to(TaskStatus::Merging.as_str())
            .with_log_message(format!("PR merged successfully. SHA: {merge_sha}"));
        let updated = self.engine.transition(task_id, request).await?;

        tracing::info!(task_id = %task_id, "merge process completed");
        Ok(MergeReceipt {
            task: updated,
            merge_sha,
        })
    }
}
