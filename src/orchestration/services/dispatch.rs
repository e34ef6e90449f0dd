//! Agent dispatch pipeline: launches an external coding agent for a task.

use crate::orchestration::{
    config::OrchestratorConfig,
    domain::{BranchName, DomainError, EpicId, Task, TaskId, TaskStatus},
    ports::{
        AgentLaunchError, AgentLaunchRequest, AgentLauncher, ChangeNotifier, EpicRepository,
        EpicRepositoryError,
    },
    services::{StatusTransitionEngine, TransitionError, TransitionRequest},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Identifiers produced by a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Task after the launch bookkeeping.
    pub task: Task,
    /// Platform-assigned agent identifier.
    pub agent_id: String,
    /// Work branch generated for this launch.
    pub branch_name: BranchName,
}

/// Errors returned by the dispatch pipeline.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task's owning epic does not exist.
    #[error("epic not found: {0}")]
    EpicNotFound(EpicId),

    /// The epic has no agent-launch credential configured.
    #[error("epic {0} has no agent credential configured")]
    MissingAgentCredential(EpicId),

    /// The platform accepted the launch but returned no agent identifier.
    #[error("no agent ID returned from Cursor API")]
    MissingAgentId,

    /// The launch call itself failed.
    #[error(transparent)]
    Launch(#[from] AgentLaunchError),

    /// A status transition failed.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),

    /// Branch-name construction failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Launches an agent for a task and records its identifiers.
///
/// The entry point for both manual dispatch and the epic start workflow;
/// normally invoked from the background job runner so the triggering request
/// returns promptly. Redelivery of a dispatch job produces a fresh work
/// branch rather than corrupting state, which is an accepted quirk of the
/// at-least-once queue.
#[derive(Clone)]
pub struct AgentDispatchPipeline<R, N, L, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    L: AgentLauncher,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    engine: StatusTransitionEngine<R, N, K>,
    launcher: Arc<L>,
    clock: Arc<K>,
    config: OrchestratorConfig,
}

impl<R, N, L, K> AgentDispatchPipeline<R, N, L, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    L: AgentLauncher,
    K: Clock + Send + Sync,
{
    /// Creates a new dispatch pipeline.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        engine: StatusTransitionEngine<R, N, K>,
        launcher: Arc<L>,
        clock: Arc<K>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            repository,
            engine,
            launcher,
            clock,
            config,
        }
    }

    /// Dispatches a task to the external agent platform.
    ///
    /// Preconditions fail without side effects: the task and its epic must
    /// exist and the epic must carry an agent-launch credential. Past those
    /// checks, any failure transitions the task to `failed` with a log entry
    /// and re-raises the original error so the invoking job observes the
    /// failure and can apply its retry policy.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] naming the failed precondition or the
    /// underlying launch/transition failure.
    pub async fn dispatch(&self, task_id: TaskId) -> DispatchResult<DispatchReceipt> {
        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(DispatchError::TaskNotFound(task_id))?;
        let epic = self
            .repository
            .find_epic(task.epic_id())
            .await?
            .ok_or(DispatchError::EpicNotFound(task.epic_id()))?;
        let credential = epic
            .agent_credential()
            .ok_or(DispatchError::MissingAgentCredential(epic.id()))?
            .clone();

        let launch = async {
            self.engine
                .transition(
                    task_id,
                    TransitionRequest::to(TaskStatus::Running.as_str())
                        .with_log_message("Starting task execution..."),
                )
                .await?;

            let branch_name = generate_branch_name(task_id)?;
            let callback_url = self.config.callback_url_for(task_id);

            self.engine
                .transition(
                    task_id,
                    TransitionRequest::to(TaskStatus::Running.as_str()).with_log_message(
                        format!("Launching Cursor agent for branch: {branch_name}"),
                    ),
                )
                .await?;

            let request = AgentLaunchRequest {
                description: task.description().to_owned(),
                repository_url: epic.repository().github_url().to_owned(),
                base_branch: epic.base_branch().to_owned(),
                branch_name: branch_name.clone(),
                callback_url,
            };
            let receipt = self.launcher.launch(&credential, &request).await?;
            let agent_id = receipt
                .agent_id
                .filter(|id| !id.trim().is_empty())
                .ok_or(DispatchError::MissingAgentId)?;

            // Direct field update, not routed through the transition engine.
            let mut launched = self
                .repository
                .find_task(task_id)
                .await?
                .ok_or(DispatchError::TaskNotFound(task_id))?;
            launched.record_agent_launch(
                agent_id.clone(),
                branch_name.clone(),
                self.clock.as_ref(),
            );
            self.repository.update_task(&launched).await?;

            let updated = self
                .engine
                .transition(
                    task_id,
                    TransitionRequest::to(TaskStatus::Running.as_str()).with_log_message(
                        format!("Cursor agent launched successfully. Agent ID: {agent_id}"),
                    ),
                )
                .await?;

            tracing::info!(
                task_id = %task_id,
                agent_id = %agent_id,
                branch = %branch_name,
                "Cursor agent launched"
            );

            Ok(DispatchReceipt {
                task: updated,
                agent_id,
                branch_name,
            })
        };

        match launch.await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                self.record_launch_failure(task_id, &err).await;
                Err(err)
            }
        }
    }

    /// Marks the task failed after a launch error, keeping the original
    /// error intact for the caller.
    async fn record_launch_failure(&self, task_id: TaskId, err: &DispatchError) {
        let message = format!("Failed to launch Cursor agent: {err}");
        tracing::error!(task_id = %task_id, error = %err, "agent launch failed");

        let request = TransitionRequest::to(TaskStatus::Failed.as_str())
            .with_log_message(message);
        if let Err(transition_err) = self.engine.transition(task_id, request).await {
            tracing::error!(
                task_id = %task_id,
                error = %transition_err,
                "failed to record launch failure on task"
            );
        }
    }
}

/// Generates a unique work branch name for a launch attempt.
///
/// Format: `cursor-agent/task-<task_id>-<8 lowercase hex chars>`. The random
/// suffix guarantees repeated dispatches of the same task use distinct
/// branches.
fn generate_branch_name(task_id: TaskId) -> Result<BranchName, DomainError> {
    let suffix: u32 = rand::random();
    BranchName::new(format!("cursor-agent/task-{task_id}-{suffix:08x}"))
}
