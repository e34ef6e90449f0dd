//! Webhook normalization and dispatch for agent status callbacks.
//!
//! The agent platform has shipped several payload shapes over time, so field
//! extraction is table-driven: an ordered list of key paths per field, first
//! non-blank match wins. Adding a newly observed shape is a one-line change
//! to the relevant table.

use crate::orchestration::{
    domain::{Task, TaskId, TaskStatus},
    ports::{
        ChangeNotifier, EpicRepository, EpicRepositoryError, JobQueue, QueueError, QueuedJob,
    },
    services::{StatusTransitionEngine, TransitionError, TransitionRequest},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Key paths tried, in order, for the status token.
const STATUS_PATHS: &[&[&str]] = &[&["status"], &["data", "status"], &["event"]];

/// Key paths tried, in order, for the pull-request URL.
const PR_URL_PATHS: &[&[&str]] = &[
    &["target", "prUrl"],
    &["target", "pr_url"],
    &["pr_url"],
    &["prUrl"],
    &["data", "pr_url"],
    &["data", "prUrl"],
];

/// Key paths tried, in order, for the error message.
const ERROR_MESSAGE_PATHS: &[&[&str]] =
    &[&["error_message"], &["error"], &["data", "error"], &["message"]];

/// Walks a key path into the payload, returning the string at its end.
///
/// Absent intermediate nesting levels simply yield `None`.
fn string_at_path<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = payload;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str()
}

/// Returns the first non-blank string found across the given key paths.
fn extract_first(payload: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| string_at_path(payload, path))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Extracts the status token from a callback payload, case preserved.
#[must_use]
pub fn extract_status(payload: &Value) -> Option<String> {
    extract_first(payload, STATUS_PATHS)
}

/// Extracts the pull-request URL from a callback payload.
///
/// Absence is not an error; the agent platform omits the URL in some
/// callback shapes.
#[must_use]
pub fn extract_pr_url(payload: &Value) -> Option<String> {
    extract_first(payload, PR_URL_PATHS)
}

/// Extracts the error message from a callback payload.
#[must_use]
pub fn extract_error_message(payload: &Value) -> Option<String> {
    extract_first(payload, ERROR_MESSAGE_PATHS)
}

/// Canonical fields extracted from a loosely-typed callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWebhook {
    /// Status token, case preserved as sent.
    pub status: String,
    /// Pull-request URL, when any known shape carried one.
    pub pr_url: Option<String>,
    /// Error message, when any known shape carried one.
    pub error_message: Option<String>,
}

impl NormalizedWebhook {
    /// Normalizes a payload, returning `None` when no status token is found.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let status = extract_status(payload)?;
        Some(Self {
            status,
            pr_url: extract_pr_url(payload),
            error_message: extract_error_message(payload),
        })
    }
}

/// How a recognized callback was applied to the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookHandled {
    /// `FINISHED`: the task moved to `pr_open` and a merge job was enqueued.
    Finished {
        /// Task after the transition.
        task: Task,
        /// Pull-request URL recorded, when the payload carried one.
        pr_url: Option<String>,
    },
    /// `RUNNING`: the task moved to `running`, or the callback was skipped
    /// because the task had already progressed beyond `pending`.
    Running {
        /// Task after handling (unchanged when skipped).
        task: Task,
        /// `true` when the callback was a harmless duplicate or stale.
        skipped: bool,
    },
    /// `ERROR`: the task moved to `failed`.
    Errored {
        /// Task after the transition.
        task: Task,
        /// Error message extracted from the payload, if any.
        error_message: Option<String>,
    },
    /// The status token is not one the dispatcher recognizes; no state
    /// changed.
    Unrecognized,
}

/// Result of handling one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    /// Status token as sent by the platform, case preserved.
    pub status: String,
    /// What the dispatcher did with it.
    pub handled: WebhookHandled,
}

/// Errors returned by the webhook dispatcher.
#[derive(Debug, Clone, Error)]
pub enum WebhookDispatchError {
    /// The callback's task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No status token could be extracted from the payload.
    #[error("invalid webhook payload - missing status")]
    MissingStatus,

    /// A status handler failed to apply its transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The merge job could not be enqueued.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Task lookup failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),
}

/// Routes normalized callbacks to the Finished/Running/Error handlers.
///
/// Webhook deliveries for the same task are not guaranteed to arrive in send
/// order, so the handlers are individually order-tolerant: `FINISHED` and
/// `ERROR` transition unconditionally while `RUNNING` only applies to a
/// `pending` task.
#[derive(Clone)]
pub struct WebhookDispatcher<R, N, Q, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    Q: JobQueue,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    engine: StatusTransitionEngine<R, N, K>,
    queue: Arc<Q>,
}

impl<R, N, Q, K> WebhookDispatcher<R, N, Q, K>
where
    R: EpicRepository,
    N: ChangeNotifier,
    Q: JobQueue,
    K: Clock + Send + Sync,
{
    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        engine: StatusTransitionEngine<R, N, K>,
        queue: Arc<Q>,
    ) -> Self {
        Self {
            repository,
            engine,
            queue,
        }
    }

    /// Handles one callback payload for a task.
    ///
    /// Unrecognized status tokens are logged and reported as handled without
    /// any state change; duplicate or out-of-order `RUNNING` callbacks are
    /// skipped silently.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookDispatchError::TaskNotFound`] when the task does not
    /// resolve, [`WebhookDispatchError::MissingStatus`] when no status token
    /// is extractable (the task is not mutated), or the underlying handler
    /// error when a transition or enqueue fails.
    pub async fn handle(
        &self,
        task_id: TaskId,
        payload: &Value,
    ) -> Result<WebhookOutcome, WebhookDispatchError> {
        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(WebhookDispatchError::TaskNotFound(task_id))?;

        let Some(normalized) = NormalizedWebhook::from_payload(payload) else {
            tracing::warn!(task_id = %task_id, "webhook payload carried no status token");
            return Err(WebhookDispatchError::MissingStatus);
        };

        let handled = match normalized.status.to_uppercase().as_str() {
            "FINISHED" => self.handle_finished(&task, &normalized).await?,
            "RUNNING" => self.handle_running(&task).await?,
            "ERROR" => self.handle_error(&task, &normalized).await?,
            other => {
                tracing::warn!(task_id = %task_id, status = other, "unknown webhook status");
                WebhookHandled::Unrecognized
            }
        };

        Ok(WebhookOutcome {
            status: normalized.status,
            handled,
        })
    }

    /// `FINISHED`: records the pull request and queues merge completion.
    async fn handle_finished(
        &self,
        task: &Task,
        normalized: &NormalizedWebhook,
    ) -> Result<WebhookHandled, WebhookDispatchError> {
        tracing::info!(task_id = %task.id(), "handling FINISHED status");

        if normalized.pr_url.is_none() {
            tracing::warn!(task_id = %task.id(), "no PR URL found in FINISHED webhook");
        }

        let message = format!(
            "Cursor agent finished. PR created: {}",
            normalized.pr_url.as_deref().unwrap_or("URL not provided")
        );
        let mut request = TransitionRequest::to(TaskStatus::PrOpen.as_str())
            .with_log_message(message);
        if let Some(url) = &normalized.pr_url {
            request = request.with_pr_url(url);
        }
        let updated = self.engine.transition(task.id(), request).await?;

        self.queue.enqueue(QueuedJob::MergeTask(task.id())).await?;
        tracing::info!(task_id = %task.id(), "merge job enqueued");

        Ok(WebhookHandled::Finished {
            task: updated,
            pr_url: normalized.pr_url.clone(),
        })
    }

    /// `RUNNING`: transitions a pending task, skips anything further along.
    async fn handle_running(
        &self,
        task: &Task,
    ) -> Result<WebhookHandled, WebhookDispatchError> {
        tracing::info!(task_id = %task.id(), "handling RUNNING status");

        if task.status() != TaskStatus::Pending {
            tracing::info!(
                task_id = %task.id(),
                status = %task.status(),
                "already past pending, skipping RUNNING update"
            );
            return Ok(WebhookHandled::Running {
                task: task.clone(),
                skipped: true,
            });
        }

        let request = TransitionRequest::to(TaskStatus::Running.as_str())
            .with_log_message("Cursor agent is now running");
        let updated = self.engine.transition(task.id(), request).await?;

        Ok(WebhookHandled::Running {
            task: updated,
            skipped: false,
        })
    }

    /// `ERROR`: marks the task failed with the reported message.
    async fn handle_error(
        &self,
        task: &Task,
        normalized: &NormalizedWebhook,
    ) -> Result<WebhookHandled, WebhookDispatchError> {
        tracing::info!(task_id = %task.id(), "handling ERROR status");

        let message = format!(
            "Cursor agent failed: {}",
            normalized.error_message.as_deref().unwrap_or("Unknown error")
        );
        let request =
            TransitionRequest::to(TaskStatus::Failed.as_str()).with_log_message(message);
        let updated = self.engine.transition(task.id(), request).await?;

        Ok(WebhookHandled::Errored {
            task: updated,
            error_message: normalized.error_message.clone(),
        })
    }
}
