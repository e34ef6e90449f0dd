//! Change-notification port for live observers of an epic.
//!
//! Notifications are best-effort: every call site funnels through the
//! helpers below, which log a delivery failure and swallow it so the primary
//! operation's outcome is never affected.

use crate::orchestration::domain::{Epic, Task};
use async_trait::async_trait;
use thiserror::Error;

/// Error returned by notifier implementations.
#[derive(Debug, Clone, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Contract for pushing state changes to live observers.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Announces a task's new state to observers of its owning epic.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    async fn task_updated(&self, task: &Task) -> Result<(), NotifyError>;

    /// Announces an epic's new state to its observers.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    async fn epic_updated(&self, epic: &Epic) -> Result<(), NotifyError>;
}

/// Delivers a task-update notification, logging and swallowing any failure.
pub async fn notify_task_best_effort<N: ChangeNotifier + ?Sized>(notifier: &N, task: &Task) {
    if let Err(err) = notifier.task_updated(task).await {
        tracing::error!(
            task_id = %task.id(),
            epic_id = %task.epic_id(),
            error = %err,
            "failed to broadcast task update"
        );
    }
}

/// Delivers an epic-update notification, logging and swallowing any failure.
pub async fn notify_epic_best_effort<N: ChangeNotifier + ?Sized>(notifier: &N, epic: &Epic) {
    if let Err(err) = notifier.epic_updated(epic).await {
        tracing::error!(
            epic_id = %epic.id(),
            error = %err,
            "failed to broadcast epic update"
        );
    }
}
