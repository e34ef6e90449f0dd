//! Recording change notifier for tests and local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::orchestration::{
    domain::{Epic, EpicId, EpicStatus, Task, TaskId, TaskStatus},
    ports::{ChangeNotifier, NotifyError},
};

/// A change observed by the recording notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedChange {
    /// A task transition was announced.
    TaskUpdated {
        /// Task that changed.
        task_id: TaskId,
        /// Status the task held after the change.
        status: TaskStatus,
    },
    /// An epic transition was announced.
    EpicUpdated {
        /// Epic that changed.
        epic_id: EpicId,
        /// Status the epic held after the change.
        status: EpicStatus,
    },
}

/// Notifier that records every announcement it receives.
///
/// Switching on failure mode makes every delivery fail, which exercises the
/// best-effort contract at the call sites.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    changes: Arc<Mutex<Vec<RecordedChange>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent deliveries fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the recorded changes in delivery order.
    #[must_use]
    pub fn changes(&self) -> Vec<RecordedChange> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }

    fn record(&self, change: RecordedChange) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("recording notifier set to fail".to_owned()));
        }
        self.changes
            .lock()
            .map_err(|err| NotifyError(err.to_string()))?
            .push(change);
        Ok(())
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn task_updated(&self, task: &Task) -> Result<(), NotifyError> {
        self.record(RecordedChange::TaskUpdated {
            task_id: task.id(),
            status: task.status(),
        })
    }

    async fn epic_updated(&self, epic: &Epic) -> Result<(), NotifyError> {
        self.record(RecordedChange::EpicUpdated {
            epic_id: epic.id(),
            status: epic.status(),
        })
    }
}
