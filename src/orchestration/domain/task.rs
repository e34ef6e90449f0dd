//! Task aggregate root.

use super::{BranchName, DebugLog, DomainError, EpicId, Position, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One unit of externally-executed work within an epic.
///
/// Status, pull-request URL, and the debug log may only change through the
/// status transition engine; the crate-visible mutators below are not part
/// of the public API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    epic_id: EpicId,
    description: String,
    position: Position,
    status: TaskStatus,
    agent_id: Option<String>,
    branch_name: Option<BranchName>,
    pr_url: Option<String>,
    debug_log: DebugLog,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning-epic identifier.
    pub epic_id: EpicId,
    /// Persisted description text.
    pub description: String,
    /// Persisted ordering key.
    pub position: Position,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted external agent identifier, if any.
    pub agent_id: Option<String>,
    /// Persisted work-branch name, if any.
    pub branch_name: Option<BranchName>,
    /// Persisted pull-request URL, if any.
    pub pr_url: Option<String>,
    /// Persisted debug log text.
    pub debug_log: DebugLog,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task for an epic.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTaskDescription`] when the description is
    /// blank.
    pub fn new(
        epic_id: EpicId,
        description: impl Into<String>,
        position: Position,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::EmptyTaskDescription);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            epic_id,
            description,
            position,
            status: TaskStatus::Pending,
            agent_id: None,
            branch_name: None,
            pr_url: None,
            debug_log: DebugLog::empty(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            epic_id: data.epic_id,
            description: data.description,
            position: data.position,
            status: data.status,
            agent_id: data.agent_id,
            branch_name: data.branch_name,
            pr_url: data.pr_url,
            debug_log: data.debug_log,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning epic identifier.
    #[must_use]
    pub const fn epic_id(&self) -> EpicId {
        self.epic_id
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the ordering key within the owning epic.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the external agent identifier, if an agent was launched.
    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    /// Returns the work-branch name, if an agent was launched.
    #[must_use]
    pub const fn branch_name(&self) -> Option<&BranchName> {
        self.branch_name.as_ref()
    }

    /// Returns the pull-request URL, if one was reported.
    #[must_use]
    pub fn pr_url(&self) -> Option<&str> {
        self.pr_url.as_deref()
    }

    /// Returns the append-only debug log.
    #[must_use]
    pub const fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a validated status transition.
    ///
    /// Sets the status, records the pull-request URL when a non-blank value
    /// is given (blank means "no update", never "clear"), and appends a
    /// timestamped log line when a non-blank message is given. Prior log
    /// lines are preserved exactly.
    pub(crate) fn apply_transition(
        &mut self,
        status: TaskStatus,
        log_message: Option<&str>,
        pr_url: Option<&str>,
        clock: &impl Clock,
    ) {
        self.status = status;
        if let Some(url) = pr_url.filter(|value| !value.trim().is_empty()) {
            self.pr_url = Some(url.to_owned());
        }
        if let Some(message) = log_message.filter(|value| !value.trim().is_empty()) {
            self.debug_log.append_entry(clock.utc(), message);
        }
        self.touch(clock);
    }

    /// Records the identifiers returned by a successful agent launch.
    ///
    /// This is a direct field update distinct from the status/log/pr-url
    /// mutation path owned by the transition engine.
    pub(crate) fn record_agent_launch(
        &mut self,
        agent_id: impl Into<String>,
        branch_name: BranchName,
        clock: &impl Clock,
    ) {
        self.agent_id = Some(agent_id.into());
        self.branch_name = Some(branch_name);
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
