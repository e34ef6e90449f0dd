//! Lifecycle status enumerations for epics and tasks.

use super::{ParseEpicStatusError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// The expected progression is linear (`pending → running → pr_open →
/// merging → completed`) with `failed` reachable from any non-terminal
/// status. The status transition engine validates membership in this enum at
/// the boundary; ordering tolerance for out-of-order webhook deliveries is
/// the webhook dispatcher's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    Pending,
    /// An agent is working on the task.
    Running,
    /// The agent finished and opened a pull request.
    PrOpen,
    /// The pull request is being merged.
    Merging,
    /// The task's work has been merged.
    Completed,
    /// The task failed and requires attention.
    Failed,
}

impl TaskStatus {
    /// All six known task statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Running,
        Self::PrOpen,
        Self::Merging,
        Self::Completed,
        Self::Failed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::PrOpen => "pr_open",
            Self::Merging => "merging",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "pr_open" => Ok(Self::PrOpen),
            "merging" => Ok(Self::Merging),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Epic lifecycle status.
///
/// Only `pending → running` is exercised by the start workflow; the
/// remaining transitions are driven by collaborators outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpicStatus {
    /// Epic has been created and is awaiting a start request.
    Pending,
    /// A task breakdown is being generated for the epic.
    GeneratingSpec,
    /// The epic's tasks are being executed.
    Running,
    /// Execution has been paused.
    Paused,
    /// All tasks have completed.
    Completed,
    /// The epic failed and requires attention.
    Failed,
}

impl EpicStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::GeneratingSpec => "generating_spec",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EpicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EpicStatus {
    type Error = ParseEpicStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "generating_spec" => Ok(Self::GeneratingSpec),
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseEpicStatusError(value.to_owned())),
        }
    }
}
