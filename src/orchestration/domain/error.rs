//! Error types for orchestration domain validation and parsing.

use super::{EpicId, EpicStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The branch name is empty, contains whitespace, or is too long.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    /// The task position exceeds the persistable range.
    #[error("invalid task position {0}, exceeds storage maximum")]
    InvalidPosition(u32),

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyTaskDescription,

    /// The epic title is empty after trimming.
    #[error("epic title must not be empty")]
    EmptyEpicTitle,

    /// A required credential field is empty after trimming.
    #[error("credential {0} must not be empty")]
    EmptyCredentialField(&'static str),

    /// The repository URL is empty after trimming.
    #[error("repository URL must not be empty")]
    EmptyRepositoryUrl,

    /// The epic is not in the status required for the requested operation.
    #[error("epic {epic_id} must be pending to start (current: {current})")]
    EpicNotPending {
        /// Epic whose start was rejected.
        epic_id: EpicId,
        /// Status the epic held when the start was attempted.
        current: EpicStatus,
    },
}

/// Error returned while parsing task statuses from external input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing epic statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown epic status: {0}")]
pub struct ParseEpicStatusError(pub String);

/// Error returned while parsing credential service names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown credential service: {0}")]
pub struct ParseCredentialServiceError(pub String);
