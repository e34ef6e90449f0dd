//! Repository port for epic and task persistence.

use crate::orchestration::domain::{Epic, EpicId, Position, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for epic repository operations.
pub type EpicRepositoryResult<T> = Result<T, EpicRepositoryError>;

/// Epic and task persistence contract.
///
/// Tasks are owned by their epic and are created atomically with it; a task
/// row is the unit of mutation, and [`EpicRepository::update_task`] must
/// apply all of a task's changed fields as one atomic persistence operation
/// so a reader never observes a transition half-applied.
#[async_trait]
pub trait EpicRepository: Send + Sync {
    /// Stores a new epic together with its initial task batch.
    ///
    /// # Errors
    ///
    /// Returns [`EpicRepositoryError::DuplicateEpic`] when the epic ID
    /// already exists, [`EpicRepositoryError::DuplicateTask`] when a task ID
    /// already exists, or [`EpicRepositoryError::DuplicatePosition`] when two
    /// tasks share a position within the epic.
    async fn store_epic(&self, epic: &Epic, tasks: &[Task]) -> EpicRepositoryResult<()>;

    /// Persists changes to an existing epic (status, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`EpicRepositoryError::EpicNotFound`] when the epic does not
    /// exist.
    async fn update_epic(&self, epic: &Epic) -> EpicRepositoryResult<()>;

    /// Finds an epic by identifier.
    ///
    /// Returns `None` when the epic does not exist.
    async fn find_epic(&self, id: EpicId) -> EpicRepositoryResult<Option<Epic>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> EpicRepositoryResult<Option<Task>>;

    /// Persists changes to an existing task as one atomic operation.
    ///
    /// # Errors
    ///
    /// Returns [`EpicRepositoryError::TaskNotFound`] when the task does not
    /// exist.
    async fn update_task(&self, task: &Task) -> EpicRepositoryResult<()>;

    /// Returns all tasks of an epic ordered by ascending position.
    async fn tasks_for_epic(&self, epic_id: EpicId) -> EpicRepositoryResult<Vec<Task>>;
}

/// Errors returned by epic repository implementations.
#[derive(Debug, Clone, Error)]
pub enum EpicRepositoryError {
    /// An epic with the same identifier already exists.
    #[error("duplicate epic identifier: {0}")]
    DuplicateEpic(EpicId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Two tasks share a position within the same epic.
    #[error("duplicate task position {position} in epic {epic_id}")]
    DuplicatePosition {
        /// Epic whose task batch violated the constraint.
        epic_id: EpicId,
        /// Position claimed by more than one task.
        position: Position,
    },

    /// The epic was not found.
    #[error("epic not found: {0}")]
    EpicNotFound(EpicId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EpicRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
