//! In-memory repository for orchestration tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::orchestration::{
    domain::{Epic, EpicId, Task, TaskId},
    ports::{EpicRepository, EpicRepositoryError, EpicRepositoryResult},
};

/// Thread-safe in-memory epic and task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEpicRepository {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    epics: HashMap<EpicId, Epic>,
    tasks: HashMap<TaskId, Task>,
    epic_tasks: HashMap<EpicId, Vec<TaskId>>,
}

impl InMemoryEpicRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Maps a poisoned-lock failure onto the repository error type.
fn lock_poisoned<T>(err: std::sync::PoisonError<T>) -> EpicRepositoryError {
    EpicRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Rejects a task batch containing duplicate identifiers or positions.
fn check_task_batch(state: &InMemoryState, epic: &Epic, tasks: &[Task]) -> EpicRepositoryResult<()> {
    let mut seen_positions = Vec::with_capacity(tasks.len());
    for task in tasks {
        if state.tasks.contains_key(&task.id()) {
            return Err(EpicRepositoryError::DuplicateTask(task.id()));
        }
        if seen_positions.contains(&task.position()) {
            return Err(EpicRepositoryError::DuplicatePosition {
                epic_id: epic.id(),
                position: task.position(),
            });
        }
        seen_positions.push(task.position());
    }
    Ok(())
}

#[async_trait]
impl EpicRepository for InMemoryEpicRepository {
    async fn store_epic(&self, epic: &Epic, tasks: &[Task]) -> EpicRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.epics.contains_key(&epic.id()) {
            return Err(EpicRepositoryError::DuplicateEpic(epic.id()));
        }
        check_task_batch(&state, epic, tasks)?;

        state.epics.insert(epic.id(), epic.clone());
        let task_ids = tasks.iter().map(Task::id).collect();
        state.epic_tasks.insert(epic.id(), task_ids);
        for task in tasks {
            state.tasks.insert(task.id(), task.clone());
        }
        Ok(())
    }

    async fn update_epic(&self, epic: &Epic) -> EpicRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.epics.contains_key(&epic.id()) {
            return Err(EpicRepositoryError::EpicNotFound(epic.id()));
        }
        state.epics.insert(epic.id(), epic.clone());
        Ok(())
    }

    async fn find_epic(&self, id: EpicId) -> EpicRepositoryResult<Option<Epic>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.epics.get(&id).cloned())
    }

    async fn find_task(&self, id: TaskId) -> EpicRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update_task(&self, task: &Task) -> EpicRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(EpicRepositoryError::TaskNotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn tasks_for_epic(&self, epic_id: EpicId) -> EpicRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut tasks: Vec<Task> = state
            .epic_tasks
            .get(&epic_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        tasks.sort_by_key(Task::position);
        Ok(tasks)
    }
}
