//! Epic creation from a manually supplied task list.

use crate::orchestration::{
    domain::{
        Credential, CredentialService, DomainError, Epic, NewEpic, Position, Repository, Task,
        UserId,
    },
    ports::{EpicRepository, EpicRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Maximum title length derived from the first task description.
const MAX_TITLE_LENGTH: usize = 50;

/// Request payload for creating an epic from a manual task list.
#[derive(Debug, Clone)]
pub struct ManualSpecRequest {
    user_id: UserId,
    repository: Repository,
    tasks_json: String,
    base_branch: String,
    agent_credential: Option<Credential>,
}

impl ManualSpecRequest {
    /// Creates a request with required fields; the base branch defaults to
    /// `main`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        repository: Repository,
        tasks_json: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            repository,
            tasks_json: tasks_json.into(),
            base_branch: "main".to_owned(),
            agent_credential: None,
        }
    }

    /// Overrides the base branch agents start from.
    #[must_use]
    pub fn with_base_branch(mut self, base_branch: impl Into<String>) -> Self {
        self.base_branch = base_branch.into();
        self
    }

    /// Attaches the agent-launch credential for the epic.
    #[must_use]
    pub fn with_agent_credential(mut self, credential: Credential) -> Self {
        self.agent_credential = Some(credential);
        self
    }
}

/// Errors returned by epic creation.
#[derive(Debug, Clone, Error)]
pub enum CreationError {
    /// The task list is not valid JSON.
    #[error("tasks must be valid JSON: {0}")]
    InvalidTasksJson(String),

    /// The task list parsed but is not a JSON array.
    #[error("tasks must be a JSON array")]
    TasksNotArray,

    /// The task list is empty.
    #[error("tasks must contain at least one task")]
    NoTasks,

    /// A task entry is not a string.
    #[error("task at index {0} must be a string")]
    TaskNotString(usize),

    /// A task entry is blank.
    #[error("task at index {0} cannot be blank")]
    BlankTask(usize),

    /// The supplied credential belongs to a different user.
    #[error("agent credential must belong to the user")]
    CredentialNotOwned,

    /// The supplied credential is for the wrong service.
    #[error("agent credential must be a cursor_agent credential")]
    CredentialWrongService,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] EpicRepositoryError),
}

/// Result type for creation operations.
pub type CreationResult<T> = Result<T, CreationError>;

/// Creates an epic atomically together with its ordered task batch.
#[derive(Clone)]
pub struct EpicCreationService<R, K>
where
    R: EpicRepository,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<K>,
}

impl<R, K> EpicCreationService<R, K>
where
    R: EpicRepository,
    K: Clock + Send + Sync,
{
    /// Creates a new epic creation service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<K>) -> Self {
        Self { repository, clock }
    }

    /// Creates a pending epic and its tasks from a manual task list.
    ///
    /// The task list must be a JSON array of non-blank strings; tasks are
    /// created in array order at positions `0..n`. The epic title is the
    /// first task description truncated to fifty characters and the prompt
    /// records the task count.
    ///
    /// # Errors
    ///
    /// Returns a [`CreationError`] when the task list or credential is
    /// invalid or persistence fails.
    pub async fn create(&self, request: ManualSpecRequest) -> CreationResult<(Epic, Vec<Task>)> {
        let descriptions = parse_task_descriptions(&request.tasks_json)?;
        validate_agent_credential(request.user_id, request.agent_credential.as_ref())?;

        let title = descriptions
            .first()
            .map(|first| truncate_title(first))
            .unwrap_or_default();
        let prompt = format!("Manual spec with {} tasks", descriptions.len());

        let epic = Epic::new(
            NewEpic {
                user_id: request.user_id,
                repository: request.repository,
                title,
                prompt,
                base_branch: request.base_branch,
                llm_credential: None,
                agent_credential: request.agent_credential,
            },
            self.clock.as_ref(),
        )?;

        let mut tasks = Vec::with_capacity(descriptions.len());
        for (index, description) in descriptions.into_iter().enumerate() {
            let position = Position::from_index(index)?;
            tasks.push(Task::new(
                epic.id(),
                description,
                position,
                self.clock.as_ref(),
            )?);
        }

        self.repository.store_epic(&epic, &tasks).await?;
        tracing::info!(
            epic_id = %epic.id(),
            task_count = tasks.len(),
            "epic created from manual spec"
        );

        Ok((epic, tasks))
    }
}

/// Parses and validates the JSON task list.
fn parse_task_descriptions(tasks_json: &str) -> CreationResult<Vec<String>> {
    let parsed: serde_json::Value = serde_json::from_str(tasks_json)
        .map_err(|err| CreationError::InvalidTasksJson(err.to_string()))?;
    let entries = parsed.as_array().ok_or(CreationError::TasksNotArray)?;
    if entries.is_empty() {
        return Err(CreationError::NoTasks);
    }

    let mut descriptions = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let description = entry
            .as_str()
            .ok_or(CreationError::TaskNotString(index))?;
        if description.trim().is_empty() {
            return Err(CreationError::BlankTask(index));
        }
        descriptions.push(description.to_owned());
    }
    Ok(descriptions)
}

/// Checks the optional agent credential's ownership and service.
fn validate_agent_credential(
    user_id: UserId,
    credential: Option<&Credential>,
) -> CreationResult<()> {
    let Some(credential) = credential else {
        return Ok(());
    };
    if credential.user_id() != user_id {
        return Err(CreationError::CredentialNotOwned);
    }
    if credential.service() != CredentialService::CursorAgent {
        return Err(CreationError::CredentialWrongService);
    }
    Ok(())
}

/// Derives the epic title from the first task description.
fn truncate_title(first_task: &str) -> String {
    if first_task.chars().count() > MAX_TITLE_LENGTH {
        let head: String = first_task.chars().take(MAX_TITLE_LENGTH - 3).collect();
        format!("{head}...")
    } else {
        first_task.to_owned()
    }
}
