//! Epic aggregate root.

use super::{Credential, DomainError, EpicId, EpicStatus, Repository, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object for creating a new epic.
#[derive(Debug, Clone)]
pub struct NewEpic {
    /// Owning user.
    pub user_id: UserId,
    /// Repository the epic's work targets.
    pub repository: Repository,
    /// Short human-readable title.
    pub title: String,
    /// Free-text prompt describing the overall goal.
    pub prompt: String,
    /// Branch agents start their work from.
    pub base_branch: String,
    /// Credential for LLM-based task generation, if configured.
    pub llm_credential: Option<Credential>,
    /// Credential for launching coding agents, if configured.
    pub agent_credential: Option<Credential>,
}

/// A unit of work grouped into ordered tasks against one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    id: EpicId,
    user_id: UserId,
    repository: Repository,
    title: String,
    prompt: String,
    base_branch: String,
    status: EpicStatus,
    llm_credential: Option<Credential>,
    agent_credential: Option<Credential>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted epic aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEpicData {
    /// Persisted epic identifier.
    pub id: EpicId,
    /// Persisted owning user.
    pub user_id: UserId,
    /// Persisted target repository.
    pub repository: Repository,
    /// Persisted title.
    pub title: String,
    /// Persisted prompt text.
    pub prompt: String,
    /// Persisted base branch name.
    pub base_branch: String,
    /// Persisted lifecycle status.
    pub status: EpicStatus,
    /// Persisted LLM credential, if any.
    pub llm_credential: Option<Credential>,
    /// Persisted agent-launch credential, if any.
    pub agent_credential: Option<Credential>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Epic {
    /// Creates a new pending epic.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyEpicTitle`] when the title is blank.
    pub fn new(params: NewEpic, clock: &impl Clock) -> Result<Self, DomainError> {
        if params.title.trim().is_empty() {
            return Err(DomainError::EmptyEpicTitle);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: EpicId::new(),
            user_id: params.user_id,
            repository: params.repository,
            title: params.title,
            prompt: params.prompt,
            base_branch: params.base_branch,
            status: EpicStatus::Pending,
            llm_credential: params.llm_credential,
            agent_credential: params.agent_credential,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an epic from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEpicData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            repository: data.repository,
            title: data.title,
            prompt: data.prompt,
            base_branch: data.base_branch,
            status: data.status,
            llm_credential: data.llm_credential,
            agent_credential: data.agent_credential,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the epic identifier.
    #[must_use]
    pub const fn id(&self) -> EpicId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the target repository.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Returns the epic title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the free-text prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the branch agents start from.
    #[must_use]
    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> EpicStatus {
        self.status
    }

    /// Returns the LLM-generation credential, if configured.
    #[must_use]
    pub const fn llm_credential(&self) -> Option<&Credential> {
        self.llm_credential.as_ref()
    }

    /// Returns the agent-launch credential, if configured.
    #[must_use]
    pub const fn agent_credential(&self) -> Option<&Credential> {
        self.agent_credential.as_ref()
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

    /// Moves a pending epic into the running status.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EpicNotPending`] when the epic has already
    /// started or finished.
    pub(crate) fn begin_running(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        if self.status != EpicStatus::Pending {
            return Err(DomainError::EpicNotPending {
                epic_id: self.id,
                current: self.status,
            });
        }
        self.status = EpicStatus::Running;
        self.updated_at = clock.utc();
        Ok(())
    }
}
