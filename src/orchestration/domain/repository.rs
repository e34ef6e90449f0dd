//! Registered repository value object.

use super::{Credential, DomainError, RepositoryFullName, RepositoryId, UserId};
use serde::{Deserialize, Serialize};

/// A source repository an epic's work is performed against.
///
/// Embedded by value in the epic aggregate; the optional GitHub credential
/// authorizes merge and branch-deletion operations for completed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    id: RepositoryId,
    user_id: UserId,
    name: RepositoryFullName,
    github_url: String,
    github_credential: Option<Credential>,
}

impl Repository {
    /// Creates a validated repository.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyRepositoryUrl`] when the URL is blank.
    pub fn new(
        user_id: UserId,
        name: RepositoryFullName,
        github_url: impl Into<String>,
        github_credential: Option<Credential>,
    ) -> Result<Self, DomainError> {
        let github_url = github_url.into();
        if github_url.trim().is_empty() {
            return Err(DomainError::EmptyRepositoryUrl);
        }

        Ok(Self {
            id: RepositoryId::new(),
            user_id,
            name,
            github_url,
            github_credential,
        })
    }

    /// Returns the repository identifier.
    #[must_use]
    pub const fn id(&self) -> RepositoryId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the `owner/repo` name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryFullName {
        &self.name
    }

    /// Returns the clone URL used when launching agents.
    #[must_use]
    pub fn github_url(&self) -> &str {
        &self.github_url
    }

    /// Returns the merge credential, if configured.
    #[must_use]
    pub const fn github_credential(&self) -> Option<&Credential> {
        self.github_credential.as_ref()
    }
}
