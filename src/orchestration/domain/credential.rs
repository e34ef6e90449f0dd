//! Credential value objects for external service access.
//!
//! An epic carries two differently-purposed credential references (LLM
//! generation and agent launch) and a repository carries a merge credential.
//! These are fixed roles over the same credential shape, so they are plain
//! named fields rather than a polymorphic hierarchy. Encryption at rest is a
//! persistence concern outside this crate.

use super::{CredentialId, DomainError, ParseCredentialServiceError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External service a credential authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialService {
    /// GitHub API token used for merge and branch operations.
    Github,
    /// Cursor agent API key used for launching agents.
    CursorAgent,
}

impl CredentialService {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::CursorAgent => "cursor_agent",
        }
    }
}

impl fmt::Display for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CredentialService {
    type Error = ParseCredentialServiceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "github" => Ok(Self::Github),
            "cursor_agent" => Ok(Self::CursorAgent),
            _ => Err(ParseCredentialServiceError(value.to_owned())),
        }
    }
}

/// A stored API credential belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    id: CredentialId,
    user_id: UserId,
    service: CredentialService,
    name: String,
    api_key: String,
}

impl Credential {
    /// Creates a validated credential.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCredentialField`] when the name or API key
    /// is blank.
    pub fn new(
        user_id: UserId,
        service: CredentialService,
        name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyCredentialField("name"));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DomainError::EmptyCredentialField("api_key"));
        }

        Ok(Self {
            id: CredentialId::new(),
            user_id,
            service,
            name,
            api_key,
        })
    }

    /// Returns the credential identifier.
    #[must_use]
    pub const fn id(&self) -> CredentialId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the service this credential authenticates against.
    #[must_use]
    pub const fn service(&self) -> CredentialService {
        self.service
    }

    /// Returns the human-readable credential name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
