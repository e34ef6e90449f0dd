//! Source-control port for merge and branch-cleanup operations.

use crate::orchestration::domain::{BranchName, Credential, RepositoryFullName};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Repository, branch, and credential scope for a merge operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMergeContext {
    /// Repository holding the pull request.
    pub repository: RepositoryFullName,
    /// Head branch of the pull request.
    pub branch_name: BranchName,
    /// Credential authorizing the operation.
    pub credential: Credential,
}

/// Merge commit identifier returned by the source-control provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeSha(String);

impl MergeSha {
    /// Wraps a provider-reported merge commit SHA.
    #[must_use]
    pub const fn new(sha: String) -> Self {
        Self(sha)
    }

    /// Returns the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MergeSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors returned by source-control implementations.
#[derive(Debug, Clone, Error)]
pub enum SourceControlError {
    /// No open pull request exists for the branch.
    #[error("pull request not found for branch '{branch}'")]
    PullRequestNotFound {
        /// Head branch that was searched for.
        branch: String,
    },

    /// The pull request exists but cannot be merged.
    #[error("pull request #{number} is not mergeable")]
    NotMergeable {
        /// Number of the conflicting pull request.
        number: u64,
    },

    /// The provider API rejected the request.
    #[error("source-control API request failed ({status}): {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The provider API could not be reached.
    #[error("failed to communicate with source-control API: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceControlError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Contract for merging finished work and cleaning up its branch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceControlService: Send + Sync {
    /// Merges the open pull request whose head is the context branch.
    ///
    /// # Errors
    ///
    /// Returns [`SourceControlError`] when no matching pull request exists,
    /// the pull request is not mergeable, or the provider cannot be reached.
    async fn merge_pull_request(
        &self,
        context: &BranchMergeContext,
    ) -> Result<MergeSha, SourceControlError>;

    /// Deletes the context branch after a successful merge.
    ///
    /// # Errors
    ///
    /// Returns [`SourceControlError`] when the branch does not exist or the
    /// provider cannot be reached.
    async fn delete_branch(&self, context: &BranchMergeContext)
    -> Result<bool, SourceControlError>;
}
