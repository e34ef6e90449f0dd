//! Agent-launch port for the external coding-agent platform.

use crate::orchestration::domain::{BranchName, Credential};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Everything the agent platform needs to start work on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLaunchRequest {
    /// Task description forwarded as the agent's prompt.
    pub description: String,
    /// Clone URL of the repository the agent works in.
    pub repository_url: String,
    /// Branch the agent starts from.
    pub base_branch: String,
    /// Branch the agent pushes its work to.
    pub branch_name: BranchName,
    /// URL the platform posts status callbacks to.
    pub callback_url: String,
}

/// Identifiers returned by the agent platform for a launched agent.
///
/// The platform may answer without an agent identifier; the dispatch
/// pipeline treats that as a launch failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchReceipt {
    /// Platform-assigned agent identifier, if one was returned.
    pub agent_id: Option<String>,
}

/// Errors returned by agent-launcher implementations.
#[derive(Debug, Clone, Error)]
pub enum AgentLaunchError {
    /// The agent API rejected the launch request.
    #[error("agent API request failed ({status}): {message}")]
    Api {
        /// HTTP status returned by the agent API.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The agent API answered with a body that could not be interpreted.
    #[error("unexpected agent API response: {0}")]
    InvalidResponse(String),

    /// The agent API could not be reached.
    #[error("failed to communicate with agent API: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentLaunchError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Contract for launching an external coding agent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentLauncher: Send + Sync {
    /// Launches an agent for a task, returning the platform's receipt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentLaunchError`] when the platform rejects the request or
    /// cannot be reached.
    async fn launch(
        &self,
        credential: &Credential,
        request: &AgentLaunchRequest,
    ) -> Result<LaunchReceipt, AgentLaunchError>;
}
