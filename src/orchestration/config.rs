//! Environment-level configuration for the orchestration core.

use crate::orchestration::domain::TaskId;

/// Fallback base URL when `APP_URL` is unset (local development).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Fallback webhook secret when `CURSOR_WEBHOOK_SECRET` is unset.
pub const DEFAULT_WEBHOOK_SECRET: &str = "default-webhook-secret";

/// Configuration consumed by the dispatch pipeline and collaborator clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    base_url: String,
    webhook_secret: String,
}

impl OrchestratorConfig {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub fn new(base_url: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// `APP_URL` supplies the public base URL for webhook callbacks and
    /// `CURSOR_WEBHOOK_SECRET` the secret forwarded to the agent platform;
    /// both fall back to local-development placeholders.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("APP_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let webhook_secret = std::env::var("CURSOR_WEBHOOK_SECRET")
            .unwrap_or_else(|_| DEFAULT_WEBHOOK_SECRET.to_owned());
        Self::new(base_url, webhook_secret)
    }

    /// Returns the public base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the webhook secret shared with the agent platform.
    #[must_use]
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Builds the callback URL the agent platform posts status updates to.
    #[must_use]
    pub fn callback_url_for(&self, task_id: TaskId) -> String {
        format!(
            "{}/webhooks/cursor/{task_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_WEBHOOK_SECRET)
    }
}
