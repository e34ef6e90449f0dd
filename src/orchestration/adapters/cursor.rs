//! Cursor agent API client implementing the agent-launch port.

use crate::orchestration::{
    config::OrchestratorConfig,
    domain::Credential,
    ports::{AgentLaunchError, AgentLaunchRequest, AgentLauncher, LaunchReceipt},
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// Cursor background-agent launch endpoint.
const CURSOR_API_ENDPOINT: &str = "https://api.cursor.com/v0/agents";

/// Time allowed for the launch request round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for launching Cursor background agents.
#[derive(Debug, Clone)]
pub struct CursorAgentLauncher {
    client: reqwest::Client,
    endpoint: String,
    webhook_secret: String,
}

impl CursorAgentLauncher {
    /// Creates a launcher using the production Cursor endpoint.
    #[must_use]
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: CURSOR_API_ENDPOINT.to_owned(),
            webhook_secret: config.webhook_secret().to_owned(),
        }
    }

    /// Overrides the API endpoint (test servers).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Builds the launch payload in the shape the Cursor API expects.
    #[must_use]
    pub fn build_payload(&self, request: &AgentLaunchRequest) -> Value {
        json!({
            "prompt": { "text": request.description },
            "source": {
                "repository": request.repository_url,
                "ref": request.base_branch,
            },
            "target": {
                "branchName": request.branch_name.as_str(),
                "autoCreatePr": true,
            },
            "webhook": {
                "url": request.callback_url,
                "secret": self.webhook_secret,
            },
        })
    }
}

#[async_trait]
impl AgentLauncher for CursorAgentLauncher {
    async fn launch(
        &self,
        credential: &Credential,
        request: &AgentLaunchRequest,
    ) -> Result<LaunchReceipt, AgentLaunchError> {
        let payload = self.build_payload(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.api_key())
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(AgentLaunchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|err| err.to_string());
            return Err(AgentLaunchError::Api {
                status: status.as_u16(),
                message: extract_error_detail(&message),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AgentLaunchError::InvalidResponse(err.to_string()))?;
        let agent_id = body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(LaunchReceipt { agent_id })
    }
}

/// Pulls the `error` field out of an error body, falling back to raw text.
fn extract_error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_owned())
}
