//! GitHub API client implementing the source-control port.

use crate::orchestration::ports::{
    BranchMergeContext, MergeSha, SourceControlError, SourceControlService,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// GitHub REST API root.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// User agent required by the GitHub API.
const USER_AGENT: &str = concat!("brunel/", env!("CARGO_PKG_VERSION"));

/// Time allowed for each API round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for merging pull requests and deleting branches.
#[derive(Debug, Clone)]
pub struct GithubSourceControl {
    client: reqwest::Client,
    base_url: String,
}

impl GithubSourceControl {
    /// Creates a client against the production GitHub API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GITHUB_API_BASE.to_owned(),
        }
    }

    /// Overrides the API base URL (test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends one authenticated request and maps non-success statuses.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        api_key: &str,
    ) -> Result<reqwest::Response, SourceControlError> {
        let response = request
            .bearer_auth(api_key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SourceControlError::transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|err| err.to_string());
        Err(SourceControlError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Finds the open pull request whose head is the context branch.
    async fn find_pull_request(
        &self,
        context: &BranchMergeContext,
    ) -> Result<u64, SourceControlError> {
        let url = format!("{}/repos/{}/pulls?state=open", self.base_url, context.repository);
        let response = self
            .send(self.client.get(url), context.credential.api_key())
            .await?;
        let pulls: Value = response
            .json()
            .await
            .map_err(SourceControlError::transport)?;

        pulls
            .as_array()
            .into_iter()
            .flatten()
            .find(|pr| {
                pr.pointer("/head/ref").and_then(Value::as_str)
                    == Some(context.branch_name.as_str())
            })
            .and_then(|pr| pr.get("number").and_then(Value::as_u64))
            .ok_or_else(|| SourceControlError::PullRequestNotFound {
                branch: context.branch_name.to_string(),
            })
    }

    /// Checks the provider's mergeability verdict for a pull request.
    async fn ensure_mergeable(
        &self,
        context: &BranchMergeContext,
        number: u64,
    ) -> Result<(), SourceControlError> {
        let url = format!("{}/repos/{}/pulls/{number}", self.base_url, context.repository);
        let response = self
            .send(self.client.get(url), context.credential.api_key())
            .await?;
        let pr: Value = response
            .json()
            .await
            .map_err(SourceControlError::transport)?;

        if pr.get("mergeable").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(SourceControlError::NotMergeable { number })
        }
    }
}

impl Default for GithubSourceControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceControlService for GithubSourceControl {
    async fn merge_pull_request(
        &self,
        context: &BranchMergeContext,
    ) -> Result<MergeSha, SourceControlError> {
        let number = self.find_pull_request(context).await?;
        self.ensure_mergeable(context, number).await?;

        let url = format!(
            "{}/repos/{}/pulls/{number}/merge",
            self.base_url, context.repository
        );
        let payload = json!({
            "commit_title": format!(
                "Merge pull request #{number} from {}",
                context.branch_name
            ),
        });
        let response = self
            .send(self.client.put(url).json(&payload), context.credential.api_key())
            .await?;
        let body: Value = response
            .json()
            .await
            .map_err(SourceControlError::transport)?;

        body.get("sha")
            .and_then(Value::as_str)
            .map(|sha| MergeSha::new(sha.to_owned()))
            .ok_or_else(|| SourceControlError::Api {
                status: 200,
                message: "merge response carried no sha".to_owned(),
            })
    }

    async fn delete_branch(
        &self,
        context: &BranchMergeContext,
    ) -> Result<bool, SourceControlError> {
        let url = format!(
            "{}/repos/{}/git/refs/heads/{}",
            self.base_url, context.repository, context.branch_name
        );
        self.send(self.client.delete(url), context.credential.api_key())
            .await?;
        Ok(true)
    }
}
