use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{PullRequest, PullRequestApi};
use crate::types::{AutodocError, Result};
use crate::workdir::RepoUrl;

const USER_AGENT: &str = concat!("autodoc/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// GitHub REST client for opening pull requests
pub struct GithubClient {
    api_base: String,
    token: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GithubClient {
    pub fn new(api_base: &str, token: SecretString) -> Result<Self> {
        if token.expose_secret().is_empty() {
            return Err(AutodocError::Config(
                "GitHub token required to open pull requests (set GH_TOKEN or github.token)"
                    .to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AutodocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    /// Pull request endpoint for a repository
    pub fn pulls_url(&self, repository: &RepoUrl) -> String {
        format!(
            "{}/repos/{}/{}/pulls",
            self.api_base,
            repository.owner,
            repository.name.trim_end_matches(".git")
        )
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

#[async_trait]
impl PullRequestApi for GithubClient {
    async fn create(&self, repository: &RepoUrl, request: &PullRequest) -> Result<String> {
        let url = self.pulls_url(repository);
        debug!(url = %url, head = %request.head, base = %request.base, "Creating pull request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| AutodocError::Publish(format!("pull request request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutodocError::Publish(format!(
                "GitHub API error ({}): {}",
                status, body
            )));
        }

        let body: PullRequestResponse = response
            .json()
            .await
            .map_err(|e| AutodocError::Publish(format!("invalid pull request response: {}", e)))?;
        Ok(body.html_url)
    }
}
