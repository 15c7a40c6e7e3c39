//! Publishing
//!
//! Commits generated documentation on the working branch, pushes it and opens
//! a pull request against the base branch.
//!
//! ## Flow
//!
//! ```text
//! GitBackend::commit_all ──► GitBackend::push ──► PullRequestApi::create ──► html_url
//! ```

pub mod github;

pub use github::GithubClient;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::types::{AutodocError, Result};
use crate::workdir::{GitBackend, RepoUrl, RepositoryHandle};

/// Pull request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// Hosting service that opens pull requests
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Open a pull request and return its web URL
    async fn create(&self, repository: &RepoUrl, request: &PullRequest) -> Result<String>;
}

/// Commit, push and pull-request publisher for a synchronized clone
pub struct Publisher {
    git: Arc<dyn GitBackend>,
    api: Arc<dyn PullRequestApi>,
}

impl Publisher {
    pub fn new(git: Arc<dyn GitBackend>, api: Arc<dyn PullRequestApi>) -> Self {
        Self { git, api }
    }

    /// Publish everything changed in the clone.
    ///
    /// Fails with a `Publish` error when the run produced no changes.
    pub async fn publish(&self, repo: &RepositoryHandle) -> Result<String> {
        let message = format!(
            "Add generated documentation ({})",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        );
        if !self.git.commit_all(&repo.path, &message).await? {
            return Err(AutodocError::Publish(format!(
                "nothing to commit on {}",
                repo.working_branch
            )));
        }
        self.git
            .push(&repo.path, &repo.remote, &repo.working_branch)
            .await?;
        info!(branch = %repo.working_branch, "Pushed working branch");

        let request = PullRequest {
            title: format!("Generated documentation for {}", repo.base_branch),
            head: repo.working_branch.clone(),
            base: repo.base_branch.clone(),
            body: "Package README files generated by autodoc.".to_string(),
        };
        let url = self.api.create(&repo.url, &request).await?;
        info!(url = %url, "Pull request opened");
        Ok(url)
    }
}
