//! The pull-request host interface
//!
//! The reconciler only ever talks to the host through [`PullRequestHost`];
//! the production implementation is [`crate::GitHubClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A pull request as known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Web URL of the PR
    pub html_url: String,
}

/// Payload for creating a pull request
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    /// Head branch
    pub head: String,
    /// Base branch the PR merges into
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Create as a draft
    pub draft: bool,
}

/// Narrow interface to the pull-request host
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Find an open PR whose head is the given branch
    async fn find_by_head(&self, head: &str) -> Result<Option<HostPullRequest>>;

    /// Create a pull request
    async fn create(&self, payload: &NewPullRequest) -> Result<HostPullRequest>;

    /// Update an existing pull request's title and body
    async fn update(&self, number: u64, title: &str, body: &str) -> Result<HostPullRequest>;
}
