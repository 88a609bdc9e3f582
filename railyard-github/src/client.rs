//! GitHub API client using octocrab

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::auth;
use crate::host::{HostPullRequest, NewPullRequest, PullRequestHost};
use crate::{Error, Result};

/// GitHub API client for one repository
pub struct GitHubClient {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for the given repository
    ///
    /// The token is resolved by [`auth::github_token`] (environment variable
    /// or token file).
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();

        let token = auth::github_token()?;

        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(owner = %owner, repo = %repo, "Created GitHub client");

        Ok(Self {
            client,
            owner,
            repo,
        })
    }

    /// Create a client from a git remote URL
    ///
    /// Supports `https://github.com/owner/repo(.git)` and
    /// `git@github.com:owner/repo(.git)`.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let (owner, repo) = parse_github_remote(url)?;
        Self::new(owner, repo)
    }

    /// The repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    async fn find_by_head(&self, head: &str) -> Result<Option<HostPullRequest>> {
        debug!(head, "checking for an existing PR");

        let page = self
            .client
            .pulls(&self.owner, &self.repo)
            .list()
            .head(format!("{}:{}", self.owner, head))
            .per_page(1)
            .send()
            .await
            .map_err(Error::Api)?;

        Ok(page.items.into_iter().next().map(convert))
    }

    async fn create(&self, payload: &NewPullRequest) -> Result<HostPullRequest> {
        debug!(head = %payload.head, base = %payload.base, "creating PR");

        let created = self
            .client
            .pulls(&self.owner, &self.repo)
            .create(
                payload.title.as_str(),
                payload.head.as_str(),
                payload.base.as_str(),
            )
            .body(payload.body.as_str())
            .draft(payload.draft)
            .send()
            .await
            .map_err(|e| {
                if is_missing_base(&e) {
                    Error::BaseBranchMissing {
                        base: payload.base.clone(),
                    }
                } else {
                    Error::Api(e)
                }
            })?;

        Ok(convert(created))
    }

    async fn update(&self, number: u64, title: &str, body: &str) -> Result<HostPullRequest> {
        debug!(number, "updating PR");

        let updated = self
            .client
            .pulls(&self.owner, &self.repo)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await
            .map_err(Error::Api)?;

        Ok(convert(updated))
    }
}

fn convert(pr: octocrab::models::pulls::PullRequest) -> HostPullRequest {
    HostPullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        body: pr.body.unwrap_or_default(),
        html_url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
    }
}

/// Whether a create failure points at a base ref the remote doesn't know
fn is_missing_base(error: &octocrab::Error) -> bool {
    if let octocrab::Error::GitHub { source, .. } = error {
        if !source.message.contains("Validation Failed") {
            return false;
        }
        let details = source
            .errors
            .as_ref()
            .and_then(|errors| serde_json::to_string(errors).ok())
            .unwrap_or_default();
        return details.contains(r#""field":"base""#);
    }
    false
}

/// Parse a GitHub remote URL into owner and repo
fn parse_github_remote(url: &str) -> Result<(String, String)> {
    let url = url.trim();

    // HTTPS URL: https://github.com/owner/repo(.git)
    if url.starts_with("https://") || url.starts_with("http://") {
        let parsed = url::Url::parse(url).map_err(|e| Error::RemoteParse(e.to_string()))?;
        if parsed.host_str() != Some("github.com") {
            return Err(Error::RemoteParse(format!(
                "{} is not a github.com remote",
                url
            )));
        }
        let path = parsed.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::RemoteParse(format!("Invalid GitHub URL path: {}", path)));
    }

    // SSH URL: git@github.com:owner/repo(.git)
    if let Some(rest) = url.strip_prefix("git@github.com:") {
        let path = rest.trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::RemoteParse(format!("Invalid SSH remote: {}", url)));
    }

    Err(Error::RemoteParse(format!(
        "Unrecognized remote URL format: {}",
        url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_remote() {
        let (owner, repo) = parse_github_remote("https://github.com/acme/widgets").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widgets");
    }

    #[test]
    fn test_parse_https_remote_with_git_suffix() {
        let (owner, repo) = parse_github_remote("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widgets");
    }

    #[test]
    fn test_parse_ssh_remote() {
        let (owner, repo) = parse_github_remote("git@github.com:acme/widgets.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widgets");
    }

    #[test]
    fn test_parse_non_github_remote_rejected() {
        assert!(parse_github_remote("https://gitlab.com/acme/widgets").is_err());
    }

    #[test]
    fn test_parse_garbage_rejected() {
        assert!(parse_github_remote("not a url").is_err());
    }
}
