//! Pull-request reconciliation
//!
//! Two passes over the train's ordered branch list. Pass 1 ensures a PR
//! exists for every branch (find-or-create with the correct base); pass 2
//! rewrites the shared navigation block into every PR body. The split is
//! required because branch `k`'s navigation must reference the PR numbers of
//! branches created after `k` in pass 1.

use railyard_core::git::Git;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::host::{NewPullRequest, PullRequestHost};
use crate::navigation::{render_navigation, upsert_navigation};
use crate::{Error, Result};

/// One train branch's PR, as assembled during a reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Head branch
    pub branch: String,
    /// PR number on the host
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body (kept current through pass 2)
    pub body: String,
    /// Web URL of the PR
    pub html_url: String,
    /// Whether the PR already existed before this run
    pub preexisting: bool,
}

/// Options for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Base branch for the first and the combined PR
    pub base_branch: String,
    /// Create new PRs as drafts
    pub draft: bool,
    /// Title for the combined branch's PR, supplied once per run
    pub combined_title: Option<String>,
}

/// Find-or-create a PR per branch, then synchronize every PR's navigation
///
/// `branches` is the train's full ordered list, the combined branch (if any)
/// last. Re-running after a fully successful run is a no-op modulo the
/// navigation content: every PR is found as preexisting and its title and
/// hand-written body are left alone.
pub async fn reconcile_train(
    git: &dyn Git,
    host: &dyn PullRequestHost,
    branches: &[String],
    combined_branch: Option<&str>,
    settings: &ReconcileSettings,
) -> Result<Vec<PullRequestRecord>> {
    if combined_branch.is_some() && settings.combined_title.is_none() {
        return Err(Error::MissingCombinedTitle);
    }

    // Pass 1: make sure a PR exists for every branch, in train order.
    let mut records = Vec::with_capacity(branches.len());
    for (index, branch) in branches.iter().enumerate() {
        let is_combined = combined_branch == Some(branch.as_str());
        let base = base_for(index, branch, branches, combined_branch, &settings.base_branch);

        match host.find_by_head(branch).await? {
            Some(existing) => {
                debug!(%branch, number = existing.number, "PR already exists");
                records.push(PullRequestRecord {
                    branch: branch.clone(),
                    number: existing.number,
                    title: existing.title,
                    body: existing.body,
                    html_url: existing.html_url,
                    preexisting: true,
                });
            }
            None => {
                let (title, body) = if is_combined {
                    let title = settings
                        .combined_title
                        .clone()
                        .ok_or(Error::MissingCombinedTitle)?;
                    (title, String::new())
                } else {
                    commit_message(git, branch).await?
                };

                info!(%branch, base, "creating PR");
                let created = host
                    .create(&NewPullRequest {
                        head: branch.clone(),
                        base: base.to_string(),
                        title,
                        body,
                        draft: settings.draft,
                    })
                    .await?;

                records.push(PullRequestRecord {
                    branch: branch.clone(),
                    number: created.number,
                    title: created.title,
                    body: created.body,
                    html_url: created.html_url,
                    preexisting: false,
                });
            }
        }
    }

    // Pass 2: every PR gets the navigation block rendered from the complete
    // record set. Titles are re-sent unchanged; only the spliced body differs.
    for index in 0..records.len() {
        let navigation = render_navigation(&records, &records[index].branch, combined_branch);
        let body = upsert_navigation(&navigation, &records[index].body);

        debug!(branch = %records[index].branch, number = records[index].number, "updating PR navigation");
        let updated = host
            .update(records[index].number, &records[index].title, &body)
            .await?;
        records[index].body = updated.body;
    }

    Ok(records)
}

/// Base branch for the PR at `index`
///
/// The first branch and the combined branch base off the configured base
/// branch; every other branch bases off its predecessor in the train.
pub fn base_for<'a>(
    index: usize,
    branch: &str,
    branches: &'a [String],
    combined_branch: Option<&str>,
    base_branch: &'a str,
) -> &'a str {
    if index == 0 || combined_branch == Some(branch) {
        base_branch
    } else {
        &branches[index - 1]
    }
}

/// Subject and body of the branch's most recent commit
pub async fn commit_message(git: &dyn Git, branch: &str) -> Result<(String, String)> {
    let subject = git.raw(&["log", "--format=%s", "-n", "1", branch]).await?;
    let body = git.raw(&["log", "--format=%b", "-n", "1", branch]).await?;
    Ok((subject.trim().to_string(), body.trim().to_string()))
}
