//! Chain synchronization
//!
//! Walks a train's ordered branch list pairwise and propagates each branch's
//! changes into the next via merge or rebase. Pairs whose target already
//! contains the source are skipped, which makes a re-run with no new commits a
//! no-op.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::git::Git;
use crate::{Error, Result};

/// How changes are propagated along the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Merge the previous branch into the next one
    Merge,
    /// Rebase the next branch onto the previous one
    Rebase,
}

/// Pacing and mode for one synchronization run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Merge or rebase
    pub mode: SyncMode,
    /// Pause after each successful step
    pub step_delay: Duration,
    /// Pause before the single retry of a non-conflict failure
    pub lock_retry_delay: Duration,
}

impl SyncSettings {
    /// Combine the CLI mode flag with the configured delays
    pub fn new(mode: SyncMode, config: &SyncConfig) -> Self {
        Self {
            mode,
            step_delay: config.step_delay,
            lock_retry_delay: config.lock_retry_delay,
        }
    }
}

/// What happened to one adjacent pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The target already contained the source; nothing ran
    Skipped {
        /// Source branch
        from: String,
        /// Target branch
        to: String,
    },
    /// The merge/rebase ran
    Synced {
        /// Source branch
        from: String,
        /// Target branch
        to: String,
    },
}

/// Propagate every branch of the train into its successor
///
/// Processes adjacent pairs left to right, strictly in order. A step that
/// fails with content conflicts aborts the run and leaves the working tree
/// conflicted for manual resolution; a step that fails for any other reason is
/// retried exactly once after `lock_retry_delay`. On success the checkout is
/// returned to the branch that was current when the run started; on a fatal
/// failure it is not.
pub async fn sync_train(
    git: &dyn Git,
    branches: &[String],
    settings: &SyncSettings,
) -> Result<Vec<StepOutcome>> {
    let original = git.local_branches().await?.current;
    let mut outcomes = Vec::new();

    for pair in branches.windows(2) {
        let (from, to) = (pair[0].as_str(), pair[1].as_str());

        if git.is_ancestor(from, to).await? {
            debug!(from, to, "already up to date, skipping");
            outcomes.push(StepOutcome::Skipped {
                from: from.to_string(),
                to: to.to_string(),
            });
            continue;
        }

        match settings.mode {
            SyncMode::Merge => info!(from, to, "merging"),
            SyncMode::Rebase => info!(from, to, "rebasing"),
        }
        combine(git, from, to, settings).await?;
        outcomes.push(StepOutcome::Synced {
            from: from.to_string(),
            to: to.to_string(),
        });
        sleep(settings.step_delay).await;
    }

    if let Some(branch) = original {
        git.checkout(&branch).await?;
    }

    Ok(outcomes)
}

/// One chain step: checkout the target, bring in the source
async fn combine(git: &dyn Git, from: &str, to: &str, settings: &SyncSettings) -> Result<()> {
    git.checkout(to).await?;

    match apply(git, from, settings.mode).await {
        Ok(()) => Ok(()),
        Err(conflict @ Error::Conflict { .. }) => Err(conflict),
        Err(first) => {
            // Likely an index lock; settle and retry once
            debug!(error = %first, from, to, "step failed without conflicts, retrying");
            sleep(settings.lock_retry_delay).await;
            git.checkout(to).await?;
            apply(git, from, settings.mode).await
        }
    }
}

async fn apply(git: &dyn Git, from: &str, mode: SyncMode) -> Result<()> {
    match mode {
        SyncMode::Merge => git.merge(from).await,
        SyncMode::Rebase => git.rebase(from).await,
    }
}
