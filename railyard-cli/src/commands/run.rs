//! The railyard run: resolve the train, then sync, push, and reconcile PRs

use clap::Args;
use tracing::{debug, info};

use railyard_core::git::Git;
use railyard_core::{
    plan_push, push_branches, resolve_current_train, sync_train, GitCli, GitRepo, SyncMode,
    SyncSettings, Train, TrainsFile,
};
use railyard_github::{reconcile, reconcile_train, GitHubClient, ReconcileSettings};

use crate::error::RunError;
use crate::prompt;

/// Flags and parameters of one railyard invocation
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Push the train's branches to the remote
    #[arg(short, long)]
    pub push: bool,

    /// List the branches in the current train and exit
    #[arg(long)]
    pub list: bool,

    /// Rebase each branch onto its predecessor rather than merging
    #[arg(short, long)]
    pub rebase: bool,

    /// Force-push to the remote
    #[arg(short, long)]
    pub force: bool,

    /// Also push branches that are already merged into the base branch
    #[arg(long)]
    pub push_merged: bool,

    /// Create or update GitHub PRs for the train's branches
    #[arg(short = 'c', long)]
    pub create_prs: bool,

    /// Create new PRs as drafts
    #[arg(long, conflicts_with = "no_draft")]
    pub draft: bool,

    /// Create new PRs as regular PRs even if the config says draft-by-default
    #[arg(long)]
    pub no_draft: bool,

    /// Remote to push to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Base branch for the first and the combined PR
    #[arg(long)]
    pub base: Option<String>,

    /// Insert a new branch into the train right after the current one
    #[arg(long, value_name = "BRANCH")]
    pub new_branch: Option<String>,

    /// Branch index (or "combined") to switch to
    #[arg(value_name = "TARGET")]
    pub switch: Option<String>,
}

impl RunArgs {
    /// Execute the invocation
    pub async fn execute(&self) -> Result<(), RunError> {
        let cwd = std::env::current_dir()?;
        let repo = GitRepo::open(&cwd)?;
        let git = GitCli::new(repo.root());

        let config_path = TrainsFile::path_in(repo.root());
        let mut config = TrainsFile::load(repo.root())?;

        let local = git.local_branches().await?;
        let current = repo.current_branch()?.ok_or_else(|| {
            railyard_core::Error::Config(
                "HEAD is detached; check out a train branch first".to_string(),
            )
        })?;

        let trains = config.resolve_trains()?;
        let train = resolve_current_train(&trains, &current).ok_or_else(|| {
            railyard_core::Error::Config(format!(
                "Current branch {:?} is not part of a train",
                current
            ))
        })?;

        if let Some(new_branch) = &self.new_branch {
            return self
                .insert_new_branch(&git, &mut config, &config_path, train, &current, new_branch)
                .await;
        }

        // A configured combined branch that doesn't exist yet is created from
        // the last branch before it.
        if let Some(combined) = train.combined_branch() {
            if !local.all.iter().any(|b| b == combined) {
                let from = train.last_before_combined().ok_or_else(|| {
                    railyard_core::Error::Config(format!(
                        "Combined branch {:?} has no predecessor to start from",
                        combined
                    ))
                })?;
                info!(combined, from, "creating combined branch");
                git.raw(&["branch", combined, from]).await?;
            }
        }

        // Branch switching short-circuits the rest of the run.
        if let Some(token) = &self.switch {
            let target = train.resolve_switch_target(token)?;
            git.checkout(target).await?;
            println!("Switched to branch {}", target);
            return Ok(());
        }

        println!("I've found these train branches:");
        for (index, name) in train.branch_names().iter().enumerate() {
            let combined_marker = if train.combined_branch() == Some(*name) {
                " (combined)"
            } else {
                ""
            };
            println!("  {}. {}{}", index, name, combined_marker);
        }
        println!();

        if self.list {
            return Ok(());
        }

        let names: Vec<String> = train
            .branch_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mode = if self.rebase {
            SyncMode::Rebase
        } else {
            SyncMode::Merge
        };
        let settings = SyncSettings::new(mode, &config.sync);
        sync_train(&git, &names, &settings).await?;

        let base_branch = config
            .base_branch(self.base.as_deref())
            .unwrap_or_else(|| repo.default_branch());

        // PR reconciliation needs the branches on the remote, so pushing also
        // runs when only --create-prs was given.
        if self.push || self.push_merged || self.create_prs {
            let plan = plan_push(&git, &names, &base_branch, self.push_merged).await?;
            if !plan.skipped_merged.is_empty() {
                println!(
                    "Not pushing already merged branches: {}",
                    plan.skipped_merged.join(", ")
                );
            }
            push_branches(&git, &self.remote, &plan, self.force).await?;
        }

        if self.create_prs {
            self.reconcile_prs(&repo, &git, train, &config, &base_branch, &names)
                .await?;
        }

        Ok(())
    }

    /// `--new-branch`: create the branch, record it in the config, switch to it
    async fn insert_new_branch(
        &self,
        git: &GitCli,
        config: &mut TrainsFile,
        config_path: &std::path::Path,
        train: &Train,
        current: &str,
        new_branch: &str,
    ) -> Result<(), RunError> {
        config.insert_branch_after(train.key(), current, new_branch)?;
        git.raw(&["branch", new_branch, current]).await?;
        config.save(config_path)?;
        git.checkout(new_branch).await?;

        println!(
            "Created branch {} after {} in train {}",
            new_branch,
            current,
            train.key()
        );
        Ok(())
    }

    /// `--create-prs`: confirm the plan with the user, then reconcile
    async fn reconcile_prs(
        &self,
        repo: &GitRepo,
        git: &GitCli,
        train: &Train,
        config: &TrainsFile,
        base_branch: &str,
        names: &[String],
    ) -> Result<(), RunError> {
        let remote_url = repo.remote_url(&self.remote)?;
        let client = GitHubClient::from_remote_url(&remote_url)?;
        debug!(owner = client.owner(), repo = client.repo(), "reconciling against GitHub");

        let combined = train.combined_branch();

        let combined_title = if combined.is_some() {
            println!("A combined branch PR needs a title.");
            let title = prompt::prompt_line("Combined branch PR title: ")?;
            if title.is_empty() {
                return Err(railyard_github::Error::MissingCombinedTitle.into());
            }
            Some(title)
        } else {
            None
        };

        println!();
        println!("This will create (or update) PRs for the following branches:");
        for name in names {
            let title = if combined == Some(name.as_str()) {
                combined_title.clone().unwrap_or_default()
            } else {
                reconcile::commit_message(git, name).await?.0
            };
            println!("  -> {} ({})", name, title);
        }
        println!();

        if !prompt::confirm("Shall we do this? [y/n] ")? {
            println!("No worries. Bye now.");
            return Ok(());
        }

        let draft = if self.no_draft {
            false
        } else {
            self.draft || config.prs.draft_by_default
        };

        let settings = ReconcileSettings {
            base_branch: base_branch.to_string(),
            draft,
            combined_title,
        };

        let records = reconcile_train(git, &client, names, combined, &settings).await?;

        println!("All PRs are in place.");
        if config.prs.print_urls {
            for record in &records {
                println!("  {} -> {}", record.branch, record.html_url);
            }
        }
        Ok(())
    }
}
